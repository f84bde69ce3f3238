//! CSS gradient geometry.
//!
//! Gradients are authored with CSS semantics: a linear angle of 0° points up
//! and turns clockwise, and the gradient line passes through the box centre
//! with a length that makes the corners hit 0 % and 100 %. A radial `circle`
//! reaches the farthest corner. These helpers map both onto the
//! user-space coordinates an SVG gradient needs.

use kurbo::{Point, Rect, Vec2};

/// Start and end of a CSS linear gradient line over `rect`.
pub fn linear_gradient_line(rect: Rect, css_angle_deg: f64) -> (Point, Point) {
    let theta = css_angle_deg.to_radians();
    let (sin, cos) = theta.sin_cos();
    let dir = Vec2::new(sin, -cos);
    let length = (rect.width() * sin).abs() + (rect.height() * cos).abs();
    let center = rect.center();
    let half = dir * (length / 2.0);
    (center - half, center + half)
}

/// Radius of a `circle` radial gradient centred in `rect` (farthest corner).
pub fn farthest_corner_radius(rect: Rect) -> f64 {
    (rect.width() / 2.0).hypot(rect.height() / 2.0)
}

/// Stop percentages as CSS resolves them: each clamped to [0, 100] and the
/// end never before the start.
pub fn normalized_stops(start: f64, end: f64) -> (f64, f64) {
    let start = start.clamp(0.0, 100.0);
    let end = end.clamp(0.0, 100.0).max(start);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn stored_zero_angle_runs_top_to_bottom() {
        // Stored angle 0 is rendered as CSS 180°.
        let rect = Rect::new(0.0, 0.0, 1080.0, 1920.0);
        let (start, end) = linear_gradient_line(rect, 180.0);
        assert!(close(start, Point::new(540.0, 0.0)));
        assert!(close(end, Point::new(540.0, 1920.0)));
    }

    #[test]
    fn right_angle_runs_left_to_right() {
        let rect = Rect::new(0.0, 0.0, 1080.0, 1080.0);
        let (start, end) = linear_gradient_line(rect, 90.0);
        assert!(close(start, Point::new(0.0, 540.0)));
        assert!(close(end, Point::new(1080.0, 540.0)));
    }

    #[test]
    fn diagonal_reaches_corners() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let (start, end) = linear_gradient_line(rect, 135.0);
        // Projection of the corners onto the line is exactly the end points.
        assert!((start.x - 0.0).abs() < 1e-9 && (start.y - 0.0).abs() < 1e-9);
        assert!((end.x - 100.0).abs() < 1e-9 && (end.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn stops_are_normalized() {
        assert_eq!(normalized_stops(-5.0, 140.0), (0.0, 100.0));
        assert_eq!(normalized_stops(70.0, 30.0), (70.0, 70.0));
    }

    #[test]
    fn radius_hits_corner() {
        let r = farthest_corner_radius(Rect::new(0.0, 0.0, 600.0, 800.0));
        assert!((r - 500.0).abs() < 1e-9);
    }
}
