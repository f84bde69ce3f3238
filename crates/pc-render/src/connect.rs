//! Connection curve geometry.
//!
//! Each parent → child edge is drawn as a cubic Bezier from the middle of the
//! parent's right edge to the middle of the child's left edge, with an
//! open arrowhead at the child. Both control points sit halfway along the
//! horizontal distance, so the curve leaves and enters horizontally.
//!
//! Positions come through [`PresentationOverrides`], so a frame being dragged
//! drags its curves with it before anything is committed.

use kurbo::{BezPath, CubicBez, Point, Vec2};
use pc_core::{ConnectionGraph, Frame, FrameId, FrameStore, PREVIEW_SCALE, PresentationOverrides};

/// Height of the name label drawn above each frame body.
pub const LABEL_HEIGHT: f64 = 20.0;
/// Gap between the frame body and its caption block.
pub const CAPTION_GAP: f64 = 8.0;
pub const ARROW_LENGTH: f64 = 8.0;
pub const ARROW_HALF_WIDTH: f64 = 4.0;

pub const STROKE_COLOR: &str = "#026a79";
pub const STROKE_WIDTH: f64 = 1.5;
pub const STROKE_OPACITY: f64 = 0.7;

/// Height of the whole frame card: label, scaled body and optional caption.
pub fn card_height(frame: &Frame) -> f64 {
    let body = f64::from(frame.archetype.height) * PREVIEW_SCALE;
    let caption = if frame.caption_visible() {
        frame.archetype.caption_height() * PREVIEW_SCALE + CAPTION_GAP
    } else {
        0.0
    };
    LABEL_HEIGHT + body + caption
}

/// Resolved geometry of one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPath {
    pub parent: FrameId,
    pub child: FrameId,
    pub curve: CubicBez,
    /// Arrowhead polyline: wing, tip, wing.
    pub arrow: [Point; 3],
}

impl ConnectionPath {
    pub fn between(parent: &Frame, parent_at: Point, child: &Frame, child_at: Point) -> Self {
        let (width, _) = parent.preview_size();
        let start = Point::new(parent_at.x + width, parent_at.y + card_height(parent) / 2.0);
        let end = Point::new(child_at.x, child_at.y + card_height(child) / 2.0);

        let half = (end.x - start.x) * 0.5;
        let c1 = Point::new(start.x + half, start.y);
        let c2 = Point::new(start.x + half, end.y);
        let curve = CubicBez::new(start, c1, c2, end);

        Self {
            parent: parent.id,
            child: child.id,
            curve,
            arrow: arrowhead(c2, end),
        }
    }

    pub fn start(&self) -> Point {
        self.curve.p0
    }

    pub fn end(&self) -> Point {
        self.curve.p3
    }

    pub fn curve_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.curve.p0);
        path.curve_to(self.curve.p1, self.curve.p2, self.curve.p3);
        path
    }

    pub fn arrow_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.arrow[0]);
        path.line_to(self.arrow[1]);
        path.line_to(self.arrow[2]);
        path
    }
}

/// Arrowhead at `tip`, aligned with the direction `from → tip`.
fn arrowhead(from: Point, tip: Point) -> [Point; 3] {
    let d = tip - from;
    let angle = d.y.atan2(d.x);
    let (sin, cos) = angle.sin_cos();
    let back = Vec2::new(ARROW_LENGTH * cos, ARROW_LENGTH * sin);
    let side = Vec2::new(ARROW_HALF_WIDTH * sin, -ARROW_HALF_WIDTH * cos);
    [tip - back - side, tip, tip - back + side]
}

/// Geometry of every connection on the canvas, using live positions.
pub fn connection_paths(store: &FrameStore, overrides: &PresentationOverrides) -> Vec<ConnectionPath> {
    let graph = ConnectionGraph::derive(store);
    graph
        .edges()
        .iter()
        .filter_map(|&(parent_id, child_id)| {
            let parent = store.get(parent_id)?;
            let child = store.get(child_id)?;
            let p = overrides.position_of(parent);
            let c = overrides.position_of(child);
            Some(ConnectionPath::between(
                parent,
                Point::new(p.x, p.y),
                child,
                Point::new(c.x, c.y),
            ))
        })
        .collect()
}

/// SVG overlay with every connection curve, drawn behind the frames.
pub fn connections_svg(paths: &[ConnectionPath]) -> String {
    let mut svg = String::from(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" style=\"overflow:visible\" pointer-events=\"none\">\n",
    );
    for p in paths {
        svg.push_str(&format!(
            "  <g data-edge=\"{}-{}\" stroke=\"{STROKE_COLOR}\" stroke-width=\"{STROKE_WIDTH}\" fill=\"none\" opacity=\"{STROKE_OPACITY}\">\n",
            p.parent, p.child
        ));
        svg.push_str(&format!("    <path d=\"{}\"/>\n", p.curve_path().to_svg()));
        svg.push_str(&format!("    <path d=\"{}\"/>\n", p.arrow_path().to_svg()));
        svg.push_str("  </g>\n");
    }
    svg.push_str("</svg>\n");
    svg
}
