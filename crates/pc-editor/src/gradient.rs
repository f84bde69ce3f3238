//! Gradient stop slider and angle picker.
//!
//! Both are single-handle state machines: pointer-down picks what is being
//! dragged, moves write one style key each, pointer-up ends the session.

use crate::error::Result;
use crate::session::SessionGuard;
use kurbo::Point;
use pc_core::{FrameId, FrameStore, StyleDict, StyleKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopHandle {
    Start,
    End,
}

impl StopHandle {
    pub fn key(self) -> StyleKey {
        match self {
            StopHandle::Start => StyleKey::BackgroundGradientStartStop,
            StopHandle::End => StyleKey::BackgroundGradientEndStop,
        }
    }
}

/// Screen geometry of the stop slider track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopTrack {
    pub left: f64,
    pub width: f64,
}

impl StopTrack {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    /// Unrounded percentage under `x`, clamped to `[0, 100]`.
    pub fn percent_at(&self, x: f64) -> f64 {
        if self.width <= 0.0 {
            return 0.0;
        }
        ((x - self.left) / self.width * 100.0).clamp(0.0, 100.0)
    }
}

/// The handle closer to `percent`. Ties go to the end handle.
pub fn pick_handle(percent: f64, start: f64, end: f64) -> StopHandle {
    if (percent - start).abs() < (percent - end).abs() {
        StopHandle::Start
    } else {
        StopHandle::End
    }
}

/// New value of `handle` for a pointer at `percent`, keeping start ≤ end.
pub fn stop_value(handle: StopHandle, percent: f64, start: f64, end: f64) -> f64 {
    let percent = percent.round();
    let v = match handle {
        StopHandle::Start => percent.min(end),
        StopHandle::End => percent.max(start),
    };
    v.clamp(0.0, 100.0)
}

/// CSS angle of a pointer around a centre: 0° up, 90° right, 180° down,
/// 270° left. Integer degrees in `[0, 360)`.
pub fn angle_from_pointer(center: Point, pointer: Point) -> f64 {
    let d = pointer - center;
    let deg = d.x.atan2(-d.y).to_degrees();
    (deg.round() + 360.0) % 360.0
}

/// A stop handle being dragged.
#[derive(Debug)]
pub struct StopDrag {
    _guard: SessionGuard,
    frame: FrameId,
    track: StopTrack,
    handle: StopHandle,
}

impl StopDrag {
    /// Pointer-down at `x`. With `on_handle` the pointer landed on a handle,
    /// which is picked as-is; otherwise the closer handle is picked and
    /// moved to the pointer straight away.
    pub fn begin(
        guard: SessionGuard,
        store: &mut FrameStore,
        frame: FrameId,
        track: StopTrack,
        x: f64,
        on_handle: Option<StopHandle>,
    ) -> Result<Self> {
        let handle = match on_handle {
            Some(handle) => handle,
            None => {
                let styles = &store.get(frame).ok_or(pc_core::CoreError::UnknownFrame(frame))?.styles;
                let (start, end) = styles.gradient_stops();
                pick_handle(track.percent_at(x), start, end)
            }
        };
        let drag = Self {
            _guard: guard,
            frame,
            track,
            handle,
        };
        if on_handle.is_none() {
            drag.update(store, x)?;
        }
        Ok(drag)
    }

    pub fn handle(&self) -> StopHandle {
        self.handle
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame
    }

    pub fn update(&self, store: &mut FrameStore, x: f64) -> Result<()> {
        let Some(frame) = store.get(self.frame) else {
            return Err(pc_core::CoreError::UnknownFrame(self.frame).into());
        };
        let value = next_stop(&frame.styles, self.handle, self.track.percent_at(x));
        if frame.styles.num(self.handle.key()) != value {
            store.set_style(self.frame, self.handle.key(), value)?;
        }
        Ok(())
    }
}

fn next_stop(styles: &StyleDict, handle: StopHandle, percent: f64) -> f64 {
    let (start, end) = styles.gradient_stops();
    stop_value(handle, percent, start, end)
}

/// The angle picker being dragged.
#[derive(Debug)]
pub struct AngleDrag {
    _guard: SessionGuard,
    frame: FrameId,
    center: Point,
}

impl AngleDrag {
    /// Pointer-down on the dial. Sets the angle immediately.
    pub fn begin(
        guard: SessionGuard,
        store: &mut FrameStore,
        frame: FrameId,
        center: Point,
        pointer: Point,
    ) -> Result<Self> {
        let drag = Self {
            _guard: guard,
            frame,
            center,
        };
        drag.update(store, pointer)?;
        Ok(drag)
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame
    }

    pub fn update(&self, store: &mut FrameStore, pointer: Point) -> Result<()> {
        let angle = angle_from_pointer(self.center, pointer);
        store.set_style(self.frame, StyleKey::BackgroundGradientAngle, angle)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{InteractionKind, SessionSlot};
    use pretty_assertions::assert_eq;

    #[test]
    fn cardinal_angles() {
        let c = Point::new(50.0, 50.0);
        assert_eq!(angle_from_pointer(c, Point::new(50.0, 0.0)), 0.0);
        assert_eq!(angle_from_pointer(c, Point::new(100.0, 50.0)), 90.0);
        assert_eq!(angle_from_pointer(c, Point::new(50.0, 100.0)), 180.0);
        assert_eq!(angle_from_pointer(c, Point::new(0.0, 50.0)), 270.0);
    }

    #[test]
    fn angle_rounds_to_whole_degrees_below_360() {
        let c = Point::ORIGIN;
        // Just left of straight up: -0.3° rounds to 0, not 360.
        let a = angle_from_pointer(c, Point::new(-0.005, -1.0));
        assert_eq!(a, 0.0);
        let b = angle_from_pointer(c, Point::new(1.0, -1.0));
        assert_eq!(b, 45.0);
    }

    #[test]
    fn closer_handle_wins_and_ties_go_to_end() {
        assert_eq!(pick_handle(10.0, 0.0, 100.0), StopHandle::Start);
        assert_eq!(pick_handle(90.0, 0.0, 100.0), StopHandle::End);
        assert_eq!(pick_handle(50.0, 0.0, 100.0), StopHandle::End);
        assert_eq!(pick_handle(30.0, 30.0, 30.0), StopHandle::End);
    }

    #[test]
    fn stops_never_cross() {
        assert_eq!(stop_value(StopHandle::Start, 80.0, 0.0, 60.0), 60.0);
        assert_eq!(stop_value(StopHandle::End, 10.0, 40.0, 100.0), 40.0);
        assert_eq!(stop_value(StopHandle::Start, 33.4, 0.0, 100.0), 33.0);
    }

    #[test]
    fn rounding_does_not_cross_fractional_stops() {
        let end = stop_value(StopHandle::End, 50.2, 50.4, 100.0);
        assert!(end >= 50.4, "end {end}");
        let start = stop_value(StopHandle::Start, 60.7, 0.0, 60.6);
        assert!(start <= 60.6, "start {start}");
    }

    #[test]
    fn track_percent_is_clamped() {
        let track = StopTrack::new(100.0, 200.0);
        assert_eq!(track.percent_at(50.0), 0.0);
        assert_eq!(track.percent_at(200.0), 50.0);
        assert_eq!(track.percent_at(400.0), 100.0);
    }

    #[test]
    fn track_press_moves_closer_handle() {
        let slot = SessionSlot::new();
        let mut store = FrameStore::new();
        let id = store.add("instagram-post").unwrap();
        let track = StopTrack::new(0.0, 200.0);

        let drag = StopDrag::begin(
            slot.acquire(InteractionKind::GradientHandle).unwrap(),
            &mut store,
            id,
            track,
            40.0,
            None,
        )
        .unwrap();
        assert_eq!(drag.handle(), StopHandle::Start);
        assert_eq!(store.get(id).unwrap().styles.gradient_stops(), (20.0, 100.0));

        // Dragging past the end handle pins the start to it.
        drag.update(&mut store, 500.0).unwrap();
        assert_eq!(store.get(id).unwrap().styles.gradient_stops(), (100.0, 100.0));
    }

    #[test]
    fn handle_press_does_not_write() {
        let slot = SessionSlot::new();
        let mut store = FrameStore::new();
        let id = store.add("instagram-post").unwrap();
        let before = store.revision();
        let drag = StopDrag::begin(
            slot.acquire(InteractionKind::GradientHandle).unwrap(),
            &mut store,
            id,
            StopTrack::new(0.0, 100.0),
            3.0,
            Some(StopHandle::End),
        )
        .unwrap();
        assert_eq!(drag.handle(), StopHandle::End);
        assert_eq!(store.revision(), before);
    }
}
