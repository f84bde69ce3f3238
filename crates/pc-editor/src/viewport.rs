//! Canvas zoom and pan.
//!
//! The canvas layer is drawn as `scale(zoom) translate(pan)` inside a
//! container padded by [`EditorConfig::canvas_padding`].

use crate::config::EditorConfig;
use crate::session::SessionGuard;
use kurbo::{Point, Vec2};

/// What a wheel event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    Zoomed,
    /// Consumed without effect (a pan is active).
    Swallowed,
    /// Not ours; the host scrolls normally.
    PassThrough,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    zoom: f64,
    pan: Vec2,
    origin: Point,
    padding: f64,
    step: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl Viewport {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            origin: Point::ORIGIN,
            padding: config.canvas_padding,
            step: config.zoom_step,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Screen position of the canvas container's top-left corner.
    pub fn container_origin(&self) -> Point {
        self.origin
    }

    pub fn set_container_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Set the zoom, clamped to the configured bounds. Steps are kept on a
    /// hundredth grid so repeated steps do not drift.
    pub fn set_zoom(&mut self, zoom: f64) {
        let z = ((zoom * 100.0).round() / 100.0).clamp(self.min_zoom, self.max_zoom);
        if z != self.zoom {
            log::trace!("zoom {} → {z}", self.zoom);
            self.zoom = z;
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.step);
    }

    pub fn zoom_reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan += Vec2::new(dx, dy) / self.zoom;
    }

    /// Wheel zoom. Shift zooms one step against the scroll direction; a
    /// wheel during an active pan is swallowed.
    pub fn wheel(&mut self, dy: f64, shift: bool, panning: bool) -> WheelOutcome {
        if panning {
            return WheelOutcome::Swallowed;
        }
        if !shift {
            return WheelOutcome::PassThrough;
        }
        if dy > 0.0 {
            self.zoom_out();
        } else {
            self.zoom_in();
        }
        WheelOutcome::Zoomed
    }

    /// `(pointer − origin − padding) / zoom`. Drag offsets are measured in
    /// this space, so only their differences matter.
    pub fn drag_point(&self, pointer: Point) -> Point {
        ((pointer - self.origin - Vec2::new(self.padding, self.padding)) / self.zoom).to_point()
    }

    /// Exact canvas-space point under a screen pointer, used for hit tests.
    pub fn canvas_point(&self, pointer: Point) -> Point {
        ((pointer - self.origin) / self.zoom - Vec2::new(self.padding, self.padding) - self.pan)
            .to_point()
    }

    /// Screen position of a canvas-space point.
    pub fn screen_point(&self, canvas: Point) -> Point {
        self.origin + (canvas.to_vec2() + self.pan + Vec2::new(self.padding, self.padding)) * self.zoom
    }
}

/// Space-armed pan in progress.
#[derive(Debug)]
pub struct PanSession {
    _guard: SessionGuard,
    start_pointer: Point,
    start_pan: Vec2,
}

impl PanSession {
    pub fn begin(guard: SessionGuard, viewport: &Viewport, pointer: Point) -> Self {
        Self {
            _guard: guard,
            start_pointer: pointer,
            start_pan: viewport.pan,
        }
    }

    /// `pan = start + Δpointer / zoom`.
    pub fn update(&self, viewport: &mut Viewport, pointer: Point) {
        viewport.pan = self.start_pan + (pointer - self.start_pointer) / viewport.zoom;
    }
}
