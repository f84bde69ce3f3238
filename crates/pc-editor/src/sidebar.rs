//! Right sidebar width, resized by dragging its left edge.

use crate::config::EditorConfig;
use crate::session::SessionGuard;

#[derive(Debug, Clone, PartialEq)]
pub struct Sidebar {
    width: f64,
    min: f64,
    max: f64,
}

impl Sidebar {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            width: config
                .sidebar_width
                .clamp(config.sidebar_min_width, config.sidebar_max_width),
            min: config.sidebar_min_width,
            max: config.sidebar_max_width,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }
}

#[derive(Debug)]
pub struct SidebarResize {
    _guard: SessionGuard,
    start_x: f64,
    start_width: f64,
}

impl SidebarResize {
    pub fn begin(guard: SessionGuard, sidebar: &Sidebar, x: f64) -> Self {
        Self {
            _guard: guard,
            start_x: x,
            start_width: sidebar.width,
        }
    }

    /// The handle sits on the left edge: moving left widens the sidebar.
    pub fn update(&self, sidebar: &mut Sidebar, x: f64) {
        let delta = self.start_x - x;
        sidebar.width = (self.start_width + delta).clamp(sidebar.min, sidebar.max);
    }
}
