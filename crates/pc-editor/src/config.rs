/// Tunables of the canvas editor.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Padding between the canvas container and canvas space, in screen px.
    pub canvas_padding: f64,
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub sidebar_width: f64,
    pub sidebar_min_width: f64,
    pub sidebar_max_width: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_padding: 40.0,
            zoom_step: 0.1,
            min_zoom: 0.1,
            max_zoom: 3.0,
            sidebar_width: 256.0,
            sidebar_min_width: 256.0,
            sidebar_max_width: 512.0,
        }
    }
}
