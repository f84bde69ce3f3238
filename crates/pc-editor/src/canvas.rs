//! The canvas editor façade.
//!
//! `CanvasEditor` owns the frame store, the presentation overrides and the
//! viewport, routes [`InputEvent`]s to the active interaction, and wraps
//! collaborator calls, export and project persistence. Every failure that
//! reaches the user is recorded as exactly one [`Notice`].

use crate::collab::{
    BrandContext, ImageService, PromptService, RawImage, UploadService, validate_cta_link,
};
use crate::config::EditorConfig;
use crate::drag::{DragOutcome, DragSession};
use crate::error::{EditorError, Result};
use crate::gradient::{AngleDrag, StopDrag, StopHandle, StopTrack};
use crate::input::{InputEvent, PointerButton, is_space};
use crate::session::{InteractionKind, SessionGuard, SessionSlot};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::sidebar::{Sidebar, SidebarResize};
use crate::viewport::{PanSession, Viewport, WheelOutcome};
use kurbo::{Point, Rect};
use pc_core::style::BackgroundMode;
use pc_core::{
    CoreError, Frame, FrameId, FrameStore, PresentationOverrides, ProjectDraft, ProjectRepository,
    StyleKey, StyleValue, encode_frames,
};
use pc_render::connect::card_height;
use pc_render::{ConnectionPath, ExportRenderer, ExportSink, ImageSource, connection_paths};
use pc_render::export::ExportOutput;
use std::cell::Cell;
use std::rc::Rc;

const UNTITLED: &str = "Untitled post";

/// What an input event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorResponse {
    Ignored,
    Handled,
    /// A wheel event the host should scroll with.
    PassThrough,
    /// Pointer-up of a drag that never moved. Selects only.
    FrameClicked(FrameId),
    /// A drag moved its frame and was committed.
    FrameMoved(DragOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Which image style an upload fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Background,
    Logo,
}

impl ImageSlot {
    fn key(self) -> StyleKey {
        match self {
            ImageSlot::Background => StyleKey::BackgroundImage,
            ImageSlot::Logo => StyleKey::LogoImage,
        }
    }
}

/// Held while an export runs. The export trigger is disabled until it drops.
#[derive(Debug)]
pub struct ExportTicket {
    busy: Rc<Cell<bool>>,
}

impl Drop for ExportTicket {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

#[derive(Debug, Default)]
enum Interaction {
    #[default]
    Idle,
    Pan(PanSession),
    Drag(DragSession),
    Stops(StopDrag),
    Angle(AngleDrag),
    Sidebar(SidebarResize),
}

pub struct CanvasEditor {
    config: EditorConfig,
    store: FrameStore,
    overrides: PresentationOverrides,
    viewport: Viewport,
    sidebar: Sidebar,
    sessions: SessionSlot,
    interaction: Interaction,
    space_held: bool,
    export_busy: Rc<Cell<bool>>,
    project_id: Option<String>,
    notices: Vec<Notice>,
}

impl Default for CanvasEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl CanvasEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            viewport: Viewport::new(&config),
            sidebar: Sidebar::new(&config),
            config,
            store: FrameStore::new(),
            overrides: PresentationOverrides::new(),
            sessions: SessionSlot::new(),
            interaction: Interaction::Idle,
            space_held: false,
            export_busy: Rc::new(Cell::new(false)),
            project_id: None,
            notices: Vec::new(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn overrides(&self) -> &PresentationOverrides {
        &self.overrides
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn active_interaction(&self) -> Option<InteractionKind> {
        self.sessions.active()
    }

    /// Space is held; a primary press pans instead of dragging.
    pub fn pan_armed(&self) -> bool {
        self.space_held
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Pending notices, oldest first. Draining them marks them shown.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Connection curves at displayed positions, dragged frames included.
    pub fn connections(&self) -> Vec<ConnectionPath> {
        connection_paths(&self.store, &self.overrides)
    }

    /// Canvas-space rectangle of a frame's card at its displayed position.
    pub fn card_rect(&self, frame: &Frame) -> Rect {
        let p = self.overrides.position_of(frame);
        let (w, _) = frame.preview_size();
        Rect::new(p.x, p.y, p.x + w, p.y + card_height(frame))
    }

    /// Topmost frame under a screen pointer.
    pub fn hit_test(&self, pointer: Point) -> Option<FrameId> {
        let p = self.viewport.canvas_point(pointer);
        self.store
            .frames()
            .iter()
            .rev()
            .find(|f| self.card_rect(f).contains(p))
            .map(|f| f.id)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent) -> Result<EditorResponse> {
        match event {
            InputEvent::PointerDown { x, y, button, .. } => {
                Ok(self.pointer_down(Point::new(*x, *y), *button))
            }
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y } => self.pointer_up(Point::new(*x, *y)),
            InputEvent::Wheel { dy, modifiers, .. } => {
                let panning = matches!(self.interaction, Interaction::Pan(_));
                Ok(match self.viewport.wheel(*dy, modifiers.shift, panning) {
                    WheelOutcome::Zoomed | WheelOutcome::Swallowed => EditorResponse::Handled,
                    WheelOutcome::PassThrough => EditorResponse::PassThrough,
                })
            }
            InputEvent::KeyDown {
                key,
                modifiers,
                typing,
            } => Ok(match ShortcutMap::resolve(key, *modifiers, *typing) {
                Some(action) => {
                    self.run_shortcut(action);
                    EditorResponse::Handled
                }
                None => EditorResponse::Ignored,
            }),
            InputEvent::KeyUp { key } => {
                if !is_space(key) {
                    return Ok(EditorResponse::Ignored);
                }
                self.space_held = false;
                if matches!(self.interaction, Interaction::Pan(_)) {
                    self.interaction = Interaction::Idle;
                }
                Ok(EditorResponse::Handled)
            }
        }
    }

    fn run_shortcut(&mut self, action: ShortcutAction) {
        match action {
            ShortcutAction::ZoomIn => self.viewport.zoom_in(),
            ShortcutAction::ZoomOut => self.viewport.zoom_out(),
            ShortcutAction::ZoomReset => self.viewport.zoom_reset(),
            ShortcutAction::ArmPan => self.space_held = true,
        }
    }

    fn acquire(&self, kind: InteractionKind) -> Option<SessionGuard> {
        match self.sessions.acquire(kind) {
            Ok(guard) => Some(guard),
            Err(e) => {
                log::debug!("ignoring press: {e}");
                None
            }
        }
    }

    fn pointer_down(&mut self, pointer: Point, button: PointerButton) -> EditorResponse {
        if button != PointerButton::Primary {
            return EditorResponse::Ignored;
        }

        if self.space_held {
            let Some(guard) = self.acquire(InteractionKind::Pan) else {
                return EditorResponse::Ignored;
            };
            self.interaction = Interaction::Pan(PanSession::begin(guard, &self.viewport, pointer));
            return EditorResponse::Handled;
        }

        let Some(id) = self.hit_test(pointer) else {
            return EditorResponse::Ignored;
        };
        let Some(guard) = self.acquire(InteractionKind::FrameDrag) else {
            return EditorResponse::Ignored;
        };
        let Some(frame) = self.store.get(id) else {
            return EditorResponse::Ignored;
        };
        let drag = DragSession::begin(guard, frame, self.viewport.drag_point(pointer));
        self.interaction = Interaction::Drag(drag);
        if let Err(e) = self.store.select(Some(id)) {
            log::warn!("cannot select {id}: {e}");
        }
        EditorResponse::Handled
    }

    fn pointer_move(&mut self, pointer: Point) -> Result<EditorResponse> {
        match &mut self.interaction {
            Interaction::Idle => return Ok(EditorResponse::Ignored),
            Interaction::Pan(pan) => pan.update(&mut self.viewport, pointer),
            Interaction::Drag(drag) => drag.queue(self.viewport.drag_point(pointer)),
            Interaction::Stops(stops) => stops.update(&mut self.store, pointer.x)?,
            Interaction::Angle(angle) => angle.update(&mut self.store, pointer)?,
            Interaction::Sidebar(resize) => resize.update(&mut self.sidebar, pointer.x),
        }
        Ok(EditorResponse::Handled)
    }

    fn pointer_up(&mut self, _pointer: Point) -> Result<EditorResponse> {
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle => Ok(EditorResponse::Ignored),
            Interaction::Drag(drag) => {
                let outcome = drag.finish(&mut self.store, &mut self.overrides)?;
                Ok(if outcome.moved {
                    EditorResponse::FrameMoved(outcome)
                } else {
                    EditorResponse::FrameClicked(outcome.frame)
                })
            }
            _ => Ok(EditorResponse::Handled),
        }
    }

    /// Animation-frame tick: apply the queued drag pointer. Returns whether
    /// anything visible changed.
    pub fn tick(&mut self) -> bool {
        match &mut self.interaction {
            Interaction::Drag(drag) => drag.flush(&mut self.overrides).is_some(),
            _ => false,
        }
    }

    /// Pointer-down on the gradient stop slider of the selected frame.
    pub fn begin_stop_drag(
        &mut self,
        track: StopTrack,
        x: f64,
        on_handle: Option<StopHandle>,
    ) -> Result<()> {
        let frame = self.selected_id()?;
        let guard = self.sessions.acquire(InteractionKind::GradientHandle)?;
        let drag = StopDrag::begin(guard, &mut self.store, frame, track, x, on_handle)?;
        self.interaction = Interaction::Stops(drag);
        Ok(())
    }

    /// Pointer-down on the angle dial of the selected frame.
    pub fn begin_angle_drag(&mut self, center: Point, pointer: Point) -> Result<()> {
        let frame = self.selected_id()?;
        let guard = self.sessions.acquire(InteractionKind::AnglePicker)?;
        let drag = AngleDrag::begin(guard, &mut self.store, frame, center, pointer)?;
        self.interaction = Interaction::Angle(drag);
        Ok(())
    }

    /// Pointer-down on the sidebar's resize handle.
    pub fn begin_sidebar_resize(&mut self, x: f64) -> Result<()> {
        let guard = self.sessions.acquire(InteractionKind::SidebarResize)?;
        self.interaction = Interaction::Sidebar(SidebarResize::begin(guard, &self.sidebar, x));
        Ok(())
    }

    // ─── Frames ──────────────────────────────────────────────────────────

    pub fn add_frame(&mut self, archetype_id: &str) -> Result<FrameId> {
        Ok(self.store.add(archetype_id)?)
    }

    pub fn add_companion(&mut self, source: FrameId, archetype_id: &str) -> Result<FrameId> {
        Ok(self.store.add_companion(source, archetype_id)?)
    }

    pub fn select(&mut self, id: Option<FrameId>) -> Result<()> {
        Ok(self.store.select(id)?)
    }

    /// Delete a frame. A drag of that frame is abandoned first.
    pub fn delete_frame(&mut self, id: FrameId) -> Result<()> {
        let dragging = matches!(&self.interaction, Interaction::Drag(d) if d.frame_id() == id);
        if dragging {
            if let Interaction::Drag(drag) = std::mem::take(&mut self.interaction) {
                drag.cancel(&mut self.overrides);
            }
        }
        self.store.delete(id)?;
        Ok(())
    }

    fn selected_id(&self) -> Result<FrameId> {
        self.store.selected().ok_or(EditorError::NoSelection)
    }

    /// Set one style key on the selected frame.
    pub fn set_style(&mut self, key: StyleKey, value: impl Into<StyleValue>) -> Result<()> {
        let id = self.selected_id()?;
        Ok(self.store.set_style(id, key, value)?)
    }

    pub fn set_cta_link(&mut self, link: &str) -> Result<()> {
        if let Err(e) = validate_cta_link(link) {
            return self.fail(e);
        }
        self.set_style(StyleKey::CtaLink, link.trim())
    }

    // ─── Collaborators ───────────────────────────────────────────────────

    fn fail<T>(&mut self, error: EditorError) -> Result<T> {
        log::warn!("{error}");
        self.notices.push(Notice {
            level: NoticeLevel::Error,
            message: error.to_string(),
        });
        Err(error)
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        });
    }

    /// Use the idea itself as the background prompt of the selected frame.
    pub fn simple_prompt(&mut self, idea: &str) -> Result<()> {
        let idea = idea.trim();
        if idea.is_empty() {
            return self.fail(EditorError::EmptyPrompt);
        }
        self.set_style(StyleKey::BackgroundAiPrompt, idea)
    }

    /// Expand an idea into a background prompt through the prompt service.
    pub fn magic_prompt(
        &mut self,
        service: &dyn PromptService,
        idea: &str,
        brand: Option<&BrandContext>,
    ) -> Result<String> {
        let idea = idea.trim();
        if idea.is_empty() {
            return self.fail(EditorError::EmptyPrompt);
        }
        let id = match self.selected_id() {
            Ok(id) => id,
            Err(e) => return self.fail(e),
        };
        let prompt = match service.generate(idea, brand) {
            Ok(p) if !p.trim().is_empty() => p,
            Ok(_) => {
                return self.fail(
                    crate::error::CollabError::Empty {
                        service: "prompt service",
                    }
                    .into(),
                );
            }
            Err(e) => return self.fail(e.into()),
        };
        self.store
            .set_style(id, StyleKey::BackgroundAiPrompt, prompt.as_str())?;
        Ok(prompt)
    }

    /// Generate a background image from the selected frame's prompt. A frame
    /// in AI mode switches to image mode on success.
    pub fn generate_background(&mut self, service: &dyn ImageService) -> Result<String> {
        let id = match self.selected_id() {
            Ok(id) => id,
            Err(e) => return self.fail(e),
        };
        let Some(frame) = self.store.get(id) else {
            return self.fail(CoreError::UnknownFrame(id).into());
        };
        let prompt = frame.styles.text(StyleKey::BackgroundAiPrompt).trim().to_string();
        if prompt.is_empty() {
            return self.fail(EditorError::MissingImagePrompt);
        }
        let ai_mode = frame.styles.background_mode() == BackgroundMode::AiPrompt;
        let (width, height) = (frame.archetype.width, frame.archetype.height);

        let url = match service.generate(&prompt, id, width, height) {
            Ok(url) if !url.is_empty() => url,
            Ok(_) => {
                return self.fail(
                    crate::error::CollabError::Empty {
                        service: "image service",
                    }
                    .into(),
                );
            }
            Err(e) => return self.fail(e.into()),
        };
        if ai_mode {
            self.store.set_style(id, StyleKey::BackgroundType, "image")?;
        }
        self.store.set_style(id, StyleKey::BackgroundImage, url.as_str())?;
        log::info!("generated background for {id}");
        Ok(url)
    }

    /// Upload an image and store its URL in the selected frame's slot.
    pub fn upload_image(
        &mut self,
        service: &dyn UploadService,
        slot: ImageSlot,
        image: &RawImage,
    ) -> Result<String> {
        if !image.is_image() {
            return self.fail(EditorError::NotAnImage(image.mime.clone()));
        }
        let id = match self.selected_id() {
            Ok(id) => id,
            Err(e) => return self.fail(e),
        };
        let url = match service.upload(image) {
            Ok(url) => url,
            Err(e) => return self.fail(e.into()),
        };
        self.store.set_style(id, slot.key(), url.as_str())?;
        Ok(url)
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// The export trigger is enabled.
    pub fn can_export(&self) -> bool {
        !self.export_busy.get()
    }

    pub fn export_ticket(&self) -> Result<ExportTicket> {
        if self.export_busy.replace(true) {
            return Err(EditorError::ExportInProgress);
        }
        Ok(ExportTicket {
            busy: Rc::clone(&self.export_busy),
        })
    }

    /// Export one frame at full resolution into `sink`.
    pub fn export_frame(
        &mut self,
        id: FrameId,
        renderer: &ExportRenderer,
        images: &dyn ImageSource,
        sink: &mut dyn ExportSink,
    ) -> Result<ExportOutput> {
        let ticket = match self.export_ticket() {
            Ok(t) => t,
            Err(e) => return self.fail(e),
        };
        let Some(frame) = self.store.get(id) else {
            return self.fail(CoreError::UnknownFrame(id).into());
        };
        let result = renderer.export(frame, images, sink);
        drop(ticket);
        match result {
            Ok(output) => {
                if !output.skipped_images.is_empty() {
                    log::warn!(
                        "{} exported without {} image(s)",
                        output.file_name,
                        output.skipped_images.len()
                    );
                }
                Ok(output)
            }
            Err(e) => self.fail(e.into()),
        }
    }

    // ─── Projects ────────────────────────────────────────────────────────

    /// Save the canvas. Without a title the brand name (or a generic title)
    /// is used.
    pub fn save_project(
        &mut self,
        repo: &mut dyn ProjectRepository,
        owner: &str,
        title: Option<&str>,
        brand: Option<&BrandContext>,
    ) -> Result<String> {
        if self.store.is_empty() {
            return self.fail(EditorError::NothingToSave);
        }
        let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => t.to_string(),
            None => match brand.filter(|b| !b.name.trim().is_empty()) {
                Some(b) => format!("{} post", b.name.trim()),
                None => UNTITLED.to_string(),
            },
        };
        let frames_json = match encode_frames(self.store.frames()) {
            Ok(json) => json,
            Err(e) => return self.fail(e.into()),
        };
        let draft = ProjectDraft { title, frames_json };
        match repo.save_draft(owner, self.project_id.as_deref(), draft) {
            Ok(id) => {
                log::info!("saved project {id} ({} frames)", self.store.len());
                self.project_id = Some(id.clone());
                self.notify("Project saved");
                Ok(id)
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Replace the canvas with a stored project.
    pub fn load_project(
        &mut self,
        repo: &dyn ProjectRepository,
        owner: &str,
        project_id: &str,
    ) -> Result<()> {
        let project = match repo.get(owner, project_id) {
            Ok(p) => p,
            Err(e) => return self.fail(e.into()),
        };
        let frames = match project.frames() {
            Ok(frames) => frames,
            Err(e) => return self.fail(e.into()),
        };
        self.reset_interaction();
        self.store.replace(FrameStore::from_frames(frames));
        self.project_id = Some(project.id);
        log::info!("loaded project {project_id} ({} frames)", self.store.len());
        Ok(())
    }

    /// Empty canvas, not bound to any project.
    pub fn new_project(&mut self) {
        self.reset_interaction();
        self.store.clear();
        self.project_id = None;
    }

    fn reset_interaction(&mut self) {
        if let Interaction::Drag(drag) = std::mem::take(&mut self.interaction) {
            drag.cancel(&mut self.overrides);
        }
        self.overrides = PresentationOverrides::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pc_core::Position;

    #[test]
    fn hit_test_prefers_topmost() {
        let mut editor = CanvasEditor::default();
        let a = editor.add_frame("instagram-post").unwrap();
        let b = editor.add_frame("instagram-post").unwrap();
        // a at (100,100), b at (150,150); both 324 wide.
        // Screen = canvas + padding at zoom 1.
        assert_eq!(editor.hit_test(Point::new(145.0, 145.0)), Some(a));
        assert_eq!(editor.hit_test(Point::new(200.0, 200.0)), Some(b));
        assert_eq!(editor.hit_test(Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn card_rect_follows_override() {
        let mut editor = CanvasEditor::default();
        let id = editor.add_frame("instagram-story").unwrap();
        editor.overrides.set_position(id, Position::new(0.0, 0.0));
        let frame = editor.store.get(id).unwrap();
        let rect = editor.card_rect(frame);
        assert_eq!(rect.x0, 0.0);
        assert_eq!(rect.width(), 324.0);
        assert_eq!(rect.height(), 20.0 + 576.0);
    }

    #[test]
    fn export_ticket_serializes() {
        let editor = CanvasEditor::default();
        let ticket = editor.export_ticket().unwrap();
        assert!(!editor.can_export());
        assert!(matches!(
            editor.export_ticket(),
            Err(EditorError::ExportInProgress)
        ));
        drop(ticket);
        assert!(editor.can_export());
    }
}
