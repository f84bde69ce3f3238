//! Integration tests: input events → canvas editor → frame store.

use kurbo::Point;
use pc_core::{MemoryRepository, PersistError, Position, ProjectDraft, ProjectRepository, StyleKey};
use pc_editor::gradient::{StopHandle, StopTrack};
use pc_editor::{
    BrandContext, CanvasEditor, CollabError, EditorError, EditorResponse, ImageService, ImageSlot,
    InputEvent, InteractionKind, Modifiers, NoticeLevel, PromptService, RawImage, UploadService,
};
use pc_render::{ExportConfig, ExportRenderer, MemoryImageSource, MemorySink};
use pretty_assertions::assert_eq;
use std::cell::Cell;

// Screen = canvas + 40 px padding at zoom 1 with the container at the origin.
const PAD: f64 = 40.0;

fn screen(x: f64, y: f64) -> (f64, f64) {
    (x + PAD, y + PAD)
}

fn down(x: f64, y: f64) -> InputEvent {
    let (sx, sy) = screen(x, y);
    InputEvent::pointer_down(sx, sy)
}

fn mv(x: f64, y: f64) -> InputEvent {
    let (sx, sy) = screen(x, y);
    InputEvent::pointer_move(sx, sy)
}

fn up(x: f64, y: f64) -> InputEvent {
    let (sx, sy) = screen(x, y);
    InputEvent::pointer_up(sx, sy)
}

struct Prompts(Result<&'static str, &'static str>);

impl PromptService for Prompts {
    fn generate(&self, _idea: &str, _brand: Option<&BrandContext>) -> Result<String, CollabError> {
        self.0.map(str::to_string).map_err(|reason| CollabError::Failed {
            service: "prompt service",
            reason: reason.to_string(),
        })
    }
}

struct Images {
    calls: Cell<u32>,
    fail: bool,
}

impl ImageService for Images {
    fn generate(&self, prompt: &str, _frame: pc_core::FrameId, w: u32, h: u32) -> Result<String, CollabError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(CollabError::Unavailable {
                service: "image service",
                reason: "offline".into(),
            });
        }
        Ok(format!("https://img.example.com/{w}x{h}/{}.png", prompt.len()))
    }
}

struct Uploads(Cell<u32>);

impl UploadService for Uploads {
    fn upload(&self, image: &RawImage) -> Result<String, CollabError> {
        self.0.set(self.0.get() + 1);
        Ok(format!("https://cdn.example.com/u.{}", image.extension()))
    }
}

// ─── Drag ────────────────────────────────────────────────────────────────

#[test]
fn drag_commits_once() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();
    assert_eq!(editor.store().get(id).unwrap().position, Position::new(100.0, 100.0));
    editor.select(None).unwrap();

    editor.handle(&down(110.0, 110.0)).unwrap();
    assert_eq!(editor.store().selected(), Some(id));
    assert_eq!(editor.active_interaction(), Some(InteractionKind::FrameDrag));
    let rev = editor.store().revision();

    editor.handle(&mv(200.0, 180.0)).unwrap();
    editor.handle(&mv(310.0, 260.0)).unwrap();
    assert!(editor.tick());
    assert_eq!(editor.overrides().get(id), Some(Position::new(300.0, 250.0)));
    assert_eq!(editor.store().revision(), rev, "moves never touch the store");

    let resp = editor.handle(&up(310.0, 260.0)).unwrap();
    let EditorResponse::FrameMoved(outcome) = resp else {
        panic!("expected a move, got {resp:?}");
    };
    assert_eq!(outcome.from, Position::new(100.0, 100.0));
    assert_eq!(outcome.to, Position::new(300.0, 250.0));
    assert_eq!(editor.store().revision(), rev + 1);
    assert_eq!(editor.store().get(id).unwrap().position, Position::new(300.0, 250.0));
    assert!(editor.overrides().is_empty());
    assert_eq!(editor.active_interaction(), None);
}

#[test]
fn pointer_up_flushes_queued_move() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();

    editor.handle(&down(100.0, 100.0)).unwrap();
    editor.handle(&mv(160.0, 130.0)).unwrap();
    // No tick before release.
    editor.handle(&up(160.0, 130.0)).unwrap();
    assert_eq!(editor.store().get(id).unwrap().position, Position::new(160.0, 130.0));
}

#[test]
fn drag_clamps_to_positive_canvas() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();
    editor.handle(&down(120.0, 120.0)).unwrap();
    editor.handle(&mv(-200.0, 5.0)).unwrap();
    editor.handle(&up(-200.0, 5.0)).unwrap();
    let p = editor.store().get(id).unwrap().position;
    assert!(p.x >= 0.0 && p.y >= 0.0);
    assert_eq!(p, Position::new(0.0, 0.0));
}

#[test]
fn unmoved_press_is_a_click() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();
    editor.handle(&down(150.0, 150.0)).unwrap();
    let resp = editor.handle(&up(150.0, 150.0)).unwrap();
    assert_eq!(resp, EditorResponse::FrameClicked(id));
}

#[test]
fn drag_uses_zoomed_deltas() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();
    editor.viewport_mut().set_zoom(2.0);
    // Frame at canvas (100,100) sits at screen ((100 + 40) × 2) = 280.
    editor.handle(&InputEvent::pointer_down(300.0, 300.0)).unwrap();
    editor.handle(&InputEvent::pointer_move(400.0, 340.0)).unwrap();
    editor.handle(&InputEvent::pointer_up(400.0, 340.0)).unwrap();
    assert_eq!(editor.store().get(id).unwrap().position, Position::new(150.0, 120.0));
}

#[test]
fn companion_curve_follows_drag() {
    let mut editor = CanvasEditor::default();
    let src = editor.add_frame("instagram-post").unwrap();
    editor.add_companion(src, "reddit-post").unwrap();
    let before = editor.connections()[0].start();

    editor.handle(&down(110.0, 110.0)).unwrap();
    editor.handle(&mv(110.0, 160.0)).unwrap();
    editor.tick();
    let during = editor.connections()[0].start();
    assert_eq!(during.y - before.y, 50.0);
    editor.handle(&up(110.0, 160.0)).unwrap();
}

// ─── Pan, zoom and keys ──────────────────────────────────────────────────

#[test]
fn space_arms_pan_and_release_cancels() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();

    editor.handle(&InputEvent::key(" ", Modifiers::NONE)).unwrap();
    assert!(editor.pan_armed());
    // Pressing on a frame pans instead of dragging it.
    editor.handle(&down(110.0, 110.0)).unwrap();
    assert_eq!(editor.active_interaction(), Some(InteractionKind::Pan));
    editor.handle(&mv(140.0, 90.0)).unwrap();
    assert_eq!(editor.viewport().pan(), kurbo::Vec2::new(30.0, -20.0));

    // Wheel during a pan is swallowed.
    let wheel = InputEvent::Wheel {
        dx: 0.0,
        dy: 5.0,
        modifiers: Modifiers::SHIFT,
    };
    assert_eq!(editor.handle(&wheel).unwrap(), EditorResponse::Handled);
    assert_eq!(editor.viewport().zoom(), 1.0);

    editor.handle(&InputEvent::key_up(" ")).unwrap();
    assert_eq!(editor.active_interaction(), None);
    assert!(!editor.pan_armed());
    assert_eq!(editor.store().get(id).unwrap().position, Position::new(100.0, 100.0));
}

#[test]
fn zoom_shortcuts_and_wheel() {
    let mut editor = CanvasEditor::default();
    editor.handle(&InputEvent::key("=", Modifiers::CTRL)).unwrap();
    editor.handle(&InputEvent::key("+", Modifiers::META)).unwrap();
    assert_eq!(editor.viewport().zoom(), 1.2);

    let typing = InputEvent::KeyDown {
        key: "-".into(),
        modifiers: Modifiers::CTRL,
        typing: true,
    };
    assert_eq!(editor.handle(&typing).unwrap(), EditorResponse::Ignored);
    assert_eq!(editor.viewport().zoom(), 1.2);

    let plain = InputEvent::Wheel {
        dx: 0.0,
        dy: 3.0,
        modifiers: Modifiers::NONE,
    };
    assert_eq!(editor.handle(&plain).unwrap(), EditorResponse::PassThrough);

    editor.handle(&InputEvent::key("0", Modifiers::CTRL)).unwrap();
    assert_eq!(editor.viewport().zoom(), 1.0);
    assert_eq!(editor.viewport().pan(), kurbo::Vec2::ZERO);
}

// ─── Gradient editor and sidebar ─────────────────────────────────────────

#[test]
fn stop_slider_keeps_order() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();
    let track = StopTrack::new(0.0, 100.0);

    editor.begin_stop_drag(track, 70.0, Some(StopHandle::Start)).unwrap();
    editor.handle(&InputEvent::pointer_move(90.0, 0.0)).unwrap();
    editor.handle(&InputEvent::pointer_up(90.0, 0.0)).unwrap();
    assert_eq!(editor.store().get(id).unwrap().styles.gradient_stops(), (90.0, 100.0));

    editor.begin_stop_drag(track, 99.0, None).unwrap();
    editor.handle(&InputEvent::pointer_move(-40.0, 0.0)).unwrap();
    editor.handle(&InputEvent::pointer_up(-40.0, 0.0)).unwrap();
    let (start, end) = editor.store().get(id).unwrap().styles.gradient_stops();
    assert_eq!((start, end), (90.0, 90.0));
    assert!(0.0 <= start && start <= end && end <= 100.0);
}

#[test]
fn angle_picker_writes_css_angle() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();
    let center = Point::new(500.0, 500.0);
    editor.begin_angle_drag(center, Point::new(500.0, 400.0)).unwrap();
    assert_eq!(editor.store().get(id).unwrap().styles.num(StyleKey::BackgroundGradientAngle), 0.0);
    editor.handle(&InputEvent::pointer_move(500.0, 600.0)).unwrap();
    editor.handle(&InputEvent::pointer_up(500.0, 600.0)).unwrap();
    assert_eq!(editor.store().get(id).unwrap().styles.num(StyleKey::BackgroundGradientAngle), 180.0);
}

#[test]
fn one_interaction_at_a_time() {
    let mut editor = CanvasEditor::default();
    editor.add_frame("instagram-post").unwrap();
    editor.begin_sidebar_resize(1000.0).unwrap();
    assert!(matches!(
        editor.begin_angle_drag(Point::ORIGIN, Point::new(0.0, -1.0)),
        Err(EditorError::SessionBusy { .. })
    ));
    editor.handle(&InputEvent::pointer_move(900.0, 0.0)).unwrap();
    editor.handle(&InputEvent::pointer_up(900.0, 0.0)).unwrap();
    assert_eq!(editor.sidebar().width(), 356.0);
    assert_eq!(editor.active_interaction(), None);
}

#[test]
fn gradient_editing_needs_selection() {
    let mut editor = CanvasEditor::default();
    assert!(matches!(
        editor.begin_stop_drag(StopTrack::new(0.0, 100.0), 10.0, None),
        Err(EditorError::NoSelection)
    ));
}

// ─── Collaborators ───────────────────────────────────────────────────────

#[test]
fn empty_idea_is_rejected_before_calling_service() {
    let mut editor = CanvasEditor::default();
    editor.add_frame("instagram-post").unwrap();
    let rev = editor.store().revision();
    let err = editor.magic_prompt(&Prompts(Ok("unused")), "   ", None).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(editor.store().revision(), rev);
    assert_eq!(editor.take_notices().len(), 1);
}

#[test]
fn magic_prompt_sets_background_prompt() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();
    let brand = BrandContext::named("Acme");
    editor
        .magic_prompt(&Prompts(Ok("a sunny beach, product centred")), "beach", Some(&brand))
        .unwrap();
    assert_eq!(
        editor.store().get(id).unwrap().styles.text(StyleKey::BackgroundAiPrompt),
        "a sunny beach, product centred"
    );
}

#[test]
fn failed_collaborator_leaves_state_and_notifies_once() {
    let mut editor = CanvasEditor::default();
    editor.add_frame("instagram-post").unwrap();
    let rev = editor.store().revision();
    assert!(editor.magic_prompt(&Prompts(Err("timeout")), "idea", None).is_err());
    assert_eq!(editor.store().revision(), rev);
    let notices = editor.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.contains("timeout"));
}

#[test]
fn generated_image_switches_ai_mode_to_image() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-story").unwrap();
    let images = Images {
        calls: Cell::new(0),
        fail: false,
    };

    assert!(matches!(
        editor.generate_background(&images),
        Err(EditorError::MissingImagePrompt)
    ));
    assert_eq!(images.calls.get(), 0);

    editor.set_style(StyleKey::BackgroundType, "ai").unwrap();
    editor.simple_prompt("  neon city  ").unwrap();
    let url = editor.generate_background(&images).unwrap();

    let styles = &editor.store().get(id).unwrap().styles;
    assert_eq!(url, "https://img.example.com/1080x1920/9.png");
    assert_eq!(styles.text(StyleKey::BackgroundType), "image");
    assert_eq!(styles.text(StyleKey::BackgroundImage), url);
}

#[test]
fn failed_generation_keeps_ai_mode() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();
    editor.set_style(StyleKey::BackgroundType, "ai").unwrap();
    editor.simple_prompt("forest").unwrap();
    editor.take_notices();

    let images = Images {
        calls: Cell::new(0),
        fail: true,
    };
    assert!(editor.generate_background(&images).is_err());
    assert_eq!(editor.store().get(id).unwrap().styles.text(StyleKey::BackgroundType), "ai");
    assert_eq!(editor.take_notices().len(), 1);
}

#[test]
fn non_image_upload_is_rejected() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();
    let uploads = Uploads(Cell::new(0));
    let pdf = RawImage {
        file_name: "brief.pdf".into(),
        mime: "application/pdf".into(),
        bytes: vec![1, 2, 3],
    };
    assert!(matches!(
        editor.upload_image(&uploads, ImageSlot::Logo, &pdf),
        Err(EditorError::NotAnImage(_))
    ));
    assert_eq!(uploads.0.get(), 0);

    let png = RawImage {
        file_name: "logo.png".into(),
        mime: "image/png".into(),
        bytes: vec![1, 2, 3],
    };
    editor.upload_image(&uploads, ImageSlot::Logo, &png).unwrap();
    assert_eq!(
        editor.store().get(id).unwrap().styles.text(StyleKey::LogoImage),
        "https://cdn.example.com/u.png"
    );
}

#[test]
fn malformed_cta_link_is_rejected() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();
    assert!(matches!(
        editor.set_cta_link("not a link"),
        Err(EditorError::InvalidLink(_))
    ));
    editor.set_cta_link("https://shop.example.com").unwrap();
    assert_eq!(
        editor.store().get(id).unwrap().styles.text(StyleKey::CtaLink),
        "https://shop.example.com"
    );
}

// ─── Export and projects ─────────────────────────────────────────────────

#[test]
fn export_through_editor_releases_ticket() {
    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();
    let renderer = ExportRenderer::new(ExportConfig {
        load_system_fonts: false,
        ..ExportConfig::default()
    });
    let mut sink = MemorySink::default();

    let out = editor
        .export_frame(id, &renderer, &MemoryImageSource::new(), &mut sink)
        .unwrap();
    assert_eq!((out.width, out.height), (1080, 1080));
    assert_eq!(sink.files.len(), 1);
    assert!(editor.can_export());
}

#[test]
fn save_requires_frames_and_reuses_project() {
    let mut editor = CanvasEditor::default();
    let mut repo = MemoryRepository::new();

    assert!(matches!(
        editor.save_project(&mut repo, "u1", None, None),
        Err(EditorError::NothingToSave)
    ));

    let src = editor.add_frame("instagram-post").unwrap();
    editor.add_companion(src, "reddit-post").unwrap();
    let brand = BrandContext::named("Acme");
    let id = editor.save_project(&mut repo, "u1", None, Some(&brand)).unwrap();
    let again = editor.save_project(&mut repo, "u1", None, Some(&brand)).unwrap();
    assert_eq!(id, again);

    let projects = repo.list("u1").unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].title, "Acme post");

    let mut other = CanvasEditor::default();
    other.load_project(&repo, "u1", &id).unwrap();
    assert_eq!(other.store().len(), 2);
    assert_eq!(other.project_id(), Some(id.as_str()));
    let child = &other.store().frames()[1];
    assert_eq!(child.connections.parent_id, Some(src));
}

#[test]
fn corrupt_project_load_keeps_canvas() {
    let mut repo = MemoryRepository::new();
    let broken = repo
        .save(
            "u1",
            None,
            ProjectDraft {
                title: "Broken".into(),
                frames_json: "{oops".into(),
            },
        )
        .unwrap();

    let mut editor = CanvasEditor::default();
    let id = editor.add_frame("instagram-post").unwrap();
    editor.take_notices();

    let err = editor.load_project(&repo, "u1", &broken).unwrap_err();
    assert!(matches!(err, EditorError::Persist(PersistError::Json(_))));
    assert_eq!(editor.store().len(), 1);
    assert!(editor.store().contains(id));
    assert_eq!(editor.project_id(), None);

    let notices = editor.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}
