//! End-to-end tests for a headless session.
//!
//! A session is driven exactly like the viewer drives it: pointer and UI
//! calls, then `frame()` once per tick. The memory service is a local stub
//! so nothing touches the network.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use wishtree::error::MemoryError;
use wishtree::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

/// Answers every request for photo 1 slowly and every other photo at once.
struct Stub;

impl MemoryService for Stub {
    fn generate(&self, photo_id: u32, user_message: &str) -> Result<String, MemoryError> {
        match photo_id {
            1 => {
                std::thread::sleep(Duration::from_millis(50));
                Ok(format!("Photo one remembers {user_message}."))
            }
            _ if user_message.contains("ski") => Ok("A snowy memory.".to_string()),
            _ => Ok(format!("Memory for photo {photo_id}.")),
        }
    }
}

struct Broken;

impl MemoryService for Broken {
    fn generate(&self, _photo_id: u32, _user_message: &str) -> Result<String, MemoryError> {
        Err(MemoryError::Status(503))
    }
}

fn config() -> WishtreeConfig {
    let mut config = WishtreeConfig::default();
    config.scene.box_count = 8;
    config.scene.ball_count = 8;
    config.scene.light_count = 8;
    config.photos.builtin = (1..=4)
        .map(|i| format!("https://example.invalid/{i}.jpg"))
        .collect();
    config
}

fn session_with(service: impl MemoryService + 'static) -> Session {
    Session::new(&config(), Arc::new(service))
}

/// Tick until every memory request has come back.
fn settle(session: &mut Session) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while session.memory_in_flight() > 0 {
        assert!(Instant::now() < deadline, "memory request never resolved");
        std::thread::sleep(Duration::from_millis(5));
        session.frame(0.0);
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wishtree-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(dir: &std::path::Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(8, 6, image::Rgba([200, 30, 30, 255]))
        .save(&path)
        .unwrap();
    path
}

// ============================================================================
// Memory flow
// ============================================================================

#[test]
fn test_select_request_resolve_dismiss() {
    let mut session = session_with(Stub);

    assert!(session.click_photo(3));
    assert_eq!(session.selection().photo_id(), Some(3));
    assert!(session.selection().memory().is_none());
    assert!(!session.selection().is_loading());

    assert!(session.set_message("ski trip"));
    assert!(session.request_memory());
    assert!(session.selection().is_loading());

    settle(&mut session);
    assert_eq!(session.selection().memory(), Some("A snowy memory."));
    assert!(matches!(
        session.selection().selected().map(|s| &s.status),
        Some(MemoryStatus::Ready(_))
    ));

    session.dismiss();
    assert_eq!(session.selection(), &Selection::None);
    assert!(session.scene().photos().get(3).unwrap().user_message().is_none());
}

#[test]
fn test_response_for_previous_photo_is_discarded() {
    let mut session = session_with(Stub);

    session.click_photo(1);
    session.set_message("carols");
    session.request_memory();

    // Move on before photo 1's answer is applied
    session.click_photo(2);
    settle(&mut session);

    assert_eq!(session.selection().photo_id(), Some(2));
    assert!(session.selection().memory().is_none());
    assert!(!session.selection().is_loading());

    session.request_memory();
    settle(&mut session);
    assert_eq!(session.selection().memory(), Some("Memory for photo 2."));
}

#[test]
fn test_reselecting_same_photo_drops_pending_response() {
    let mut session = session_with(Stub);

    session.click_photo(1);
    session.request_memory();
    session.click_photo(1);
    settle(&mut session);

    assert_eq!(session.selection().photo_id(), Some(1));
    assert!(session.selection().memory().is_none());
}

#[test]
fn test_clicking_selected_photo_again_drops_its_message() {
    let mut session = session_with(Stub);

    session.click_photo(1);
    session.set_message("first");
    session.request_memory();
    assert_eq!(
        session.scene().photos().get(1).and_then(|e| e.user_message()),
        Some("first")
    );

    session.click_photo(1);
    assert!(session.scene().photos().get(1).unwrap().user_message().is_none());
    assert_eq!(session.controller().message(), Some(""));
    settle(&mut session);
}

#[test]
fn test_failure_shows_fallback() {
    let mut session = session_with(Broken);

    session.click_photo(4);
    session.request_memory();
    settle(&mut session);

    assert_eq!(session.selection().memory(), Some(DEFAULT_FALLBACK));
    assert!(matches!(
        session.selection().selected().map(|s| &s.status),
        Some(MemoryStatus::Failed(_))
    ));
}

#[test]
fn test_request_without_selection_does_nothing() {
    let mut session = session_with(Stub);
    assert!(!session.request_memory());
    assert_eq!(session.memory_in_flight(), 0);
}

// ============================================================================
// Pointer routing
// ============================================================================

#[test]
fn test_scene_press_forms_and_release_scatters() {
    let mut session = session_with(Stub);
    assert_eq!(session.tree_state(), TreeState::Formed);

    session.pointer_down(PointerTarget::Scene);
    assert_eq!(session.tree_state(), TreeState::Formed);
    session.pointer_up();
    assert_eq!(session.tree_state(), TreeState::Chaos);

    session.pointer_down(PointerTarget::Scene);
    assert_eq!(session.tree_state(), TreeState::Formed);
}

#[test]
fn test_photo_click_does_not_touch_tree() {
    let mut session = session_with(Stub);
    session.pointer_down(PointerTarget::Scene);
    session.pointer_up();

    session.pointer_down(PointerTarget::Photo(2));
    session.pointer_up();
    assert_eq!(session.selection().photo_id(), Some(2));
    assert_eq!(session.tree_state(), TreeState::Chaos);
}

#[test]
fn test_presses_go_to_modal_while_open() {
    let mut session = session_with(Stub);
    session.click_photo(2);

    session.pointer_down(PointerTarget::Scene);
    session.pointer_up();
    session.pointer_down(PointerTarget::Photo(3));
    session.pointer_up();

    assert_eq!(session.selection().photo_id(), Some(2));
    assert_eq!(session.tree_state(), TreeState::Formed);
}

#[test]
fn test_press_on_unknown_photo_counts_as_scene() {
    let mut session = session_with(Stub);
    session.pointer_down(PointerTarget::Scene);
    session.pointer_up();
    assert_eq!(session.tree_state(), TreeState::Chaos);

    session.pointer_down(PointerTarget::Photo(999));
    assert_eq!(session.selection(), &Selection::None);
    assert_eq!(session.tree_state(), TreeState::Formed);
    session.pointer_up();
    assert_eq!(session.tree_state(), TreeState::Chaos);

    assert!(!session.request_memory());
    assert_eq!(session.memory_in_flight(), 0);
}

#[test]
fn test_press_on_cleared_upload_does_not_select() {
    let dir = scratch_dir("press-cleared");
    let mut session = session_with(Stub);
    let id = session.upload([write_png(&dir, "gone.png")]).added[0];
    session.clear_uploads();

    session.pointer_down(PointerTarget::Photo(id));
    session.pointer_up();
    assert_eq!(session.selection(), &Selection::None);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_tree_keeps_morphing_while_selected() {
    let mut session = session_with(Stub);
    session.pointer_down(PointerTarget::Scene);
    session.pointer_up();
    session.click_photo(1);

    let before = session.scene().formed_fraction();
    for _ in 0..30 {
        session.frame(1.0 / 60.0);
    }
    assert!(session.scene().formed_fraction() < before);
}

// ============================================================================
// Uploads
// ============================================================================

#[test]
fn test_corrupt_upload_is_skipped() {
    let dir = scratch_dir("corrupt");
    let good_a = write_png(&dir, "a.png");
    let bad = dir.join("bad.png");
    std::fs::write(&bad, b"definitely not a png").unwrap();
    let good_b = write_png(&dir, "b.png");

    let mut session = session_with(Stub);
    let report = session.upload([good_a, bad.clone(), good_b]);

    assert_eq!(report.added, vec![5, 6]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, bad);
    assert_eq!(session.scene().photos().len(), 6);
    assert_eq!(session.scene().photos().uploaded_count(), 2);
    assert!(session.textures().get(5).is_some());
    assert!(session.textures().get(6).is_some());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_clear_uploads_removes_only_uploads() {
    let dir = scratch_dir("clear");
    let paths: Vec<PathBuf> = (0..3).map(|i| write_png(&dir, &format!("{i}.png"))).collect();

    let mut session = session_with(Stub);
    let builtin: Vec<u32> = session.scene().photos().iter().map(|e| e.id()).collect();
    let report = session.upload(paths);
    assert_eq!(report.added.len(), 3);
    assert_eq!(session.textures().len(), 3);

    assert_eq!(session.clear_uploads(), 3);
    let remaining: Vec<u32> = session.scene().photos().iter().map(|e| e.id()).collect();
    assert_eq!(remaining, builtin);
    assert!(session.textures().is_empty());

    // Nothing left to clear
    assert_eq!(session.clear_uploads(), 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_clearing_selected_upload_closes_modal() {
    let dir = scratch_dir("clear-selected");
    let path = write_png(&dir, "only.png");

    let mut session = session_with(Stub);
    let report = session.upload([path]);
    let id = report.added[0];

    assert!(session.click_photo(id));
    session.clear_uploads();
    assert_eq!(session.selection(), &Selection::None);
    assert!(!session.click_photo(id));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_uploads_keep_existing_ornaments_in_place() {
    let dir = scratch_dir("stable");
    let mut session = session_with(Stub);
    let before: Vec<Vec3> = session
        .scene()
        .photos()
        .particles()
        .map(|p| p.target_pos())
        .collect();

    session.upload([write_png(&dir, "x.png"), write_png(&dir, "y.png")]);
    let after: Vec<Vec3> = session
        .scene()
        .photos()
        .particles()
        .take(before.len())
        .map(|p| p.target_pos())
        .collect();
    assert_eq!(before, after);

    let _ = std::fs::remove_dir_all(&dir);
}
