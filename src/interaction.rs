//! Interaction controller.
//!
//! Turns pointer input into two independent state machines:
//!
//! - the **tree axis** ([`TreeState`]): press forms the tree, release
//!   scatters it;
//! - the **selection axis** ([`Selection`]): clicking a photo selects it,
//!   dismissing the modal clears it.
//!
//! The controller also runs the memory request lifecycle for the selected
//! photo. Every request gets a [`RequestToken`]; a response is only applied
//! if the selection is still waiting on that exact token. Anything else is a
//! superseded response and is dropped.
//!
//! The controller performs no I/O and cannot fail.

use crate::error::MemoryError;
use crate::memory::{MemoryRequest, MemoryResponse};
use crate::morph::TreeState;
use crate::selection::{MemoryStatus, RequestToken, SelectedPhoto, Selection};

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty scene surface.
    Scene,
    /// A photo ornament.
    Photo(u32),
    /// Modal dialog or other UI chrome drawn over the scene.
    Overlay,
}

/// Outcome of [`InteractionController::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The response updated the selection.
    Applied,
    /// The selection moved on; the response was discarded.
    Superseded,
}

/// Owner of the tree state and the photo selection.
#[derive(Debug, Clone)]
pub struct InteractionController {
    tree: TreeState,
    selection: Selection,
    generation: u64,
    pressed: Option<PointerTarget>,
    fallback: String,
}

impl InteractionController {
    /// Create a controller. `fallback` is shown when a memory request fails.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            tree: TreeState::Formed,
            selection: Selection::None,
            generation: 0,
            pressed: None,
            fallback: fallback.into(),
        }
    }

    #[inline]
    pub fn tree_state(&self) -> TreeState {
        self.tree
    }

    #[inline]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    // ========== Tree axis ==========

    /// Form the tree.
    pub fn press(&mut self) {
        self.tree = TreeState::Formed;
    }

    /// Scatter the tree.
    pub fn release(&mut self) {
        self.tree = TreeState::Chaos;
    }

    // ========== Pointer routing ==========

    /// Route a pointer press.
    ///
    /// While a photo is selected the modal covers the scene, so every press
    /// is treated as an overlay press.
    pub fn pointer_down(&mut self, target: PointerTarget) {
        let target = if self.selection.photo_id().is_some() {
            PointerTarget::Overlay
        } else {
            target
        };

        match target {
            PointerTarget::Scene => self.press(),
            PointerTarget::Photo(id) => self.click_photo(id),
            PointerTarget::Overlay => {}
        }
        self.pressed = Some(target);
    }

    /// Route a pointer release.
    ///
    /// Only a press that started on the scene scatters the tree; the release
    /// of a photo click or an overlay press is swallowed.
    pub fn pointer_up(&mut self) {
        if let Some(PointerTarget::Scene) = self.pressed.take() {
            self.release();
        }
    }

    // ========== Selection axis ==========

    /// Select a photo, discarding any memory or draft from a previous one.
    pub fn click_photo(&mut self, photo_id: u32) {
        if let Some(token) = self.selection.pending_token() {
            tracing::debug!(
                "selection moved to photo {photo_id}; request for photo {} will be discarded",
                token.photo_id
            );
        }
        self.selection = Selection::Selected(SelectedPhoto::new(photo_id));
    }

    /// Close the modal. Returns the photo that was selected.
    pub fn dismiss(&mut self) -> Option<u32> {
        let id = self.selection.photo_id();
        self.selection = Selection::None;
        id
    }

    /// Replace the draft message. Ignored unless a photo is selected and no
    /// memory has been requested yet.
    pub fn set_message(&mut self, text: impl Into<String>) -> bool {
        match self.selection.selected_mut() {
            Some(photo) if photo.status == MemoryStatus::Idle => {
                photo.message = text.into();
                true
            }
            _ => false,
        }
    }

    /// Draft message for the selected photo.
    pub fn message(&self) -> Option<&str> {
        self.selection.selected().map(|s| s.message.as_str())
    }

    // ========== Memory lifecycle ==========

    /// Start a memory request for the selected photo.
    ///
    /// Returns the request to dispatch, or `None` if nothing is selected or a
    /// request was already made for this selection.
    pub fn begin_request(&mut self) -> Option<MemoryRequest> {
        let photo = self.selection.selected_mut()?;
        if photo.status != MemoryStatus::Idle {
            return None;
        }

        self.generation += 1;
        let token = RequestToken {
            photo_id: photo.photo_id,
            generation: self.generation,
        };
        photo.status = MemoryStatus::Loading(token);

        Some(MemoryRequest {
            token,
            user_message: photo.message.clone(),
        })
    }

    /// Apply a response if it still belongs to the current selection.
    pub fn resolve(&mut self, response: MemoryResponse) -> Resolution {
        let MemoryResponse { token, result } = response;
        if self.selection.pending_token() != Some(token) {
            tracing::debug!(
                "discarding superseded memory for photo {} (generation {})",
                token.photo_id,
                token.generation
            );
            return Resolution::Superseded;
        }

        let status = match result {
            Ok(text) if !text.trim().is_empty() => MemoryStatus::Ready(text.trim().to_string()),
            Ok(_) => {
                tracing::warn!("memory service returned empty text for photo {}", token.photo_id);
                MemoryStatus::Failed(self.fallback.clone())
            }
            Err(e) => {
                log_failure(token, &e);
                MemoryStatus::Failed(self.fallback.clone())
            }
        };

        if let Some(photo) = self.selection.selected_mut() {
            photo.status = status;
        }
        Resolution::Applied
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(crate::memory::DEFAULT_FALLBACK)
    }
}

fn log_failure(token: RequestToken, error: &MemoryError) {
    tracing::warn!("memory request for photo {} failed: {error}", token.photo_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(token: RequestToken, text: &str) -> MemoryResponse {
        MemoryResponse {
            token,
            result: Ok(text.to_string()),
        }
    }

    #[test]
    fn test_press_release_press() {
        let mut ctl = InteractionController::default();
        assert_eq!(ctl.tree_state(), TreeState::Formed);
        ctl.press();
        ctl.release();
        assert_eq!(ctl.tree_state(), TreeState::Chaos);
        ctl.press();
        assert_eq!(ctl.tree_state(), TreeState::Formed);
    }

    #[test]
    fn test_photo_click_does_not_touch_tree() {
        let mut ctl = InteractionController::default();
        ctl.pointer_down(PointerTarget::Scene);
        ctl.pointer_up();
        assert_eq!(ctl.tree_state(), TreeState::Chaos);

        ctl.pointer_down(PointerTarget::Photo(4));
        ctl.pointer_up();
        assert_eq!(ctl.tree_state(), TreeState::Chaos);
        assert_eq!(ctl.selection().photo_id(), Some(4));
    }

    #[test]
    fn test_modal_swallows_presses() {
        let mut ctl = InteractionController::default();
        ctl.click_photo(1);
        ctl.pointer_down(PointerTarget::Scene);
        ctl.pointer_up();
        assert_eq!(ctl.tree_state(), TreeState::Formed);

        // Photos under the modal are not reachable either
        ctl.pointer_down(PointerTarget::Photo(2));
        ctl.pointer_up();
        assert_eq!(ctl.selection().photo_id(), Some(1));
    }

    #[test]
    fn test_click_resets_draft_and_memory() {
        let mut ctl = InteractionController::default();
        ctl.click_photo(1);
        assert!(ctl.set_message("first"));
        let req = ctl.begin_request().unwrap();
        assert_eq!(ctl.resolve(ok(req.token, "done")), Resolution::Applied);
        assert_eq!(ctl.selection().memory(), Some("done"));

        ctl.click_photo(2);
        assert_eq!(ctl.message(), Some(""));
        assert!(ctl.selection().memory().is_none());
        assert!(!ctl.selection().is_loading());
    }

    #[test]
    fn test_begin_request_only_once_per_selection() {
        let mut ctl = InteractionController::default();
        assert!(ctl.begin_request().is_none());
        ctl.click_photo(5);
        let first = ctl.begin_request();
        assert!(first.is_some());
        assert!(ctl.begin_request().is_none());
        // Draft is frozen while loading
        assert!(!ctl.set_message("late"));
    }

    #[test]
    fn test_superseded_response_is_dropped() {
        let mut ctl = InteractionController::default();
        ctl.click_photo(1);
        let a = ctl.begin_request().unwrap();

        ctl.click_photo(2);
        let b = ctl.begin_request().unwrap();

        assert_eq!(ctl.resolve(ok(a.token, "for A")), Resolution::Superseded);
        assert!(ctl.selection().is_loading());
        assert_eq!(ctl.selection().pending_token(), Some(b.token));

        assert_eq!(ctl.resolve(ok(b.token, "for B")), Resolution::Applied);
        assert_eq!(ctl.selection().memory(), Some("for B"));
    }

    #[test]
    fn test_same_photo_reselected_still_supersedes() {
        let mut ctl = InteractionController::default();
        ctl.click_photo(1);
        let old = ctl.begin_request().unwrap();
        ctl.click_photo(1);
        assert_eq!(ctl.resolve(ok(old.token, "stale")), Resolution::Superseded);
        assert_eq!(ctl.selection().selected().map(|s| &s.status), Some(&MemoryStatus::Idle));
    }

    #[test]
    fn test_response_after_dismiss_is_dropped() {
        let mut ctl = InteractionController::default();
        ctl.click_photo(1);
        let req = ctl.begin_request().unwrap();
        assert_eq!(ctl.dismiss(), Some(1));
        assert_eq!(ctl.resolve(ok(req.token, "late")), Resolution::Superseded);
        assert_eq!(ctl.selection(), &Selection::None);
    }

    #[test]
    fn test_failures_become_fallback() {
        let mut ctl = InteractionController::new("fallback text");
        ctl.click_photo(1);
        let req = ctl.begin_request().unwrap();
        let resolution = ctl.resolve(MemoryResponse {
            token: req.token,
            result: Err(MemoryError::EmptyResponse),
        });
        assert_eq!(resolution, Resolution::Applied);
        assert!(!ctl.selection().is_loading());
        assert_eq!(ctl.selection().memory(), Some("fallback text"));

        ctl.click_photo(2);
        let req = ctl.begin_request().unwrap();
        ctl.resolve(ok(req.token, "   "));
        assert_eq!(ctl.selection().memory(), Some("fallback text"));
    }
}
