//! Photo selection state.
//!
//! At most one photo is selected at a time. The selection carries the draft
//! message the user is typing and the state of the memory generated for it.
//! A fresh selection always starts idle with an empty draft.

/// Identifies one memory request.
///
/// The generation counter is bumped for every request the controller
/// issues, so two requests for the same photo are still told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    pub photo_id: u32,
    pub generation: u64,
}

/// Progress of the memory for the selected photo.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MemoryStatus {
    /// Nothing requested yet; the draft form is shown.
    #[default]
    Idle,
    /// Waiting on the request identified by the token.
    Loading(RequestToken),
    /// The service produced this text.
    Ready(String),
    /// The request failed; this is the fallback text shown instead.
    Failed(String),
}

/// The currently selected photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPhoto {
    pub photo_id: u32,
    /// Draft context message.
    pub message: String,
    pub status: MemoryStatus,
}

impl SelectedPhoto {
    pub fn new(photo_id: u32) -> Self {
        Self {
            photo_id,
            message: String::new(),
            status: MemoryStatus::Idle,
        }
    }
}

/// Selection axis: nothing, or one photo.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Selected(SelectedPhoto),
}

impl Selection {
    /// Id of the selected photo, if any.
    pub fn photo_id(&self) -> Option<u32> {
        match self {
            Selection::None => None,
            Selection::Selected(s) => Some(s.photo_id),
        }
    }

    pub fn selected(&self) -> Option<&SelectedPhoto> {
        match self {
            Selection::None => None,
            Selection::Selected(s) => Some(s),
        }
    }

    pub fn selected_mut(&mut self) -> Option<&mut SelectedPhoto> {
        match self {
            Selection::None => None,
            Selection::Selected(s) => Some(s),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Selection::Selected(SelectedPhoto {
                status: MemoryStatus::Loading(_),
                ..
            })
        )
    }

    /// Memory text to display: generated or fallback.
    pub fn memory(&self) -> Option<&str> {
        match self.selected().map(|s| &s.status) {
            Some(MemoryStatus::Ready(text)) | Some(MemoryStatus::Failed(text)) => Some(text),
            _ => None,
        }
    }

    /// Token of the request currently awaited, if any.
    pub fn pending_token(&self) -> Option<RequestToken> {
        match self.selected().map(|s| &s.status) {
            Some(MemoryStatus::Loading(token)) => Some(*token),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        let selection = Selection::default();
        assert_eq!(selection.photo_id(), None);
        assert!(!selection.is_loading());
        assert!(selection.memory().is_none());
    }

    #[test]
    fn test_memory_exposes_ready_and_failed() {
        let mut photo = SelectedPhoto::new(3);
        photo.status = MemoryStatus::Ready("A snowy memory.".into());
        assert_eq!(Selection::Selected(photo.clone()).memory(), Some("A snowy memory."));

        photo.status = MemoryStatus::Failed("fallback".into());
        assert_eq!(Selection::Selected(photo).memory(), Some("fallback"));
    }

    #[test]
    fn test_pending_token() {
        let token = RequestToken {
            photo_id: 3,
            generation: 9,
        };
        let mut photo = SelectedPhoto::new(3);
        photo.status = MemoryStatus::Loading(token);
        let selection = Selection::Selected(photo);
        assert!(selection.is_loading());
        assert_eq!(selection.pending_token(), Some(token));
        assert!(selection.memory().is_none());
    }
}
