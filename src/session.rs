//! One running wishing tree.
//!
//! [`Session`] is the single owner of everything the UI thread touches: the
//! scene, the interaction controller, the memory client and the photo
//! pixels. The viewer forwards input to it and calls [`Session::frame`] once
//! per redraw; tests drive it the same way without a window.
//!
//! Image resources follow one rule: pixels for a photo are inserted when the
//! photo is registered (or when its download finishes) and released exactly
//! once, when the photo is cleared.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::WishtreeConfig;
use crate::error::{MemoryError, TextureError};
use crate::interaction::{InteractionController, PointerTarget};
use crate::memory::{GeminiService, MemoryClient, MemoryService};
use crate::morph::TreeState;
use crate::ornaments::{ImageSource, Origin};
use crate::scene::Scene;
use crate::selection::Selection;
use crate::textures::{PhotoImage, PhotoTextures, TextureLoader};

/// Result of [`Session::upload`].
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Ids of the photos that were added, in input order.
    pub added: Vec<u32>,
    /// Files that could not be read or decoded.
    pub skipped: Vec<(PathBuf, TextureError)>,
}

/// Scene, input state and async work for one window.
pub struct Session {
    scene: Scene,
    controller: InteractionController,
    memory: MemoryClient,
    textures: PhotoTextures,
    loader: TextureLoader,
}

impl Session {
    /// Build a session that generates memories with `service`.
    pub fn new(config: &WishtreeConfig, service: Arc<dyn MemoryService>) -> Self {
        Self {
            scene: Scene::new(config),
            controller: InteractionController::new(config.memory.fallback.clone()),
            memory: MemoryClient::new(service),
            textures: PhotoTextures::new(),
            loader: TextureLoader::new(),
        }
    }

    /// Build a session backed by the Gemini API.
    pub fn with_gemini(config: &WishtreeConfig) -> Result<Self, MemoryError> {
        let service = GeminiService::from_config(&config.memory)?;
        Ok(Self::new(config, Arc::new(service)))
    }

    /// Start downloading the pixels of every built-in photo.
    pub fn load_builtin_textures(&mut self) {
        for entry in self.scene.photos().iter() {
            if entry.origin() == Origin::Builtin && self.textures.get(entry.id()).is_none() {
                self.loader.request(entry.id(), entry.source().clone());
            }
        }
    }

    // ========== Input ==========

    /// Route a pointer press. A press on a photo that is no longer
    /// registered counts as a press on the scene.
    pub fn pointer_down(&mut self, target: PointerTarget) {
        let target = match target {
            PointerTarget::Photo(id) if !self.scene.photos().contains(id) => {
                tracing::warn!("press on unknown photo {id}; treating it as the scene");
                PointerTarget::Scene
            }
            other => other,
        };
        let before = self.controller.selection().photo_id();
        self.controller.pointer_down(target);
        self.forget_message_if_moved(before);
    }

    pub fn pointer_up(&mut self) {
        self.controller.pointer_up();
    }

    /// Select a photo. Returns `false` if no photo has that id.
    ///
    /// The click always starts a fresh selection, so the previous photo's
    /// message is dropped even when the same photo is clicked again.
    pub fn click_photo(&mut self, photo_id: u32) -> bool {
        if !self.scene.photos().contains(photo_id) {
            tracing::warn!("ignoring click on unknown photo {photo_id}");
            return false;
        }
        if let Some(prev) = self.controller.selection().photo_id() {
            self.scene.photos_mut().set_user_message(prev, None);
        }
        self.controller.click_photo(photo_id);
        true
    }

    /// Edit the draft message for the selected photo.
    pub fn set_message(&mut self, text: impl Into<String>) -> bool {
        self.controller.set_message(text)
    }

    /// Ask for a memory for the selected photo.
    ///
    /// Returns `false` if nothing is selected or a memory was already asked
    /// for this selection.
    pub fn request_memory(&mut self) -> bool {
        let Some(request) = self.controller.begin_request() else {
            return false;
        };

        let message = request.user_message.trim();
        let message = (!message.is_empty()).then(|| message.to_string());
        self.scene
            .photos_mut()
            .set_user_message(request.photo_id(), message);

        self.memory.submit(request);
        true
    }

    /// Close the modal, dropping the draft and memory.
    pub fn dismiss(&mut self) {
        if let Some(id) = self.controller.dismiss() {
            self.scene.photos_mut().set_user_message(id, None);
        }
    }

    /// A different photo (or none) is selected now; the previous one's
    /// message no longer applies.
    fn forget_message_if_moved(&mut self, before: Option<u32>) {
        if let Some(prev) = before {
            if self.controller.selection().photo_id() != Some(prev) {
                self.scene.photos_mut().set_user_message(prev, None);
            }
        }
    }

    // ========== Uploads ==========

    /// Decode and register local image files.
    ///
    /// Files that fail to load are skipped; the rest are still added.
    pub fn upload<I>(&mut self, paths: I) -> UploadReport
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut report = UploadReport::default();
        let mut decoded = Vec::new();

        for path in paths {
            match PhotoImage::from_file(&path) {
                Ok(image) => decoded.push((path, image)),
                Err(e) => {
                    tracing::warn!("skipping upload {}: {e}", path.display());
                    report.skipped.push((path, e));
                }
            }
        }

        let (sources, images): (Vec<ImageSource>, Vec<PhotoImage>) = decoded
            .into_iter()
            .map(|(path, image)| (ImageSource::File(path), image))
            .unzip();

        report.added = self.scene.photos_mut().add_uploads(sources);
        for (&id, image) in report.added.iter().zip(images) {
            self.textures.insert(id, image);
        }
        report
    }

    /// Remove every uploaded photo and release its pixels.
    ///
    /// Returns the number of photos removed.
    pub fn clear_uploads(&mut self) -> usize {
        let uploaded: Vec<u32> = self
            .scene
            .photos()
            .iter()
            .filter(|e| e.origin() == Origin::Uploaded)
            .map(|e| e.id())
            .collect();

        if let Some(selected) = self.controller.selection().photo_id() {
            if uploaded.contains(&selected) {
                self.dismiss();
            }
        }

        let released = self.scene.photos_mut().clear_uploads();
        let freed = self.textures.release(uploaded.iter().copied());
        if freed != released.len() {
            tracing::warn!(
                "cleared {} uploads but released {} textures",
                released.len(),
                freed
            );
        }
        released.len()
    }

    // ========== Frame ==========

    /// Advance one frame: apply finished async work, then animate.
    pub fn frame(&mut self, dt: f32) {
        while let Some(response) = self.memory.poll() {
            self.controller.resolve(response);
        }

        while let Some(loaded) = self.loader.poll() {
            // The photo may have been cleared while downloading
            if !self.scene.photos().contains(loaded.photo_id) {
                continue;
            }
            match loaded.result {
                Ok(image) => self.textures.insert(loaded.photo_id, image),
                Err(e) => tracing::warn!("could not load photo {}: {e}", loaded.photo_id),
            }
        }

        self.scene.update(self.controller.tree_state(), dt);
    }

    // ========== Accessors ==========

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn selection(&self) -> &Selection {
        self.controller.selection()
    }

    pub fn tree_state(&self) -> TreeState {
        self.controller.tree_state()
    }

    pub fn textures(&self) -> &PhotoTextures {
        &self.textures
    }

    /// Photo downloads still running. Failed downloads count as finished.
    pub fn textures_loading(&self) -> usize {
        self.loader.pending()
    }

    /// Memory requests still waiting on the service.
    pub fn memory_in_flight(&self) -> usize {
        self.memory.in_flight()
    }
}
