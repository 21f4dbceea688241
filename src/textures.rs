//! Photo image loading.
//!
//! The registry only knows an [`ImageSource`]; this module turns one into
//! RGBA pixels ready for upload and tracks which photo owns which pixels.
//!
//! - Local uploads are decoded synchronously so a bad file can be reported
//!   (and skipped) right away.
//! - Built-in photos are remote URLs and are fetched on worker threads by
//!   [`TextureLoader`], arriving a few frames later.
//!
//! Images are shrunk to at most [`MAX_DIMENSION`] pixels on a side; an
//! ornament never covers more than a small part of the screen.
//!
//! # Supported Formats
//!
//! - PNG
//! - JPEG

use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::error::TextureError;
use crate::ornaments::ImageSource;

/// Longest side of a decoded photo, in pixels.
pub const MAX_DIMENSION: u32 = 512;

/// Decoded RGBA pixels for one photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoImage {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PhotoImage {
    /// Wrap raw RGBA data. Returns `None` if the length does not match.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        (data.len() == expected && expected > 0).then_some(Self {
            data,
            width,
            height,
        })
    }

    /// A 1x1 image of a single color, used until the real pixels arrive.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            data: rgba.to_vec(),
            width: 1,
            height: 1,
        }
    }

    /// Decode an encoded image (PNG, JPEG) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(img))
    }

    /// Read and decode an image file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::decode(&bytes)
    }

    /// Download and decode a remote image. Blocks.
    pub fn fetch(url: &str) -> Result<Self, TextureError> {
        let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
        Self::decode(&bytes)
    }

    /// Load whatever `source` points at. Blocks for URLs.
    pub fn load(source: &ImageSource) -> Result<Self, TextureError> {
        match source {
            ImageSource::File(path) => Self::from_file(path),
            ImageSource::Url(url) => Self::fetch(url),
        }
    }

    fn from_dynamic(img: image::DynamicImage) -> Self {
        let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
            img.thumbnail(MAX_DIMENSION, MAX_DIMENSION)
        } else {
            img
        };
        let rgba = img.into_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            data: rgba.into_raw(),
            width,
            height,
        }
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Photo pixels keyed by photo id.
///
/// The viewer compares [`revision`](Self::revision) against the last value it
/// saw to know when GPU textures need rebuilding.
#[derive(Debug, Default)]
pub struct PhotoTextures {
    images: HashMap<u32, PhotoImage>,
    revision: u64,
}

impl PhotoTextures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, photo_id: u32, image: PhotoImage) {
        self.images.insert(photo_id, image);
        self.revision += 1;
    }

    pub fn get(&self, photo_id: u32) -> Option<&PhotoImage> {
        self.images.get(&photo_id)
    }

    /// Drop the pixels of the given photos. Returns how many were held.
    pub fn release(&mut self, photo_ids: impl IntoIterator<Item = u32>) -> usize {
        let released = photo_ids
            .into_iter()
            .filter(|id| self.images.remove(id).is_some())
            .count();
        if released > 0 {
            self.revision += 1;
        }
        released
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &PhotoImage)> {
        self.images.iter().map(|(id, img)| (*id, img))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// A finished background load.
pub struct LoadedImage {
    pub photo_id: u32,
    pub result: Result<PhotoImage, TextureError>,
}

/// Loads images on worker threads.
pub struct TextureLoader {
    tx: Sender<LoadedImage>,
    rx: Receiver<LoadedImage>,
    pending: usize,
}

impl TextureLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, pending: 0 }
    }

    /// Start loading `source` for `photo_id`.
    pub fn request(&mut self, photo_id: u32, source: ImageSource) {
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("photo-{photo_id}"))
            .spawn(move || {
                let result = PhotoImage::load(&source);
                let _ = tx.send(LoadedImage { photo_id, result });
            });
        match spawned {
            Ok(_) => self.pending += 1,
            Err(e) => tracing::error!("failed to start loader for photo {photo_id}: {e}"),
        }
    }

    /// Next finished load, successful or not, without blocking.
    pub fn poll(&mut self) -> Option<LoadedImage> {
        let loaded = self.rx.try_recv().ok()?;
        self.pending = self.pending.saturating_sub(1);
        Some(loaded)
    }

    /// Loads requested but not yet collected with [`poll`](Self::poll).
    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new()
    }
}
