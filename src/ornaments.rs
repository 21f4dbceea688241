//! Photo ornament registry.
//!
//! The registry owns the authoritative list of photo entries. Each entry is a
//! [`Particle`] tagged [`ParticleKind::Photo`] plus the image it shows.
//! Entries come in two flavours:
//!
//! - **built-in** photos registered when the scene is built;
//! - **uploaded** photos appended at runtime, which can be cleared as a group.
//!
//! Ids are handed out from a counter that only ever grows, so an id is never
//! reused, even after uploads are cleared. The registry does not own the
//! image resources behind [`ImageSource`]; [`PhotoRegistry::clear_uploads`]
//! hands the dropped sources back so the caller can release them.

use glam::Vec3;
use std::fmt;
use std::path::PathBuf;

use crate::layout::Layout;
use crate::particle::{Particle, ParticleKind};
use crate::spawn::SpawnContext;

/// Where a photo's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// Remote image fetched over HTTP(S).
    Url(String),
    /// Local file picked by the user.
    File(PathBuf),
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Url(url) => write!(f, "{url}"),
            ImageSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// How an entry got into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Builtin,
    Uploaded,
}

/// A photo ornament.
#[derive(Debug, Clone)]
pub struct PhotoEntry {
    particle: Particle,
    source: ImageSource,
    origin: Origin,
    slot: u32,
    user_message: Option<String>,
}

impl PhotoEntry {
    /// Id shared with the entry's particle and used for memory requests.
    #[inline]
    pub fn id(&self) -> u32 {
        self.particle.id()
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn particle(&self) -> &Particle {
        &self.particle
    }

    /// Context the user attached before requesting a memory, if any.
    pub fn user_message(&self) -> Option<&str> {
        self.user_message.as_deref()
    }
}

const PHOTO_SCALE: f32 = 0.6;
const PHOTO_FRAME: Vec3 = Vec3::new(1.0, 0.85, 0.45);

/// Authoritative set of photo ornaments.
pub struct PhotoRegistry {
    layout: Box<dyn Layout>,
    seed: u64,
    entries: Vec<PhotoEntry>,
    next_id: u32,
    next_slot: u32,
}

impl PhotoRegistry {
    /// Create an empty registry placing photos with `layout`.
    ///
    /// `first_id` lets the scene keep photo ids clear of structural particle ids.
    pub fn new(layout: impl Layout + 'static, seed: u64, first_id: u32) -> Self {
        Self {
            layout: Box::new(layout),
            seed,
            entries: Vec::new(),
            next_id: first_id,
            next_slot: 0,
        }
    }

    fn push(&mut self, source: ImageSource, origin: Origin) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let slot = self.next_slot;
        self.next_slot += 1;

        let mut ctx = SpawnContext::new(self.seed, slot, 0);
        let placement = self.layout.place(&mut ctx);
        let particle = Particle::new(id, placement.chaos, placement.target)
            .with_rotations(placement.chaos_rot, placement.target_rot)
            .with_scale(PHOTO_SCALE)
            .with_color(PHOTO_FRAME)
            .with_kind(ParticleKind::Photo);

        self.entries.push(PhotoEntry {
            particle,
            source,
            origin,
            slot,
            user_message: None,
        });
        id
    }

    /// Register a built-in photo. Returns its id.
    pub fn register(&mut self, source: ImageSource) -> u32 {
        self.push(source, Origin::Builtin)
    }

    /// Append user uploads. Returns the fresh ids in input order.
    ///
    /// Existing entries keep their ids and positions.
    pub fn add_uploads<I>(&mut self, sources: I) -> Vec<u32>
    where
        I: IntoIterator<Item = ImageSource>,
    {
        let ids: Vec<u32> = sources
            .into_iter()
            .map(|source| self.push(source, Origin::Uploaded))
            .collect();
        if !ids.is_empty() {
            tracing::info!("registered {} uploaded photo(s)", ids.len());
        }
        ids
    }

    /// Drop every uploaded entry, returning the sources they held.
    ///
    /// Each source is returned exactly once; built-in entries are untouched.
    pub fn clear_uploads(&mut self) -> Vec<ImageSource> {
        let (uploaded, kept): (Vec<PhotoEntry>, Vec<PhotoEntry>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.origin == Origin::Uploaded);
        self.entries = kept;
        // Later uploads reuse the freed slots after the surviving entries
        self.next_slot = self.entries.iter().map(|e| e.slot + 1).max().unwrap_or(0);

        let released: Vec<ImageSource> = uploaded.into_iter().map(|e| e.source).collect();
        if !released.is_empty() {
            tracing::info!("cleared {} uploaded photo(s)", released.len());
        }
        released
    }

    pub fn get(&self, id: u32) -> Option<&PhotoEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Record (or clear) the context message for a photo.
    ///
    /// Returns `false` if no entry has that id.
    pub fn set_user_message(&mut self, id: u32, message: Option<String>) -> bool {
        match self.entries.iter_mut().find(|e| e.id() == id) {
            Some(entry) => {
                entry.user_message = message;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhotoEntry> {
        self.entries.iter()
    }

    /// Mutable access to the entries' particles, for the animator.
    pub fn particles_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.entries.iter_mut().map(|e| &mut e.particle)
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.entries.iter().map(|e| &e.particle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of user-added entries currently registered.
    pub fn uploaded_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.origin == Origin::Uploaded)
            .count()
    }
}

impl fmt::Debug for PhotoRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoRegistry")
            .field("entries", &self.entries)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PhotoShell, TreeShape};

    fn registry() -> PhotoRegistry {
        let layout = PhotoShell {
            shape: TreeShape::default(),
            offset: 0.3,
            chaos_radius: 9.0,
        };
        let mut registry = PhotoRegistry::new(layout, 7, 1000);
        for i in 0..3 {
            registry.register(ImageSource::Url(format!("https://example.com/{i}.jpg")));
        }
        registry
    }

    fn upload(name: &str) -> ImageSource {
        ImageSource::File(PathBuf::from(name))
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut registry = registry();
        let ids: Vec<u32> = registry.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![1000, 1001, 1002]);

        let added = registry.add_uploads([upload("a.png"), upload("b.png")]);
        assert_eq!(added, vec![1003, 1004]);

        registry.clear_uploads();
        let again = registry.add_uploads([upload("c.png")]);
        assert_eq!(again, vec![1005]);
    }

    #[test]
    fn test_append_keeps_existing_positions() {
        let mut registry = registry();
        let before: Vec<(u32, Vec3, Vec3)> = registry
            .iter()
            .map(|e| (e.id(), e.particle().chaos_pos(), e.particle().target_pos()))
            .collect();

        registry.add_uploads((0..5).map(|i| upload(&format!("{i}.jpg"))));

        let after: Vec<(u32, Vec3, Vec3)> = registry
            .iter()
            .take(3)
            .map(|e| (e.id(), e.particle().chaos_pos(), e.particle().target_pos()))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_clear_uploads_returns_exactly_uploaded_sources() {
        let mut registry = registry();
        registry.add_uploads([upload("x.png"), upload("y.png"), upload("z.png")]);
        assert_eq!(registry.uploaded_count(), 3);
        assert_eq!(registry.len(), 6);

        let released = registry.clear_uploads();
        assert_eq!(released, vec![upload("x.png"), upload("y.png"), upload("z.png")]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.uploaded_count(), 0);
        assert!(registry.iter().all(|e| e.origin() == Origin::Builtin));

        // Nothing left to release a second time
        assert!(registry.clear_uploads().is_empty());
    }

    #[test]
    fn test_user_message() {
        let mut registry = registry();
        assert!(registry.set_user_message(1001, Some("ski trip".into())));
        assert_eq!(registry.get(1001).and_then(|e| e.user_message()), Some("ski trip"));
        assert!(registry.set_user_message(1001, None));
        assert!(registry.get(1001).and_then(|e| e.user_message()).is_none());
        assert!(!registry.set_user_message(42, None));
    }

    #[test]
    fn test_photo_particles_are_tagged() {
        let registry = registry();
        assert!(registry
            .particles()
            .all(|p| p.kind() == Some(ParticleKind::Photo)));
    }
}
