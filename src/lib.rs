//! # wishtree - Interactive Holiday Wishing Tree
//!
//! A particle Christmas tree that scatters into a cloud when you let go and
//! reassembles while you hold the pointer down. Photo ornaments hang on the
//! tree; clicking one opens a card where a generative text service writes a
//! short holiday memory for it.
//!
//! ## Quick Start
//!
//! ```ignore
//! use wishtree::prelude::*;
//!
//! let config = WishtreeConfig::load("wishtree.json")?;
//! let mut session = Session::with_gemini(&config)?;
//!
//! session.click_photo(3);
//! session.set_message("This was taken during our ski trip last year");
//! session.request_memory();
//!
//! loop {
//!     session.frame(1.0 / 60.0);
//!     if let Some(text) = session.selection().memory() {
//!         println!("{text}");
//!         break;
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Dual positions
//!
//! Every [`Particle`] carries two fixed endpoints, a scattered *chaos*
//! position and a *target* position on the tree, plus the current position
//! that moves between them. The [`MorphAnimator`] eases every particle toward
//! the endpoint selected by the [`TreeState`], once per frame.
//!
//! ### Two state machines
//!
//! The [`InteractionController`] keeps the tree axis (`Chaos` / `Formed`) and
//! the selection axis (no photo / one photo) apart. Selecting a photo never
//! scatters or forms the tree.
//!
//! ### Superseded responses
//!
//! Memory requests run on worker threads. Each carries a [`RequestToken`];
//! a response whose token no longer matches the selection is dropped.
//!
//! ## Features
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `viewer` | The windowed app: wgpu renderer, winit window, egui overlay, native file dialog |

pub mod camera;
pub mod config;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod memory;
pub mod morph;
pub mod ornaments;
pub mod particle;
pub mod picking;
pub mod scene;
pub mod selection;
pub mod session;
pub mod spawn;
pub mod textures;
pub mod time;

#[cfg(feature = "viewer")]
pub mod viewer;

pub use bytemuck;
pub use camera::{Camera, Ray};
pub use config::{PhotosConfig, SceneConfig, WishtreeConfig};
pub use error::{ConfigError, MemoryError, TextureError};
pub use glam::{Vec2, Vec3, Vec4};
pub use interaction::{InteractionController, PointerTarget, Resolution};
pub use layout::{Layout, PhotoShell, Placement, TreeCone, TreeShape};
pub use memory::{GeminiService, MemoryClient, MemoryConfig, MemoryRequest, MemoryResponse, MemoryService};
pub use morph::{MorphAnimator, MorphConfig, TreeState};
pub use ornaments::{ImageSource, Origin, PhotoEntry, PhotoRegistry};
pub use particle::{interpolate, Particle, ParticleInstance, ParticleKind};
pub use scene::Scene;
pub use selection::{MemoryStatus, RequestToken, SelectedPhoto, Selection};
pub use session::{Session, UploadReport};
pub use spawn::SpawnContext;
pub use textures::{PhotoImage, PhotoTextures};
pub use time::FrameClock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use wishtree::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::WishtreeConfig;
    pub use crate::interaction::PointerTarget;
    pub use crate::memory::{MemoryService, DEFAULT_FALLBACK};
    pub use crate::morph::{MorphAnimator, MorphConfig, TreeState};
    pub use crate::ornaments::ImageSource;
    pub use crate::particle::{Particle, ParticleKind};
    pub use crate::selection::{MemoryStatus, Selection};
    pub use crate::session::Session;
    pub use crate::time::FrameClock;
    pub use crate::{Vec2, Vec3, Vec4};
}
