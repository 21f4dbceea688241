//! The particle field: structural ornaments plus photo ornaments.
//!
//! Structural particles (boxes, balls, lights) live in a flat arena built
//! once from the config. Photos live in the [`PhotoRegistry`] because they
//! come and go at runtime. Both are advanced by the same [`MorphAnimator`]
//! with the same tree state each frame.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::WishtreeConfig;
use crate::layout::{Layout, PhotoShell, TreeCone};
use crate::morph::{MorphAnimator, TreeState};
use crate::ornaments::{ImageSource, PhotoRegistry};
use crate::particle::{Particle, ParticleInstance, ParticleKind};
use crate::spawn::SpawnContext;

/// Id of the first structural particle. Photo ids count up from 1 and never
/// reach this range.
pub const STRUCTURAL_ID_BASE: u32 = 1 << 24;

/// Id given to the first registered photo.
pub const FIRST_PHOTO_ID: u32 = 1;

const GIFT_COLORS: [Vec3; 4] = [
    Vec3::new(0.80, 0.08, 0.12),
    Vec3::new(0.95, 0.75, 0.25),
    Vec3::new(0.05, 0.45, 0.25),
    Vec3::new(0.92, 0.92, 0.95),
];

const BAUBLE_COLORS: [Vec3; 5] = [
    Vec3::new(0.02, 0.32, 0.16),
    Vec3::new(0.04, 0.42, 0.22),
    Vec3::new(0.01, 0.25, 0.12),
    Vec3::new(0.85, 0.10, 0.15),
    Vec3::new(1.00, 0.80, 0.30),
];

const LIGHT_COLORS: [Vec3; 3] = [
    Vec3::new(1.00, 0.90, 0.60),
    Vec3::new(1.00, 0.75, 0.35),
    Vec3::new(1.00, 0.97, 0.88),
];

fn scale_for(kind: ParticleKind) -> f32 {
    match kind {
        ParticleKind::Box => 1.5,
        ParticleKind::Ball => 1.0,
        ParticleKind::Light => 0.45,
        ParticleKind::Photo => 1.0,
    }
}

fn palette_for(kind: ParticleKind) -> &'static [Vec3] {
    match kind {
        ParticleKind::Box => &GIFT_COLORS,
        ParticleKind::Ball => &BAUBLE_COLORS,
        ParticleKind::Light | ParticleKind::Photo => &LIGHT_COLORS,
    }
}

/// Kinds for every structural slot, shuffled so each kind spreads over the
/// whole height of the tree.
fn kind_sequence(config: &WishtreeConfig) -> Vec<ParticleKind> {
    let scene = &config.scene;
    let mut kinds = Vec::with_capacity(scene.structural_count() as usize);
    kinds.extend(std::iter::repeat(ParticleKind::Box).take(scene.box_count as usize));
    kinds.extend(std::iter::repeat(ParticleKind::Ball).take(scene.ball_count as usize));
    kinds.extend(std::iter::repeat(ParticleKind::Light).take(scene.light_count as usize));
    kinds.shuffle(&mut SmallRng::seed_from_u64(scene.seed));
    kinds
}

/// Everything that is drawn and animated.
#[derive(Debug)]
pub struct Scene {
    particles: Vec<Particle>,
    photos: PhotoRegistry,
    animator: MorphAnimator,
}

impl Scene {
    /// Build the structural field and register the built-in photos.
    pub fn new(config: &WishtreeConfig) -> Self {
        let scene = &config.scene;
        let cone = TreeCone {
            shape: scene.tree,
            chaos_radius: scene.chaos_radius,
        };

        let kinds = kind_sequence(config);
        let count = kinds.len() as u32;
        let particles: Vec<Particle> = kinds
            .into_iter()
            .enumerate()
            .map(|(i, kind)| {
                let mut ctx = SpawnContext::new(scene.seed, i as u32, count);
                let placement = cone.place(&mut ctx);
                let color = ctx.pick_color(palette_for(kind));
                Particle::new(STRUCTURAL_ID_BASE + i as u32, placement.chaos, placement.target)
                    .with_rotations(placement.chaos_rot, placement.target_rot)
                    .with_scale(scene.particle_size * scale_for(kind))
                    .with_color(color)
                    .with_kind(kind)
            })
            .collect();

        let shell = PhotoShell {
            shape: scene.tree,
            offset: scene.photo_offset,
            chaos_radius: scene.chaos_radius,
        };
        let mut photos = PhotoRegistry::new(shell, scene.seed.rotate_left(17), FIRST_PHOTO_ID);
        for url in &config.photos.builtin {
            photos.register(ImageSource::Url(url.clone()));
        }

        tracing::info!(
            "scene built: {} structural particles, {} photos",
            particles.len(),
            photos.len()
        );

        Self {
            particles,
            photos,
            animator: MorphAnimator::new(config.morph),
        }
    }

    /// Advance every particle, structural and photo, toward `state`.
    pub fn update(&mut self, state: TreeState, dt: f32) {
        self.animator.animate(self.particles.iter_mut(), state, dt);
        self.animator.animate(self.photos.particles_mut(), state, dt);
    }

    /// Whether the whole field has come to rest for `state`.
    pub fn is_settled(&self, state: TreeState, epsilon: f32) -> bool {
        self.animator.is_settled(&self.particles, state, epsilon)
            && self.animator.is_settled(self.photos.particles(), state, epsilon)
    }

    /// Assembly progress of the whole field, 0.0 to 1.0.
    pub fn formed_fraction(&self) -> f32 {
        self.animator
            .formed_fraction(self.particles.iter().chain(self.photos.particles()))
    }

    /// Replace `out` with the GPU records of the structural particles.
    pub fn write_structural_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.extend(self.particles.iter().map(Particle::to_instance));
    }

    /// Replace `out` with the GPU records of the photos, in registry order.
    pub fn write_photo_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.extend(self.photos.particles().map(Particle::to_instance));
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn photos(&self) -> &PhotoRegistry {
        &self.photos
    }

    pub fn photos_mut(&mut self) -> &mut PhotoRegistry {
        &mut self.photos
    }

    pub fn animator(&self) -> &MorphAnimator {
        &self.animator
    }
}
