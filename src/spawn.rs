//! Spawn context for particle placement.
//!
//! Layouts receive a [`SpawnContext`] for each slot they place. The RNG is
//! seeded from the scene seed and the slot index only, so a slot lands in
//! the same place no matter how many other slots exist or in what order they
//! were spawned.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Golden angle in radians, used for even spiral distributions.
pub const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Per-slot placement context with deterministic randomness.
pub struct SpawnContext {
    /// Index of the slot being placed.
    pub index: u32,
    /// Number of slots in this batch, when known up front.
    ///
    /// Layouts that must stay stable under appends should ignore it.
    pub count: u32,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context for slot `index` of `count`.
    pub fn new(seed: u64, index: u32, count: u32) -> Self {
        // SplitMix-style mix so neighbouring indices get unrelated streams
        let mut z = seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;

        Self {
            index,
            count,
            rng: SmallRng::seed_from_u64(z),
        }
    }

    /// Normalized progress through the batch (0.0 to 1.0).
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.count <= 1 {
            0.0
        } else {
            self.index as f32 / (self.count - 1) as f32
        }
    }

    // ========== Random primitives ==========

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    // ========== Position helpers ==========

    /// Random point on a sphere of the given radius, centered at origin.
    pub fn random_on_sphere(&mut self, radius: f32) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let cos_phi: f32 = self.rng.gen_range(-1.0..1.0);
        let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();

        Vec3::new(
            radius * sin_phi * theta.cos(),
            radius * cos_phi,
            radius * sin_phi * theta.sin(),
        )
    }

    /// Random point inside a sphere, uniform throughout the volume.
    pub fn random_in_sphere(&mut self, radius: f32) -> Vec3 {
        // Cube root for uniform volume distribution
        let r = radius * self.rng.gen::<f32>().cbrt();
        self.random_on_sphere(1.0) * r
    }

    /// Random Euler triple with each angle in `[-max_angle, max_angle)`.
    pub fn random_euler(&mut self, max_angle: f32) -> Vec3 {
        Vec3::new(
            self.random_range(-max_angle, max_angle),
            self.random_range(-max_angle, max_angle),
            self.random_range(-max_angle, max_angle),
        )
    }

    // ========== Color helpers ==========

    /// Pick one color from a palette.
    pub fn pick_color(&mut self, palette: &[Vec3]) -> Vec3 {
        if palette.is_empty() {
            return Vec3::ONE;
        }
        palette[self.rng.gen_range(0..palette.len())]
    }

}
