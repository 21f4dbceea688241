//! Chaos ↔ formed morph animation.
//!
//! The [`MorphAnimator`] runs once per rendered frame. It reads the
//! [`TreeState`] once, then eases every particle toward the matching
//! endpoint. Changing the state between frames simply redirects the motion
//! from wherever each particle currently is; there is no transition queue
//! and nothing to lock out.
//!
//! ```
//! use wishtree::morph::{MorphAnimator, MorphConfig, TreeState};
//! use wishtree::particle::Particle;
//! use wishtree::Vec3;
//!
//! let animator = MorphAnimator::new(MorphConfig::default());
//! let mut particles = vec![Particle::new(0, Vec3::splat(3.0), Vec3::ZERO)];
//!
//! for _ in 0..600 {
//!     animator.animate(particles.iter_mut(), TreeState::Chaos, 1.0 / 60.0);
//! }
//! assert!(animator.is_settled(particles.iter(), TreeState::Chaos, 1e-3));
//! ```

use serde::{Deserialize, Serialize};

use crate::particle::{Particle, StepRates};

/// Which arrangement the particle field is heading toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TreeState {
    /// Scattered, pre-assembly positions.
    Chaos,
    /// Assembled tree.
    #[default]
    Formed,
}

impl TreeState {
    #[inline]
    pub fn is_formed(self) -> bool {
        matches!(self, TreeState::Formed)
    }
}

fn default_position_rate() -> f32 {
    2.5
}

fn default_rotation_rate() -> f32 {
    2.0
}

fn default_spin_rate() -> f32 {
    0.4
}

/// Tunable rates for the morph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MorphConfig {
    /// Exponential convergence rate for positions, per second.
    #[serde(default = "default_position_rate")]
    pub position_rate: f32,
    /// Exponential convergence rate for rotations, per second.
    #[serde(default = "default_rotation_rate")]
    pub rotation_rate: f32,
    /// Idle spin about Y in radians per second, applied in both states.
    #[serde(default = "default_spin_rate")]
    pub spin_rate: f32,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            position_rate: default_position_rate(),
            rotation_rate: default_rotation_rate(),
            spin_rate: default_spin_rate(),
        }
    }
}

/// Per-frame particle updater.
#[derive(Debug, Clone, Default)]
pub struct MorphAnimator {
    config: MorphConfig,
}

impl MorphAnimator {
    pub fn new(config: MorphConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MorphConfig {
        &self.config
    }

    fn rates(&self) -> StepRates {
        StepRates {
            position: self.config.position_rate,
            rotation: self.config.rotation_rate,
            spin: self.config.spin_rate,
        }
    }

    /// Advance a single particle.
    #[inline]
    pub fn step(&self, particle: &mut Particle, state: TreeState, dt: f32) {
        particle.step(state.is_formed(), self.rates(), dt);
    }

    /// Advance every particle by `dt` seconds toward `state`.
    ///
    /// `state` is captured once for the whole pass so all particles see the
    /// same value. `dt <= 0` is a no-op.
    pub fn animate<'a, I>(&self, particles: I, state: TreeState, dt: f32)
    where
        I: IntoIterator<Item = &'a mut Particle>,
    {
        if !(dt > 0.0) {
            return;
        }
        let formed = state.is_formed();
        let rates = self.rates();
        for particle in particles {
            particle.step(formed, rates, dt);
        }
    }

    /// Whether every particle is within `epsilon` of its active endpoint.
    pub fn is_settled<'a, I>(&self, particles: I, state: TreeState, epsilon: f32) -> bool
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        let formed = state.is_formed();
        particles
            .into_iter()
            .all(|p| p.current_pos().distance(p.endpoint(formed)) <= epsilon)
    }

    /// How far the field has assembled, from 0.0 (all at chaos) to 1.0 (all
    /// at target).
    ///
    /// Each particle contributes the fraction of the chaos→target distance it
    /// has covered. Particles whose endpoints coincide count as formed.
    pub fn formed_fraction<'a, I>(&self, particles: I) -> f32
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        let mut total = 0.0;
        let mut count = 0usize;
        for p in particles {
            let span = p.chaos_pos().distance(p.target_pos());
            let progress = if span <= f32::EPSILON {
                1.0
            } else {
                (1.0 - p.current_pos().distance(p.target_pos()) / span).clamp(0.0, 1.0)
            };
            total += progress;
            count += 1;
        }
        if count == 0 {
            1.0
        } else {
            total / count as f32
        }
    }
}
