//! Dual-position particle model.
//!
//! Every visual element of the tree (boxes, balls, lights and photo
//! ornaments) is a [`Particle`] carrying two fixed endpoints, a scattered
//! *chaos* position and a *target* position inside the formed tree, plus the
//! one mutable position that is eased between them each frame.
//!
//! Particles are plain `Copy` structs so a scene can keep them in a flat
//! arena and update them in place without allocating per frame.
//!
//! # Example
//!
//! ```
//! use wishtree::particle::{interpolate, Particle, ParticleKind};
//! use wishtree::Vec3;
//!
//! let p = Particle::new(0, Vec3::new(4.0, 0.0, 0.0), Vec3::ZERO)
//!     .with_kind(ParticleKind::Ball);
//! assert_eq!(p.current_pos(), Vec3::ZERO);
//!
//! // Half a second at rate 1.0 covers half the remaining distance.
//! let next = interpolate(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 1.0, 0.5);
//! assert!((next.x - 2.0).abs() < 1e-6);
//! ```

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Quat, Vec3, Vec4};
use std::f32::consts::TAU;

/// What a particle looks like once rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Gift box ornament.
    Box,
    /// Glass bauble.
    Ball,
    /// Small emissive light.
    Light,
    /// Photo ornament (see [`crate::ornaments`]).
    Photo,
}

impl ParticleKind {
    /// Numeric tag written into GPU instance data.
    pub fn as_u32(self) -> u32 {
        match self {
            ParticleKind::Box => 0,
            ParticleKind::Ball => 1,
            ParticleKind::Light => 2,
            ParticleKind::Photo => 3,
        }
    }
}

/// A single element of the particle field.
///
/// `chaos_pos`/`target_pos` (and their rotation counterparts) are fixed at
/// construction. Only `current_pos`, `rotation` and `spin` change, and only
/// through [`Particle::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    id: u32,
    chaos_pos: Vec3,
    target_pos: Vec3,
    current_pos: Vec3,
    chaos_rot: Vec3,
    target_rot: Vec3,
    rotation: Vec3,
    spin: f32,
    scale: f32,
    color: Option<Vec3>,
    kind: Option<ParticleKind>,
}

impl Particle {
    /// Create a particle resting at its target position.
    ///
    /// The tree starts out formed, so a fresh particle sits at `target_pos`.
    pub fn new(id: u32, chaos_pos: Vec3, target_pos: Vec3) -> Self {
        Self {
            id,
            chaos_pos,
            target_pos,
            current_pos: target_pos,
            chaos_rot: Vec3::ZERO,
            target_rot: Vec3::ZERO,
            rotation: Vec3::ZERO,
            spin: 0.0,
            scale: 1.0,
            color: None,
            kind: None,
        }
    }

    /// Set the Euler rotations (radians, XYZ) used at each endpoint.
    ///
    /// The current rotation is reset to the formed endpoint.
    pub fn with_rotations(mut self, chaos_rot: Vec3, target_rot: Vec3) -> Self {
        self.chaos_rot = chaos_rot;
        self.target_rot = target_rot;
        self.rotation = target_rot;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_kind(mut self, kind: ParticleKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Place the particle at its chaos endpoint instead of the target.
    pub fn scattered(mut self) -> Self {
        self.current_pos = self.chaos_pos;
        self.rotation = self.chaos_rot;
        self
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn chaos_pos(&self) -> Vec3 {
        self.chaos_pos
    }

    #[inline]
    pub fn target_pos(&self) -> Vec3 {
        self.target_pos
    }

    #[inline]
    pub fn current_pos(&self) -> Vec3 {
        self.current_pos
    }

    /// State-driven rotation, without idle spin.
    #[inline]
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Accumulated idle spin about the Y axis, wrapped to `[0, TAU)`.
    #[inline]
    pub fn spin(&self) -> f32 {
        self.spin
    }

    /// Rotation to render: the interpolated rotation plus the idle spin.
    pub fn orientation(&self) -> Vec3 {
        self.rotation + Vec3::new(0.0, self.spin, 0.0)
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn color(&self) -> Option<Vec3> {
        self.color
    }

    #[inline]
    pub fn kind(&self) -> Option<ParticleKind> {
        self.kind
    }

    /// Endpoint position for the given state.
    pub fn endpoint(&self, formed: bool) -> Vec3 {
        if formed {
            self.target_pos
        } else {
            self.chaos_pos
        }
    }

    /// Endpoint rotation for the given state.
    pub fn endpoint_rotation(&self, formed: bool) -> Vec3 {
        if formed {
            self.target_rot
        } else {
            self.chaos_rot
        }
    }

    /// Advance this particle by `dt` seconds toward the chosen endpoint.
    ///
    /// A non-positive or non-finite `dt` leaves the particle untouched.
    pub fn step(&mut self, formed: bool, rates: StepRates, dt: f32) {
        if !(dt > 0.0) || !dt.is_finite() {
            return;
        }
        self.current_pos = interpolate(self.current_pos, self.endpoint(formed), rates.position, dt);
        self.rotation = interpolate(self.rotation, self.endpoint_rotation(formed), rates.rotation, dt);
        self.spin = (self.spin + rates.spin * dt).rem_euclid(TAU);
    }

    /// GPU instance record for this particle.
    pub fn to_instance(&self) -> ParticleInstance {
        let color = self.color.unwrap_or(Vec3::ONE);
        let orientation = self.orientation();
        ParticleInstance {
            position: self.current_pos.to_array(),
            scale: self.scale,
            rotation: Quat::from_euler(EulerRot::XYZ, orientation.x, orientation.y, orientation.z)
                .to_array(),
            color: Vec4::new(color.x, color.y, color.z, 1.0).to_array(),
            kind: self.kind.map(ParticleKind::as_u32).unwrap_or(0),
            _pad: [0; 3],
        }
    }
}

/// Rates handed to [`Particle::step`] by the animator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRates {
    /// Position convergence rate (1/s).
    pub position: f32,
    /// Rotation convergence rate (1/s).
    pub rotation: f32,
    /// Idle spin (rad/s), applied regardless of state.
    pub spin: f32,
}

/// Exponential-decay step from `current` toward `target`.
///
/// `next = current + (target - current) * min(1, rate * dt)`. The blend
/// factor never exceeds one, so the result can not overshoot `target`, and
/// the remaining distance shrinks geometrically. Applied per component, the
/// same function serves positions and Euler angles.
///
/// Returns `current` unchanged when `dt <= 0`.
#[inline]
pub fn interpolate(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    if !(dt > 0.0) {
        return current;
    }
    let t = (rate * dt).clamp(0.0, 1.0);
    current + (target - current) * t
}

/// Per-instance data uploaded to the GPU.
///
/// Layout matches the `Instance` struct in the viewer's WGSL shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub scale: f32,
    /// Orientation quaternion (x, y, z, w).
    pub rotation: [f32; 4],
    pub color: [f32; 4],
    pub kind: u32,
    pub _pad: [u32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES: StepRates = StepRates {
        position: 2.0,
        rotation: 2.0,
        spin: 0.0,
    };

    #[test]
    fn test_interpolate_never_overshoots() {
        let target = Vec3::new(1.0, -2.0, 3.0);
        // rate * dt well above one clamps to a snap, not a bounce
        let next = interpolate(Vec3::ZERO, target, 50.0, 1.0);
        assert_eq!(next, target);
    }

    #[test]
    fn test_interpolate_zero_and_negative_dt() {
        let current = Vec3::new(0.5, 0.5, 0.5);
        assert_eq!(interpolate(current, Vec3::ZERO, 3.0, 0.0), current);
        assert_eq!(interpolate(current, Vec3::ZERO, 3.0, -0.1), current);
        assert_eq!(interpolate(current, Vec3::ZERO, 3.0, f32::NAN), current);
    }

    #[test]
    fn test_new_particle_rests_at_target() {
        let p = Particle::new(7, Vec3::splat(5.0), Vec3::Y);
        assert_eq!(p.current_pos(), Vec3::Y);
        assert_eq!(p.id(), 7);
        assert!(p.kind().is_none());

        let scattered = p.scattered();
        assert_eq!(scattered.current_pos(), Vec3::splat(5.0));
    }

    #[test]
    fn test_step_keeps_endpoints_fixed() {
        let mut p = Particle::new(1, Vec3::X * 3.0, Vec3::ZERO)
            .with_rotations(Vec3::new(1.0, 0.5, 0.0), Vec3::ZERO);
        for _ in 0..10 {
            p.step(false, RATES, 0.016);
        }
        assert_eq!(p.chaos_pos(), Vec3::X * 3.0);
        assert_eq!(p.target_pos(), Vec3::ZERO);
        assert!(p.current_pos().x > 0.0 && p.current_pos().x < 3.0);
        assert!(p.rotation().x > 0.0 && p.rotation().x < 1.0);
    }

    #[test]
    fn test_spin_is_additive_and_wraps() {
        let rates = StepRates {
            spin: 1.0,
            ..RATES
        };
        let mut p = Particle::new(0, Vec3::ZERO, Vec3::ZERO);
        for _ in 0..100 {
            p.step(true, rates, 0.1);
        }
        // 10 rad of drift wraps below TAU
        assert!((p.spin() - (10.0 - TAU)).abs() < 1e-3);
        // State-driven rotation is unaffected by spin
        assert_eq!(p.rotation(), Vec3::ZERO);
        assert!((p.orientation().y - p.spin()).abs() < 1e-6);
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 64);

        let p = Particle::new(2, Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0))
            .with_scale(0.25)
            .with_color(Vec3::new(1.0, 0.0, 0.0))
            .with_kind(ParticleKind::Light);
        let inst = p.to_instance();
        assert_eq!(inst.position, [1.0, 2.0, 3.0]);
        assert_eq!(inst.scale, 0.25);
        assert_eq!(inst.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(inst.kind, 2);
        // Identity rotation
        assert!((inst.rotation[3] - 1.0).abs() < 1e-6);
    }
}
