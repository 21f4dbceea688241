//! Placement strategies for the two endpoints of each particle.
//!
//! A [`Layout`] turns a [`SpawnContext`] into a [`Placement`]: where a
//! particle rests in the formed tree, where it drifts to in chaos, and the
//! rotations it holds at each end. Scenes and the photo registry take any
//! `Layout`, so the arrangement can be swapped without touching the animator.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::spawn::{SpawnContext, GOLDEN_ANGLE};

/// Both endpoints of a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub chaos: Vec3,
    pub target: Vec3,
    pub chaos_rot: Vec3,
    pub target_rot: Vec3,
}

/// Strategy computing the endpoints for one slot.
pub trait Layout: Send + Sync {
    fn place(&self, ctx: &mut SpawnContext) -> Placement;
}

impl<F> Layout for F
where
    F: Fn(&mut SpawnContext) -> Placement + Send + Sync,
{
    fn place(&self, ctx: &mut SpawnContext) -> Placement {
        self(ctx)
    }
}

fn default_height() -> f32 {
    6.0
}

fn default_radius() -> f32 {
    2.4
}

fn default_base_y() -> f32 {
    -3.0
}

/// Dimensions of the formed tree: a cone standing on `base_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeShape {
    #[serde(default = "default_height")]
    pub height: f32,
    /// Radius of the cone at its base.
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_base_y")]
    pub base_y: f32,
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            height: default_height(),
            radius: default_radius(),
            base_y: default_base_y(),
        }
    }
}

impl TreeShape {
    /// Cone radius at a height fraction (0 = base, 1 = tip).
    #[inline]
    pub fn radius_at(&self, height_fraction: f32) -> f32 {
        self.radius * (1.0 - height_fraction.clamp(0.0, 1.0))
    }

    /// Point on a horizontal circle of the cone, scaled by `depth` (1 = surface).
    pub fn point(&self, height_fraction: f32, angle: f32, depth: f32) -> Vec3 {
        let r = self.radius_at(height_fraction) * depth;
        Vec3::new(
            r * angle.cos(),
            self.base_y + height_fraction * self.height,
            r * angle.sin(),
        )
    }
}

/// Structural ornaments filling the cone, scattered in a ball when in chaos.
///
/// Slots climb the tree with batch progress, so this layout expects the
/// whole batch to be placed at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeCone {
    pub shape: TreeShape,
    pub chaos_radius: f32,
}

impl Layout for TreeCone {
    fn place(&self, ctx: &mut SpawnContext) -> Placement {
        // sqrt keeps density even: the wide base needs more slots than the tip
        let h = 1.0 - (1.0 - ctx.progress()).sqrt();
        let h = (h + ctx.random_range(-0.02, 0.02)).clamp(0.0, 0.98);
        let angle = ctx.index as f32 * GOLDEN_ANGLE;
        let depth = ctx.random_range(0.7, 1.0);
        let target = self.shape.point(h, angle, depth);

        Placement {
            chaos: ctx.random_in_sphere(self.chaos_radius),
            target,
            chaos_rot: ctx.random_euler(PI),
            target_rot: Vec3::new(0.0, -angle, 0.0),
        }
    }
}

/// Photo ornaments hung just outside the cone surface, facing outward.
///
/// Placement depends only on the slot index, never on the batch size, so
/// appending photos leaves existing ones where they are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoShell {
    pub shape: TreeShape,
    /// Distance outside the cone surface.
    pub offset: f32,
    pub chaos_radius: f32,
}

impl PhotoShell {
    /// Height fraction for a slot, from a golden-ratio sequence kept off the
    /// very bottom and the tip.
    fn height_fraction(index: u32) -> f32 {
        let golden = 0.618_034_f32;
        let t = (0.5 + index as f32 * golden).fract();
        0.08 + t * 0.72
    }
}

impl Layout for PhotoShell {
    fn place(&self, ctx: &mut SpawnContext) -> Placement {
        let h = Self::height_fraction(ctx.index);
        let angle = ctx.index as f32 * GOLDEN_ANGLE;
        let r = self.shape.radius_at(h) + self.offset;
        let target = Vec3::new(
            r * angle.cos(),
            self.shape.base_y + h * self.shape.height,
            r * angle.sin(),
        );
        // Quads face +Z; turn each one to face away from the trunk
        let facing = target.x.atan2(target.z);

        let distance = self.chaos_radius * ctx.random_range(0.6, 1.0);
        let chaos = ctx.random_on_sphere(distance);

        Placement {
            chaos,
            target,
            chaos_rot: ctx.random_euler(0.6) + Vec3::new(0.0, facing, 0.0),
            target_rot: Vec3::new(0.0, facing, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_cone_stays_inside_cone() {
        let layout = TreeCone {
            shape: TreeShape::default(),
            chaos_radius: 8.0,
        };
        let count = 400;
        for i in 0..count {
            let mut ctx = SpawnContext::new(11, i, count);
            let p = layout.place(&mut ctx);
            let shape = layout.shape;
            let h = (p.target.y - shape.base_y) / shape.height;
            assert!((-1e-4..=1.0).contains(&h));
            let horizontal = Vec3::new(p.target.x, 0.0, p.target.z).length();
            assert!(horizontal <= shape.radius_at(h) + 0.2);
            assert!(p.chaos.length() <= 8.0 + 1e-3);
        }
    }

    #[test]
    fn test_photo_shell_ignores_batch_size() {
        let layout = PhotoShell {
            shape: TreeShape::default(),
            offset: 0.3,
            chaos_radius: 9.0,
        };
        let a = layout.place(&mut SpawnContext::new(5, 3, 4));
        let b = layout.place(&mut SpawnContext::new(5, 3, 40));
        assert_eq!(a, b);
    }

    #[test]
    fn test_photo_shell_outside_surface() {
        let shape = TreeShape::default();
        let layout = PhotoShell {
            shape,
            offset: 0.3,
            chaos_radius: 9.0,
        };
        for i in 0..32 {
            let p = layout.place(&mut SpawnContext::new(1, i, 0));
            let h = (p.target.y - shape.base_y) / shape.height;
            let horizontal = Vec3::new(p.target.x, 0.0, p.target.z).length();
            assert!((horizontal - (shape.radius_at(h) + 0.3)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_closure_layout() {
        let fixed = |_: &mut SpawnContext| Placement {
            chaos: Vec3::X,
            target: Vec3::Y,
            chaos_rot: Vec3::ZERO,
            target_rot: Vec3::ZERO,
        };
        let p = fixed.place(&mut SpawnContext::new(0, 0, 1));
        assert_eq!(p.target, Vec3::Y);
    }
}
