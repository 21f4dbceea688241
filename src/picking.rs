//! CPU picking of photo ornaments.
//!
//! Photos are few (tens, not thousands), so a linear ray/sphere test over
//! their current positions is enough. Each photo is treated as a sphere of
//! radius `scale * PICK_RADIUS_FACTOR` around its animated position, which
//! makes photos clickable mid-morph as well as at rest.

use glam::Vec3;

use crate::camera::Ray;
use crate::ornaments::PhotoRegistry;

/// Pick sphere radius relative to a photo's scale.
pub const PICK_RADIUS_FACTOR: f32 = 0.75;

/// Distance along `ray` to a sphere, or `None` if it misses.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t = if -b - sq >= 0.0 { -b - sq } else { -b + sq };
    (t >= 0.0).then_some(t)
}

/// Id of the nearest photo hit by `ray`.
pub fn pick_photo(registry: &PhotoRegistry, ray: &Ray) -> Option<u32> {
    registry
        .particles()
        .filter_map(|p| {
            ray_sphere(ray, p.current_pos(), p.scale() * PICK_RADIUS_FACTOR).map(|t| (t, p.id()))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}
