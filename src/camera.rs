//! Orbit camera around the tree.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// A world-space ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Orbit camera looking at the tree.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.15,
            distance: 14.0,
            target: Vec3::ZERO,
            fov_y: 45f32.to_radians(),
            aspect: 16.0 / 9.0,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(1e-3), 0.1, 200.0)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Orbit by a pointer drag, in radians.
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-1.2, 1.2);
    }

    /// Zoom by a scroll amount; positive moves closer.
    pub fn zoom(&mut self, amount: f32) {
        self.distance = (self.distance * (1.0 - amount * 0.1)).clamp(4.0, 60.0);
    }

    /// Ray through a point in normalized device coordinates (-1..1, y up).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_proj().inverse();
        let near = inverse * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far = inverse * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        Ray {
            origin: near,
            direction: (far - near).normalize_or_zero(),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = Camera::new();
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        let to_target = (camera.target - camera.position()).normalize();
        assert!(ray.direction.dot(to_target) > 0.9999);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::new();
        camera.orbit(0.0, 10.0);
        assert_eq!(camera.pitch, 1.2);
        camera.zoom(100.0);
        assert_eq!(camera.distance, 4.0);
    }
}
