// Math utilities for 3D engine

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

/// Position, per-axis rotation in degrees, and scale of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation about x, y and z, in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    /// Create a new transform
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Create an identity transform
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        )
    }

    /// Generate the model matrix (scale, then rotate, then translate).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rotates `v` counterclockwise by `degrees`.
pub fn rotate_vec2(v: Vec2, degrees: f32) -> Vec2 {
    let (s, c) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::identity().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn matrix_scales_before_translating() {
        let t = Transform::new(Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO, Vec3::splat(25.0));
        let p = t.matrix().transform_point3(Vec3::new(0.5, 0.5, 0.5));
        assert_abs_diff_eq!(p.x, 12.5, epsilon = 1e-4);
        assert_abs_diff_eq!(p.z, 62.5, epsilon = 1e-4);
    }

    #[test]
    fn rotation_is_in_degrees() {
        let t = Transform::new(Vec3::ZERO, Vec3::new(0.0, 90.0, 0.0), Vec3::ONE);
        let p = t.matrix().transform_point3(Vec3::X);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn rotate_vec2_quarter_turn() {
        let v = rotate_vec2(Vec2::Y, 90.0);
        assert_abs_diff_eq!(v.x, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(v.y, 0.0, epsilon = 1e-5);
    }
}
