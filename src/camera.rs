// Camera for Kiwi3D

use glam::{Mat4, Vec2, Vec3};

use crate::error::{Result, ViewerError};
use crate::math::rotate_vec2;

/// Pitch is kept within this many degrees of the horizon so the view never flips.
pub const PITCH_LIMIT: f32 = 89.0;

/// First-person camera. Left-handed: yaw 0 looks down +Z with +X to the right.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Pitch, yaw and roll in degrees. Roll is carried but not applied.
    pub facing_angle: Vec3,
    /// World units per second.
    pub movement_speed: f32,
    pub sprint_factor: f32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

/// Camera start poses: position and (pitch, yaw) in degrees.
const PRESETS: [(Vec3, Vec2); 3] = [
    (Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.0, 0.0)),
    (Vec3::new(0.0, 60.0, -40.0), Vec2::new(-30.0, 0.0)),
    (Vec3::new(-120.0, 10.0, 50.0), Vec2::new(0.0, -90.0)),
];

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            facing_angle: Vec3::ZERO,
            movement_speed: 40.0,
            sprint_factor: 3.0,
            fov_y: 70.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn pitch(&self) -> f32 {
        self.facing_angle.x
    }

    pub fn yaw(&self) -> f32 {
        self.facing_angle.y
    }

    /// Moves the camera to one of the start poses.
    pub fn set_preset(&mut self, preset: usize) -> Result<()> {
        let (position, angles) = *PRESETS
            .get(preset)
            .ok_or(ViewerError::UnknownPreset(preset))?;

        self.position = position;
        self.facing_angle = Vec3::new(angles.x, angles.y, 0.0);
        Ok(())
    }

    /// Adds to the facing angles. Pitch is clamped to +-[`PITCH_LIMIT`], yaw wraps.
    pub fn rotate(&mut self, d_pitch: f32, d_yaw: f32, d_roll: f32) {
        self.facing_angle.x = (self.facing_angle.x + d_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.facing_angle.y = (self.facing_angle.y + d_yaw).rem_euclid(360.0);
        self.facing_angle.z = (self.facing_angle.z + d_roll).rem_euclid(360.0);
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        let (sp, cp) = self.pitch().to_radians().sin_cos();
        let (sy, cy) = self.yaw().to_radians().sin_cos();
        Vec3::new(-sy * cp, sp, cy * cp)
    }

    /// Moves along the ground plane. `local.x` strafes right, `local.y` moves forward;
    /// the vector is turned by the current yaw before landing on world x/z.
    pub fn move_planar(&mut self, local: Vec2) {
        let world = rotate_vec2(local, self.yaw());
        self.position.x += world.x;
        self.position.z += world.y;
    }

    /// Axis-aligned vertical move, independent of facing.
    pub fn move_vertical(&mut self, dy: f32) {
        self.position.y += dy;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.position, self.position + self.forward(), Vec3::Y)
    }

    /// Perspective projection mapping depth onto [0, 1].
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_lh(self.fov_y.to_radians(), aspect.max(1e-6), self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
