// Sky pass

use crate::camera::Camera;

use super::buffer::FrameBuffers;
use super::color;

pub const ZENITH_COLOR: u32 = 0xFF4A_7FB5;
pub const HORIZON_COLOR: u32 = 0xFFB8_D4EE;
pub const GROUND_COLOR: u32 = 0xFF3B_3F44;

/// Elevation in degrees of the view ray through the center of row `y`.
fn row_elevation(camera: &Camera, y: u32, height: u32) -> f32 {
    let ndc_y = 1.0 - 2.0 * (y as f32 + 0.5) / height as f32;
    let half_fov = (camera.fov_y * 0.5).to_radians();
    (ndc_y * half_fov.tan()).atan().to_degrees() + camera.pitch()
}

/// Writes every pixel: a zenith-to-horizon gradient above the horizon, ground below.
pub(super) fn draw_sky(buffers: &mut FrameBuffers, camera: &Camera) {
    let height = buffers.height();
    for y in 0..height {
        let elevation = row_elevation(camera, y, height);
        let row_color = if elevation < 0.0 {
            GROUND_COLOR
        } else {
            color::lerp(HORIZON_COLOR, ZENITH_COLOR, elevation / 90.0)
        };
        buffers.fill_row(y, row_color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_pixel() {
        let mut buffers = FrameBuffers::new(16, 9).unwrap();
        buffers.fill_color(0x0000_0000);
        draw_sky(&mut buffers, &Camera::new());
        assert!(buffers.color().iter().all(|c| *c >> 24 == 0xFF));
    }

    #[test]
    fn horizon_follows_pitch() {
        let mut buffers = FrameBuffers::new(4, 100).unwrap();
        let mut camera = Camera::new();

        draw_sky(&mut buffers, &camera);
        assert_ne!(buffers.color_at(0, 0), Some(GROUND_COLOR));
        assert_eq!(buffers.color_at(0, 99), Some(GROUND_COLOR));

        camera.rotate(80.0, 0.0, 0.0);
        draw_sky(&mut buffers, &camera);
        assert_ne!(buffers.color_at(0, 99), Some(GROUND_COLOR));

        camera.rotate(-160.0, 0.0, 0.0);
        draw_sky(&mut buffers, &camera);
        assert_eq!(buffers.color_at(0, 0), Some(GROUND_COLOR));
    }
}
