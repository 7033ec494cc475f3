// Packed 0xAARRGGBB color helpers

use glam::Vec3;

pub fn unpack(color: u32) -> Vec3 {
    Vec3::new(
        ((color >> 16) & 0xFF) as f32,
        ((color >> 8) & 0xFF) as f32,
        (color & 0xFF) as f32,
    ) / 255.0
}

/// Packs an opaque color from channels in [0, 1].
pub fn pack(rgb: Vec3) -> u32 {
    let c = (rgb.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    0xFF00_0000 | (c.x as u32) << 16 | (c.y as u32) << 8 | c.z as u32
}

pub fn lerp(a: u32, b: u32, t: f32) -> u32 {
    pack(unpack(a).lerp(unpack(b), t.clamp(0.0, 1.0)))
}

/// Scales the color channels by `intensity`.
pub fn shade(color: u32, intensity: f32) -> u32 {
    pack(unpack(color) * intensity)
}

/// `src` over `dst` with coverage `alpha`.
pub fn blend(src: u32, dst: u32, alpha: f32) -> u32 {
    if alpha >= 1.0 {
        return src | 0xFF00_0000;
    }
    lerp(dst, src, alpha)
}
