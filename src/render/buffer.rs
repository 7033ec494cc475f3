// Color and depth buffers

use crate::error::{Result, ViewerError};

/// Depth value the buffer is cleared to. Every drawable depth is nearer.
pub const FAR_DEPTH: f32 = f32::INFINITY;

/// Color and depth buffers for one viewport, row-major from the top-left.
#[derive(Debug, Clone)]
pub struct FrameBuffers {
    width: u32,
    height: u32,
    /// Packed 0xAARRGGBB.
    color: Vec<u32>,
    depth: Vec<f32>,
}

impl FrameBuffers {
    /// Allocates buffers. Zero-sized viewports are rejected.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ViewerError::InvalidViewport { width, height });
        }

        let len = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            color: vec![0xFF00_0000; len],
            depth: vec![FAR_DEPTH; len],
        })
    }

    /// Reallocates for a new viewport size. On error the old buffers are kept.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        *self = Self::new(width, height)?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn reset_depth(&mut self) {
        self.depth.fill(FAR_DEPTH);
    }

    pub fn fill_color(&mut self, color: u32) {
        self.color.fill(color);
    }

    pub fn color(&self) -> &[u32] {
        &self.color
    }

    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn color_at(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|i| self.color[i])
    }

    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Writes a whole row of color. Used by the sky pass.
    pub(crate) fn fill_row(&mut self, y: u32, color: u32) {
        if let Some(start) = self.index(0, y) {
            self.color[start..start + self.width as usize].fill(color);
        }
    }

    /// Depth-tested write: only a strictly nearer `depth` lands. Returns whether it did.
    ///
    /// `blend` receives the stored color and returns the color to write.
    pub(crate) fn test_and_set(
        &mut self,
        x: u32,
        y: u32,
        depth: f32,
        blend: impl FnOnce(u32) -> u32,
    ) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        if depth >= self.depth[i] {
            return false;
        }
        self.depth[i] = depth;
        self.color[i] = blend(self.color[i]);
        true
    }
}
