// Software rasterizer: frame buffers, the pick tracker and the drawer

mod buffer;
pub mod color;
mod drawer;
mod sky;
mod tracker;

pub use buffer::{FrameBuffers, FAR_DEPTH};
pub use drawer::Drawer;
pub use sky::{GROUND_COLOR, HORIZON_COLOR, ZENITH_COLOR};
pub use tracker::PixelTracker;
