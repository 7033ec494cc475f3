//! Kiwi3D: a scene viewer built on a CPU rasterizer.
//!
//! Each frame the [`app::AppContext`] runs input, physics and a depth-buffered
//! draw pass into its own color buffer. Right-click picking is answered by the
//! draw pass itself: the [`render::PixelTracker`] notes which object last wrote
//! the watched pixel, and the result is consumed at the start of the next frame.

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod math;
pub mod mesh;
pub mod picking;
pub mod render;
pub mod scene;
pub mod time;

pub use app::AppContext;
pub use camera::Camera;
pub use config::ViewerConfig;
pub use error::ViewerError;
pub use scene::{Object, ObjectId, ObjectSet};
