// Error types for the Kiwi3D core

/// Errors raised by the core. Per-frame drawing never produces one of these;
/// they only come out of setup calls such as buffer allocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    #[error("invalid viewport size {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid KIWI3D_WINDOW_SIZE {0:?}, expected WIDTHxHEIGHT")]
    InvalidWindowSize(String),

    #[error("unknown camera preset: {0}")]
    UnknownPreset(usize),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
