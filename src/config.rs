// Viewer configuration

use glam::Vec3;

use crate::error::ViewerError;

/// Environment variable overriding the window size, formatted `WIDTHxHEIGHT`.
pub const WINDOW_SIZE_ENV: &str = "KIWI3D_WINDOW_SIZE";

/// Tunables for the viewer and its scene controls.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Degrees of rotation per pixel of mouse drag.
    pub mouse_sensitivity: f32,
    /// Gravity applied to every object when gravity is toggled on.
    pub gravity: f32,
    /// Velocity given to every object by the impulse key.
    pub impulse_velocity: Vec3,
    /// Opacity of the selected object.
    pub selected_opacity: f32,
    pub draw_normals: bool,
    /// `env_logger` filter; `RUST_LOG` and then "info" apply when unset.
    pub log_filter: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
            title: "Kiwi3D".to_string(),
            mouse_sensitivity: 0.2,
            gravity: -30.0,
            impulse_velocity: Vec3::new(0.0, 25.0, 0.0),
            selected_opacity: 0.5,
            draw_normals: false,
            log_filter: None,
        }
    }
}

impl ViewerConfig {
    /// Defaults, with the window size taken from `KIWI3D_WINDOW_SIZE` when set.
    ///
    /// A malformed value is handed back next to the defaults so the caller
    /// can report it once logging is up.
    pub fn from_env() -> (Self, Option<ViewerError>) {
        Self::with_window_size(std::env::var(WINDOW_SIZE_ENV).ok().as_deref())
    }

    pub fn with_window_size(value: Option<&str>) -> (Self, Option<ViewerError>) {
        let mut config = Self::default();
        let Some(value) = value else {
            return (config, None);
        };

        match parse_window_size(value) {
            Some((width, height)) => {
                config.width = width;
                config.height = height;
                (config, None)
            }
            None => (config, Some(ViewerError::InvalidWindowSize(value.to_string()))),
        }
    }
}

/// Parses `WIDTHxHEIGHT`. Zero dimensions are rejected.
pub fn parse_window_size(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.trim().split_once(['x', 'X'])?;
    let width: u32 = w.trim().parse().ok()?;
    let height: u32 = h.trim().parse().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}
