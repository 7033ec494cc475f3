// Frame timing

use std::time::{Duration, Instant};

/// Frame clock handing out elapsed milliseconds per frame.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// feed a huge step into the physics integrator.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the baseline, e.g. after the window was suspended.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Advances the clock and returns the clamped frame time in milliseconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;
        self.frame_index = self.frame_index.wrapping_add(1);

        dt.as_secs_f32() * 1000.0
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
