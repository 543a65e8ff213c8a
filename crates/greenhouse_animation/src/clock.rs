//! Monotonic time sources for the animation driver

use std::cell::Cell;
use std::time::Instant;

use crate::error::{ConfigError, Result};

/// A monotonic millisecond time source
pub trait Clock {
    /// Milliseconds since the clock's origin
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Deterministic clock advanced by hand.
///
/// Used by tests and the headless runtime so that frame timestamps are exact.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute time
    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    /// Move forward by `ms` and return the new time
    pub fn advance(&self, ms: f64) -> f64 {
        let now = self.now.get() + ms;
        self.now.set(now);
        now
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Frame length in milliseconds for a display refresh rate
pub fn frame_interval_ms(fps: u32) -> Result<f64> {
    if fps == 0 {
        return Err(ConfigError::InvalidFrameRate(fps).into());
    }
    Ok(1000.0 / fps as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        assert_eq!(clock.now_ms(), 0.0);
        assert_eq!(clock.advance(16.0), 16.0);
        clock.set(100.0);
        assert_eq!(clock.now_ms(), 100.0);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(frame_interval_ms(50).unwrap(), 20.0);
        assert!(frame_interval_ms(0).is_err());
    }
}
