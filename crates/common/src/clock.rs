//! Frame timing utilities.
//!
//! Detection streams carry no timestamps of their own: time is implied by
//! the frame index and the stream's frame rate. This module provides:
//! - Conversion between 1-based frame indices and seconds
//! - Sizing of time-based tester windows
//! - A wall-clock timer for reporting processing throughput

use std::time::Instant;

use crate::config::DEFAULT_FPS;

/// Converts between frame counts and seconds at a fixed frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    fps: u32,
}

impl FrameClock {
    /// Create a clock for the given frame rate. A zero rate is treated as 1 fps.
    pub fn new(fps: u32) -> Self {
        Self { fps: fps.max(1) }
    }

    /// Frames per second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Start time (seconds) of a 1-based frame index.
    pub fn frame_to_secs(&self, frame_index: u64) -> f64 {
        frame_index.saturating_sub(1) as f64 / self.fps as f64
    }

    /// Smallest number of frames spanning at least `secs` seconds.
    pub fn frames_for(&self, secs: f64) -> usize {
        if secs <= 0.0 {
            return 0;
        }
        // Guard against 0.5 * 60 = 30.000000000000004 style rounding.
        let exact = secs * self.fps as f64;
        let rounded = exact.round();
        if (exact - rounded).abs() < 1e-9 {
            rounded as usize
        } else {
            exact.ceil() as usize
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

/// Wall-clock timer for a processing run.
#[derive(Debug, Clone)]
pub struct RunTimer {
    started: Instant,

    /// Wall-clock time at start (RFC 3339).
    started_wall: String,
}

impl RunTimer {
    /// Start timing now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            started_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Seconds elapsed since start.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Wall-clock time the run started.
    pub fn started_wall(&self) -> &str {
        &self.started_wall
    }

    /// Average throughput for `frames` processed so far.
    pub fn frames_per_sec(&self, frames: u64) -> f64 {
        let elapsed = self.elapsed_secs();
        if elapsed <= f64::EPSILON {
            return 0.0;
        }
        frames as f64 / elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_to_secs_is_one_based() {
        let clock = FrameClock::new(60);
        assert_eq!(clock.frame_to_secs(1), 0.0);
        assert!((clock.frame_to_secs(61) - 1.0).abs() < 1e-12);
        assert_eq!(clock.frame_to_secs(0), 0.0);
    }

    #[test]
    fn test_frames_for_rounds_up() {
        let clock = FrameClock::new(60);
        assert_eq!(clock.frames_for(0.5), 30);
        assert_eq!(clock.frames_for(1.0), 60);
        assert_eq!(clock.frames_for(0.01), 1);
        assert_eq!(clock.frames_for(0.0), 0);
    }

    #[test]
    fn test_zero_fps_is_clamped() {
        let clock = FrameClock::new(0);
        assert_eq!(clock.fps(), 1);
        assert_eq!(clock.frame_to_secs(3), 2.0);
    }

    #[test]
    fn test_run_timer_elapsed() {
        let timer = RunTimer::start();
        assert!(timer.elapsed_secs() < 1.0);
        assert!(!timer.started_wall().is_empty());
    }
}
