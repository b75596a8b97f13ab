//! Frame timing.
//!
//! Updaters never read a clock. They receive a [`FrameTime`] value carrying
//! the elapsed time and the delta since the previous frame, which keeps every
//! pattern a pure function of `(state, time, params)` and lets tests drive
//! them with exact values.
//!
//! [`Time`] is the monotonic clock a real-time loop uses to produce those
//! values.
//!
//! # Example
//!
//! ```ignore
//! use backdrop::time::Time;
//!
//! let mut time = Time::new();
//!
//! // In your frame loop:
//! let frame = time.update();
//! scene.advance(frame);
//! ```

use std::time::Instant;

/// Explicit time input for one frame, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Total time since the loop started.
    pub elapsed: f32,
    /// Time since the previous frame.
    pub delta: f32,
}

impl FrameTime {
    pub const ZERO: FrameTime = FrameTime {
        elapsed: 0.0,
        delta: 0.0,
    };

    pub fn new(elapsed: f32, delta: f32) -> Self {
        Self { elapsed, delta }
    }

    /// The frame that follows this one after `delta` seconds.
    pub fn next(self, delta: f32) -> Self {
        Self {
            elapsed: self.elapsed + delta,
            delta,
        }
    }

    /// Both values multiplied by `factor`.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            elapsed: self.elapsed * factor,
            delta: self.delta * factor,
        }
    }
}

/// Monotonic clock for frame loops.
///
/// Produces a [`FrameTime`] per call to [`Time::update`], either from wall
/// time or from an optional fixed step, scaled by a time multiplier.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    /// When set, every update advances by exactly this step.
    fixed_delta: Option<f32>,
    time_scale: f32,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fixed_delta: None,
            time_scale: 1.0,
        }
    }

    /// Advance the clock. Call once per frame.
    ///
    /// With a fixed delta the elapsed time is the sum of fixed steps rather
    /// than wall time, so headless runs are reproducible.
    pub fn update(&mut self) -> FrameTime {
        let now = Instant::now();
        match self.fixed_delta {
            Some(step) => {
                self.delta_secs = step * self.time_scale;
                self.elapsed_secs += self.delta_secs;
            }
            None => {
                self.delta_secs = now.duration_since(self.last_frame).as_secs_f32() * self.time_scale;
                self.elapsed_secs = now.duration_since(self.start).as_secs_f32() * self.time_scale;
            }
        }
        self.last_frame = now;
        self.frame_count += 1;
        self.frame_time()
    }

    #[inline]
    pub fn frame_time(&self) -> FrameTime {
        FrameTime::new(self.elapsed_secs, self.delta_secs)
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Frames produced so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Use a fixed step instead of wall time. `None` restores real timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Negative scales clamp to 0, which freezes the clock.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.time_scale(), 1.0);
        assert_eq!(time.frame_time(), FrameTime::ZERO);
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let frame = time.update();

        assert!(frame.elapsed > 0.0);
        assert!(frame.delta > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_zero_scale_freezes_elapsed() {
        let mut time = Time::new();
        time.set_fixed_delta(Some(0.25));
        time.update();
        time.set_time_scale(0.0);
        let frozen = time.update();
        assert_eq!(frozen, FrameTime::new(0.25, 0.0));
        assert_eq!(time.frame(), 2);
    }

    #[test]
    fn test_scale_multiplies_fixed_step() {
        let mut time = Time::new();
        time.set_fixed_delta(Some(0.1));
        time.set_time_scale(2.0);
        time.update();
        let frame = time.update();
        assert!((frame.elapsed - 0.4).abs() < 1e-6);
        assert!((frame.delta - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_time_scale_clamps() {
        let mut time = Time::new();
        time.set_time_scale(2.0);
        assert_eq!(time.time_scale(), 2.0);
        time.set_time_scale(-1.0);
        assert_eq!(time.time_scale(), 0.0);
    }

    #[test]
    fn test_fixed_delta_accumulates() {
        let mut time = Time::new();
        time.set_fixed_delta(Some(0.5));

        thread::sleep(Duration::from_millis(20));
        time.update();
        let frame = time.update();

        assert_eq!(frame.delta, 0.5);
        assert_eq!(frame.elapsed, 1.0);
    }

    #[test]
    fn test_frame_time_helpers() {
        let f = FrameTime::ZERO.next(0.25).next(0.25);
        assert_eq!(f, FrameTime::new(0.5, 0.25));
        assert_eq!(f.scaled(2.0), FrameTime::new(1.0, 0.5));
    }
}
