//! Frame clock.
//!
//! The morph animator is driven by the true time between frames, so the
//! clock hands out one `dt` per rendered frame. Two adjustments are applied:
//!
//! - while paused, `dt` is zero (the animator treats that as a no-op);
//! - a gap larger than [`DEFAULT_MAX_DELTA`] (window dragged, laptop asleep) is
//!   clamped, so the tree does not snap to its endpoint in one frame.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // In the redraw handler:
//! let dt = clock.tick();
//! session.frame(dt);
//! ```

use std::time::Instant;

/// Largest `dt` handed out, in seconds.
pub const DEFAULT_MAX_DELTA: f32 = 0.1;

/// Per-frame timing for the render loop.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    /// Animated time in seconds; stops while paused.
    elapsed_secs: f32,
    paused: bool,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Clock whose first frame is measured from `now`.
    pub fn starting_at(now: Instant) -> Self {
        Self {
            last_frame: now,
            elapsed_secs: 0.0,
            paused: false,
        }
    }

    /// Advance one frame using the wall clock. Returns `dt` in seconds.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Advance one frame as if the current time were `now`.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let raw = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let dt = if self.paused {
            0.0
        } else {
            raw.min(DEFAULT_MAX_DELTA)
        };
        self.elapsed_secs += dt;
        dt
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause while the window is hidden. Time spent paused is never replayed.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tick_measures_gap() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        let dt = clock.tick_at(t0 + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-4);
        assert!((clock.elapsed() - 0.016).abs() < 1e-4);
    }

    #[test]
    fn test_paused_yields_zero() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        clock.set_paused(true);
        assert!(clock.is_paused());
        assert_eq!(clock.tick_at(t0 + Duration::from_millis(50)), 0.0);
        assert_eq!(clock.elapsed(), 0.0);

        clock.set_paused(false);
        // The paused stretch is not replayed after resuming
        let dt = clock.tick_at(t0 + Duration::from_millis(60));
        assert!((dt - 0.010).abs() < 1e-4);
    }

    #[test]
    fn test_large_gap_is_clamped() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        assert_eq!(clock.tick_at(t0 + Duration::from_secs(30)), DEFAULT_MAX_DELTA);
        assert_eq!(clock.elapsed(), DEFAULT_MAX_DELTA);
    }

    #[test]
    fn test_time_going_backwards_is_zero() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(t0);
        assert_eq!(clock.tick_at(t0 - Duration::from_millis(5)), 0.0);
    }
}
