//=========================================================================
// Frame Timing
//
// Fixed-timestep accumulator driving the update cadence. Each loop
// iteration produces one `FrameTick`: the raw elapsed delta plus the
// number of whole fixed steps that elapsed since the previous tick.
//
//=========================================================================

use std::time::{Duration, Instant};

// Upper bound on steps consumed per tick. A long stall (debugger pause,
// suspended host) drops the excess instead of replaying it.
const MAX_STEPS_PER_TICK: u32 = 8;

//=== FrameTick ===========================================================

/// One loop iteration's elapsed-time measurement. Ephemeral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Wall-clock seconds since the previous tick.
    pub delta_seconds: f32,

    /// Whole fixed steps elapsed (0 when the frame ran ahead of the
    /// fixed rate).
    pub steps: u32,
}

//=== FixedTimestep =======================================================

/// Accumulates wall-clock time into fixed steps at a configured rate.
pub struct FixedTimestep {
    step: Duration,
    accumulator: Duration,
    previous: Instant,
}

impl FixedTimestep {
    /// Creates a timestep running at `tick_rate` steps per second.
    ///
    /// # Panics
    ///
    /// Panics if `tick_rate <= 0.0`.
    pub fn new(tick_rate: f64) -> Self {
        assert!(tick_rate > 0.0, "Tick rate must be positive, got {}", tick_rate);
        Self {
            step: Duration::from_secs_f64(1.0 / tick_rate),
            accumulator: Duration::ZERO,
            previous: Instant::now(),
        }
    }

    /// Duration of one fixed step.
    pub fn step_duration(&self) -> Duration {
        self.step
    }

    /// Advances the clock and returns the tick for this iteration.
    pub fn advance(&mut self) -> FrameTick {
        self.advance_at(Instant::now())
    }

    fn advance_at(&mut self, now: Instant) -> FrameTick {
        let delta = now.saturating_duration_since(self.previous);
        self.previous = now;
        self.accumulator += delta;

        let mut steps = 0;
        while self.accumulator >= self.step && steps < MAX_STEPS_PER_TICK {
            self.accumulator -= self.step;
            steps += 1;
        }

        if steps == MAX_STEPS_PER_TICK {
            // Stalled; drop whatever is left rather than spiral.
            self.accumulator = Duration::ZERO;
        }

        FrameTick {
            delta_seconds: delta.as_secs_f32(),
            steps,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "Tick rate must be positive")]
    fn zero_tick_rate_panics() {
        FixedTimestep::new(0.0);
    }

    #[test]
    fn short_frame_produces_no_steps() {
        let mut ts = FixedTimestep::new(60.0);
        let start = ts.previous;

        let tick = ts.advance_at(start + Duration::from_millis(5));
        assert_eq!(tick.steps, 0);
        assert!(tick.delta_seconds > 0.0);
    }

    #[test]
    fn one_step_per_period() {
        let mut ts = FixedTimestep::new(60.0);
        let start = ts.previous;

        let tick = ts.advance_at(start + ts.step_duration());
        assert_eq!(tick.steps, 1);
    }

    #[test]
    fn accumulator_carries_remainder_across_ticks() {
        let mut ts = FixedTimestep::new(10.0); // 100ms step
        let start = ts.previous;

        // 150ms: one step, 50ms left over.
        let tick = ts.advance_at(start + Duration::from_millis(150));
        assert_eq!(tick.steps, 1);

        // Another 60ms: the carried 50ms tips it over.
        let tick = ts.advance_at(start + Duration::from_millis(210));
        assert_eq!(tick.steps, 1);
    }

    #[test]
    fn long_stall_is_clamped() {
        let mut ts = FixedTimestep::new(60.0);
        let start = ts.previous;

        let tick = ts.advance_at(start + Duration::from_secs(30));
        assert_eq!(tick.steps, MAX_STEPS_PER_TICK);

        // The excess was dropped, not carried forward.
        let tick = ts.advance_at(start + Duration::from_secs(30) + Duration::from_millis(1));
        assert_eq!(tick.steps, 0);
    }
}
