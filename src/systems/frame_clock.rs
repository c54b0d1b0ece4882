//! Fixed-step accumulator

use std::time::Duration;

/// Converts wall-clock time into a whole number of fixed simulation steps
///
/// Leftover time carries over to the next frame. When a frame would need more
/// than `max_steps` steps the excess is dropped instead of queued, so a long
/// stall does not make the simulation run fast afterwards.
#[derive(Debug, Clone)]
pub struct FrameClock {
    timestep: f32,
    max_steps: u32,
    accumulator: f32,
}

impl FrameClock {
    pub fn new(timestep: f32, max_steps: u32) -> Self {
        Self {
            timestep,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    /// Time carried over that is not yet a full step
    pub fn remainder(&self) -> f32 {
        self.accumulator
    }

    /// Add `elapsed` and return how many steps to run now
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.timestep <= 0.0 || !self.timestep.is_finite() {
            return 0;
        }

        self.accumulator += elapsed.as_secs_f32();
        let mut steps = 0;
        while self.accumulator >= self.timestep && steps < self.max_steps {
            self.accumulator -= self.timestep;
            steps += 1;
        }

        if self.accumulator >= self.timestep {
            log::debug!(
                "Frame clock behind by {:.3}s, dropping",
                self.accumulator
            );
            self.accumulator %= self.timestep;
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_frame_runs_nothing() {
        let mut clock = FrameClock::new(0.1, 5);
        assert_eq!(clock.advance(Duration::from_millis(50)), 0);
        assert!((clock.remainder() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_remainder_carries_over() {
        let mut clock = FrameClock::new(0.1, 5);
        assert_eq!(clock.advance(Duration::from_millis(60)), 0);
        assert_eq!(clock.advance(Duration::from_millis(60)), 1);
        assert!((clock.remainder() - 0.02).abs() < 1e-5);
    }

    #[test]
    fn test_long_stall_is_capped() {
        let mut clock = FrameClock::new(0.1, 5);
        assert_eq!(clock.advance(Duration::from_secs(3)), 5);
        assert!(clock.remainder() < 0.1);
        assert_eq!(clock.advance(Duration::ZERO), 0);
    }

    #[test]
    fn test_zero_max_steps_still_advances() {
        let mut clock = FrameClock::new(0.1, 0);
        assert_eq!(clock.advance(Duration::from_millis(250)), 1);
    }
}
