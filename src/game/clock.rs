//! Fixed-timestep accumulator driving the physics independently of the display frame rate.

use std::time::Duration;

/// Turns the timestamps of display frames into a whole number of physics steps.
///
/// Leftover time is carried to the next frame, so the long-run step rate doesn't depend on the frame rate.
#[derive(Clone, Debug)]
pub struct FixedStep {
    step: Duration,
    max_delta: Duration,
    accumulator: Duration,
    last_frame: Option<Duration>,
}

impl FixedStep {
    pub fn new(step: Duration, max_delta: Duration) -> FixedStep {
        FixedStep {
            step,
            max_delta,
            accumulator: Duration::ZERO,
            last_frame: None,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Feed the timestamp of a new frame and return how many steps it is worth.
    ///
    /// The first frame after a [`FixedStep::reset`] only sets the time reference. Timestamps going backwards count as
    /// no elapsed time.
    pub fn advance(&mut self, now: Duration) -> u32 {
        let Some(last_frame) = self.last_frame.replace(now) else {
            return 0;
        };
        let delta = now.saturating_sub(last_frame).min(self.max_delta);
        self.accumulator += delta;

        let mut steps = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }

    /// Drop any accumulated time and wait for a new time reference.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
        self.last_frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(10);

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn first_frame_primes() {
        let mut clock = FixedStep::new(STEP, ms(250));
        assert_eq!(clock.advance(ms(5_000)), 0);
        assert_eq!(clock.advance(ms(5_010)), 1);
    }

    #[test]
    fn leftovers_carry_over() {
        let mut clock = FixedStep::new(STEP, ms(250));
        clock.advance(ms(0));
        assert_eq!(clock.advance(ms(15)), 1);
        assert_eq!(clock.advance(ms(20)), 1);
        assert_eq!(clock.advance(ms(24)), 0);
        assert_eq!(clock.advance(ms(61)), 4);
    }

    #[test]
    fn steps_do_not_depend_on_frame_rate() {
        let mut slow = FixedStep::new(STEP, ms(250));
        let mut fast = FixedStep::new(STEP, ms(250));
        let slow_steps: u32 = (0..=30).map(|i| slow.advance(ms(i * 33))).sum();
        let fast_steps: u32 = (0..=165).map(|i| fast.advance(ms(i * 6))).sum();
        assert_eq!(slow_steps, 99);
        assert_eq!(fast_steps, 99);
    }

    #[test]
    fn stalls_are_capped() {
        let mut clock = FixedStep::new(STEP, ms(250));
        clock.advance(ms(0));
        assert_eq!(clock.advance(ms(60_000)), 25);
        clock.reset();
        assert_eq!(clock.advance(ms(70_000)), 0);
        assert_eq!(clock.advance(ms(69_000)), 0);
    }
}
