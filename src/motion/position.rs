//! Position tracking for the integrated axis.
//!
//! Continuous axis displacement is accumulated into the reported position and
//! into a fractional step remainder that is turned into discrete pulses.

use super::state::Direction;

/// Reported position plus the pending fraction of a step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    /// Reported position in steps.
    steps: f32,
    /// Displacement not yet emitted as a pulse.
    remainder: f32,
}

impl Position {
    /// Create a tracker at the origin.
    #[inline]
    pub const fn new() -> Self {
        Self {
            steps: 0.0,
            remainder: 0.0,
        }
    }

    /// Current position in steps.
    #[inline]
    pub fn steps(&self) -> f32 {
        self.steps
    }

    /// Displacement waiting to be emitted.
    #[inline]
    pub fn remainder(&self) -> f32 {
        self.remainder
    }

    /// Overwrite the position and drop any pending fraction.
    #[inline]
    pub fn set_steps(&mut self, steps: f32) {
        self.steps = steps;
        self.remainder = 0.0;
    }

    /// Add a displacement and return the pulse it releases, if any.
    ///
    /// At most one pulse is released per call; a remainder past one step is
    /// kept and paid out on later calls.
    pub fn advance(&mut self, delta: f32) -> Option<Direction> {
        self.steps += delta;
        self.remainder += delta;

        if self.remainder >= 1.0 {
            self.remainder -= 1.0;
            Some(Direction::Positive)
        } else if self.remainder <= -1.0 {
            self.remainder += 1.0;
            Some(Direction::Negative)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractions_accumulate_into_one_pulse() {
        let mut pos = Position::new();
        assert_eq!(pos.advance(0.4), None);
        assert_eq!(pos.advance(0.4), None);
        assert_eq!(pos.advance(0.4), Some(Direction::Positive));
        assert!((pos.remainder() - 0.2).abs() < 1e-6);
        assert!((pos.steps() - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_negative_motion() {
        let mut pos = Position::new();
        assert_eq!(pos.advance(-0.6), None);
        assert_eq!(pos.advance(-0.6), Some(Direction::Negative));
        assert!((pos.remainder() + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_overshoot_paid_out_over_later_calls() {
        let mut pos = Position::new();
        assert_eq!(pos.advance(2.5), Some(Direction::Positive));
        assert_eq!(pos.advance(0.0), Some(Direction::Positive));
        assert_eq!(pos.advance(0.0), None);
        assert!((pos.remainder() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_set_steps_clears_remainder() {
        let mut pos = Position::new();
        pos.advance(0.7);
        pos.set_steps(10.0);
        assert_eq!(pos.steps(), 10.0);
        assert_eq!(pos.remainder(), 0.0);
    }
}
