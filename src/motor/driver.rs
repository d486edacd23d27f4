//! Step-pulse driver on embedded-hal pins.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::Microsteps;
use crate::error::MotorError;
use crate::motion::Direction;

use super::StepDriver;

/// Default STEP pulse width in microseconds.
pub const DEFAULT_PULSE_WIDTH_US: u32 = 2;

/// STEP/DIR driver over embedded-hal 1.0 pins.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `DELAY`: Delay provider for the pulse width (must implement `DelayNs`)
///
/// The microstep setting is configured on the driver chip itself, so it is
/// accepted and ignored here.
pub struct PinStepDriver<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// STEP pin (pulse to move one step).
    step_pin: STEP,

    /// DIR pin (high = positive, or inverted).
    dir_pin: DIR,

    /// Delay provider for the pulse width.
    delay: DELAY,

    /// Last direction written (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,

    /// STEP high time.
    pulse_width_us: u32,

    /// Pulses emitted since creation.
    pulses: u32,
}

impl<STEP, DIR, DELAY> PinStepDriver<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    /// Create a driver with non-inverted direction and the default pulse width.
    pub fn new(step_pin: STEP, dir_pin: DIR, delay: DELAY) -> Self {
        Self {
            step_pin,
            dir_pin,
            delay,
            current_direction: None,
            invert_direction: false,
            pulse_width_us: DEFAULT_PULSE_WIDTH_US,
            pulses: 0,
        }
    }

    /// Invert the DIR pin logic.
    pub fn inverted(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Set the STEP pulse width.
    pub fn pulse_width_us(mut self, width: u32) -> Self {
        self.pulse_width_us = width;
        self
    }

    /// Number of pulses emitted since creation.
    #[inline]
    pub fn pulses(&self) -> u32 {
        self.pulses
    }

    /// Release the pins and delay provider.
    pub fn release(self) -> (STEP, DIR, DELAY) {
        (self.step_pin, self.dir_pin, self.delay)
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), MotorError> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = direction.is_positive() != self.invert_direction;
        if pin_high {
            self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
        }

        self.current_direction = Some(direction);
        Ok(())
    }
}

impl<STEP, DIR, DELAY> StepDriver for PinStepDriver<STEP, DIR, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
{
    fn step(&mut self, _microsteps: Microsteps, forward: bool) -> Result<(), MotorError> {
        let direction = if forward {
            Direction::Positive
        } else {
            Direction::Negative
        };
        self.set_direction(direction)?;

        self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
        self.delay.delay_us(self.pulse_width_us);
        self.step_pin.set_low().map_err(|_| MotorError::PinError)?;

        self.pulses = self.pulses.wrapping_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    #[test]
    fn test_direction_written_once_per_change() {
        let step = PinMock::new(&[
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ]);
        let dir = PinMock::new(&[Transaction::set(State::High), Transaction::set(State::Low)]);

        let mut driver = PinStepDriver::new(step, dir, NoopDelay::new());
        driver.step(Microsteps::QUARTER, true).unwrap();
        driver.step(Microsteps::QUARTER, true).unwrap();
        driver.step(Microsteps::QUARTER, false).unwrap();
        assert_eq!(driver.pulses(), 3);

        let (mut step, mut dir, _) = driver.release();
        step.done();
        dir.done();
    }

    #[test]
    fn test_inverted_direction() {
        let step = PinMock::new(&[Transaction::set(State::High), Transaction::set(State::Low)]);
        let dir = PinMock::new(&[Transaction::set(State::Low)]);

        let mut driver = PinStepDriver::new(step, dir, NoopDelay::new()).inverted(true);
        driver.step(Microsteps::FULL, true).unwrap();

        let (mut step, mut dir, _) = driver.release();
        step.done();
        dir.done();
    }
}
