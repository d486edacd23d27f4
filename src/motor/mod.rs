//! Step output.
//!
//! The integrator only needs to emit single step pulses in a given direction.
//! [`StepDriver`] is that capability; [`PinStepDriver`] implements it on
//! embedded-hal pins.

mod driver;

pub use driver::{PinStepDriver, DEFAULT_PULSE_WIDTH_US};

use crate::config::units::Microsteps;
use crate::error::MotorError;

/// Capability to emit one step pulse.
///
/// Called at most once per tick, from the tick context, outside the queue's
/// exclusive window. Implementations must not block for longer than a pulse.
pub trait StepDriver {
    /// Emit one pulse in the given direction.
    fn step(&mut self, microsteps: Microsteps, forward: bool) -> Result<(), MotorError>;
}

impl<T: StepDriver + ?Sized> StepDriver for &mut T {
    fn step(&mut self, microsteps: Microsteps, forward: bool) -> Result<(), MotorError> {
        (**self).step(microsteps, forward)
    }
}
