//! Single-context actuator facade.
//!
//! On hardware the [`SegmentQueue`] lives in a `static` and the [`Integrator`]
//! is owned by the tick interrupt. Simulations, tests and cooperative loops
//! that run both sides from one context can use [`Actuator`] instead, which
//! bundles the two behind one API.
//!
//! # Example
//!
//! ```rust,ignore
//! use segment_stepper::{Actuator, AxisConfig};
//!
//! let config = segment_stepper::load_config("axis.toml")?;
//! let mut axis = Actuator::new(&config, PinStepDriver::new(step, dir, delay))?;
//!
//! axis.admit_bytes(&datagram)?;
//! loop {
//!     axis.tick()?;
//!     if let Some(done) = axis.drain_completion() {
//!         transport.send(&done);
//!     }
//! }
//! ```

use crate::config::AxisConfig;
use crate::error::Result;
use crate::halt::{HaltCause, HaltHandler, HaltLatch};
use crate::motion::{AxisState, Integrator, TickOutcome};
use crate::motor::StepDriver;
use crate::queue::{Admission, Message, Segment, SegmentQueue};
use crate::wire;

/// Queue and integrator for one axis, driven from a single context.
pub struct Actuator<D, H = HaltLatch> {
    queue: SegmentQueue<H>,
    integrator: Integrator<D>,
}

impl<D: StepDriver> Actuator<D, HaltLatch> {
    /// Create an actuator with the stock halt handler using the configured policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: &AxisConfig, driver: D) -> Result<Self> {
        Self::with_halt_handler(config, driver, HaltLatch::new(config.halt_policy))
    }
}

impl<D: StepDriver, H: HaltHandler> Actuator<D, H> {
    /// Create an actuator with a custom halt handler.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn with_halt_handler(config: &AxisConfig, driver: D, halt: H) -> Result<Self> {
        Ok(Self {
            queue: SegmentQueue::new(halt),
            integrator: Integrator::new(config, driver)?,
        })
    }

    /// The shared queue.
    #[inline]
    pub fn queue(&self) -> &SegmentQueue<H> {
        &self.queue
    }

    /// The tick integrator.
    #[inline]
    pub fn integrator(&self) -> &Integrator<D> {
        &self.integrator
    }

    /// Mutable access to the tick integrator.
    #[inline]
    pub fn integrator_mut(&mut self) -> &mut Integrator<D> {
        &mut self.integrator
    }

    /// Admit a segment.
    pub fn admit(&self, segment: &Segment) -> Result<Admission> {
        self.queue.admit(segment)
    }

    /// Decode a segment datagram and admit it.
    pub fn admit_bytes(&self, bytes: &[u8]) -> Result<Admission> {
        let segment = wire::decode_segment(bytes)?;
        self.queue.admit(&segment)
    }

    /// Whether another segment can be admitted.
    pub fn has_space(&self) -> bool {
        self.queue.has_space()
    }

    /// Run one tick.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.integrator.tick(&self.queue)
    }

    /// Take the pending acknowledgement.
    pub fn drain_ack(&self) -> Option<Message> {
        self.queue.drain_ack()
    }

    /// Take the pending completion message.
    pub fn drain_completion(&self) -> Option<Message> {
        self.queue.drain_completion()
    }

    /// Reported state as of the last tick.
    pub fn state(&self) -> AxisState {
        self.queue.state()
    }

    /// Reported state in its wire layout.
    pub fn state_bytes(&self) -> [u8; wire::STATE_LEN] {
        wire::encode_state(&self.queue.state())
    }

    /// Signal a halt.
    pub fn halt(&self, cause: HaltCause) {
        self.queue.halt(cause);
    }

    /// Release a latched halt.
    pub fn clear_halt(&self) {
        self.queue.clear_halt();
    }

    /// Overwrite the reported position.
    pub fn set_position(&mut self, steps: f32) {
        self.integrator.set_position(steps);
    }

    /// Drop all queued segments and bring the axis to rest.
    pub fn reset(&mut self) {
        self.queue.reset();
        self.integrator.reset();
        info!("actuator reset");
    }
}
