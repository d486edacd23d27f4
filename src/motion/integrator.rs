//! Per-tick trapezoidal integration of the consumer segment.
//!
//! The integrator owns all scratch state that only the tick context touches:
//! segment-frame velocity and acceleration, distance traveled along the
//! current leg, the step remainder and the queue state machine. It reaches the
//! shared [`SegmentQueue`] through short exclusive windows and emits step
//! pulses outside them.

use libm::fabsf;

use crate::config::units::{Instant, Microsteps, Milliseconds};
use crate::config::{validate_config, AxisConfig, TickTiming};
use crate::error::{MotionError, Result};
use crate::halt::HaltHandler;
use crate::motor::StepDriver;
use crate::queue::{Segment, SegmentQueue};

use super::position::Position;
use super::state::{AxisState, Direction, QueueState};

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// The consumer slot holds nothing.
    Idle,
    /// A segment is queued but motion has not started (start delay).
    Waiting,
    /// A latched halt blocked integration.
    Halted,
    /// The consumer segment was integrated.
    Integrated {
        /// Pulse emitted this tick.
        step: Option<Direction>,
        /// Sequence number of the segment retired this tick.
        retired: Option<u32>,
    },
}

/// Tick-context integrator for one actuator axis.
pub struct Integrator<D> {
    driver: D,
    timing: TickTiming,
    axis: usize,
    microsteps: Microsteps,
    tolerance: f32,
    start_delay: Milliseconds,

    queue_state: QueueState,
    epoch: u32,
    start_deadline: Instant,
    ticks: u64,

    velocity: f32,
    acceleration: f32,
    distance_traveled: f32,
    position: Position,
    current: Option<u32>,
}

impl<D: StepDriver> Integrator<D> {
    /// Create an integrator from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the first configuration check that fails.
    pub fn new(config: &AxisConfig, driver: D) -> Result<Self> {
        validate_config(config)?;
        let timing = TickTiming::from_config(config);

        info!(
            "axis {}: tick {} us, max velocity {} steps/s",
            config.axis_index,
            timing.period.value(),
            timing.max_velocity
        );

        Ok(Self {
            driver,
            timing,
            axis: usize::from(config.axis_index),
            microsteps: config.microsteps,
            tolerance: config.velocity_tolerance,
            start_delay: config.start_delay,
            queue_state: QueueState::Empty,
            epoch: 0,
            start_deadline: Instant(0),
            ticks: 0,
            velocity: 0.0,
            acceleration: 0.0,
            distance_traveled: 0.0,
            position: Position::new(),
            current: None,
        })
    }

    /// Derived tick constants.
    #[inline]
    pub fn timing(&self) -> &TickTiming {
        &self.timing
    }

    /// Consumer-side state machine position.
    #[inline]
    pub fn queue_state(&self) -> QueueState {
        self.queue_state
    }

    /// Distance traveled along the current leg, in steps.
    #[inline]
    pub fn distance_traveled(&self) -> f32 {
        self.distance_traveled
    }

    /// Segment-frame velocity, before projection onto the axis.
    #[inline]
    pub fn segment_velocity(&self) -> f32 {
        self.velocity
    }

    /// Reported axis position in steps.
    #[inline]
    pub fn position(&self) -> f32 {
        self.position.steps()
    }

    /// Time on the tick clock.
    #[inline]
    pub fn now(&self) -> Instant {
        Instant(self.ticks.saturating_mul(u64::from(self.timing.period.value())))
    }

    /// Number of ticks run since creation.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The step driver.
    #[inline]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the step driver.
    #[inline]
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Overwrite the reported position and drop the pending step fraction.
    pub fn set_position(&mut self, steps: f32) {
        self.position.set_steps(steps);
        debug!("axis {}: position set to {}", self.axis, steps);
    }

    /// Drop back to [`QueueState::Empty`] and bring the axis to rest.
    ///
    /// Position and the tick clock are kept.
    pub fn reset(&mut self) {
        self.enter(QueueState::Empty);
        self.velocity = 0.0;
        self.acceleration = 0.0;
        self.distance_traveled = 0.0;
        self.current = None;
    }

    /// Run one fixed-period tick.
    ///
    /// Must be called exactly once per tick period. Always returns; the error
    /// cases abort only this tick's motion output:
    /// - `NegativeVelocity` when integrated velocity fell below the tolerance
    /// - `PinError` when the step driver failed (kinematics still advanced)
    pub fn tick<H: HaltHandler>(&mut self, queue: &SegmentQueue<H>) -> Result<TickOutcome> {
        self.ticks = self.ticks.wrapping_add(1);

        let view = queue.consumer(self.queue_state == QueueState::Incrementing);
        if view.epoch != self.epoch {
            debug!("axis {}: queue reset, dropping current leg", self.axis);
            self.epoch = view.epoch;
            self.reset();
        }

        if view.latched {
            self.velocity = 0.0;
            self.acceleration = 0.0;
            self.publish(queue, 0.0);
            return Ok(TickOutcome::Halted);
        }

        let Some(segment) = view.segment else {
            if self.queue_state != QueueState::Empty {
                self.reset();
            }
            self.publish(queue, 0.0);
            return Ok(TickOutcome::Idle);
        };

        match self.queue_state {
            QueueState::Empty => {
                self.distance_traveled = 0.0;
                self.start_deadline = self.now() + self.start_delay;
                self.enter(QueueState::AwaitingStart);
                self.publish(queue, 0.0);
                return Ok(TickOutcome::Waiting);
            }
            QueueState::AwaitingStart => {
                if self.now() > self.start_deadline {
                    self.enter(QueueState::Incrementing);
                }
                self.publish(queue, 0.0);
                return Ok(TickOutcome::Waiting);
            }
            QueueState::Incrementing => {
                self.velocity = segment.vi;
                self.acceleration = segment.accel;
                self.current = Some(segment.sequence);
                self.enter(QueueState::Running);
            }
            QueueState::Running => {}
        }

        self.integrate(queue, &segment)
    }

    fn integrate<H: HaltHandler>(
        &mut self,
        queue: &SegmentQueue<H>,
        segment: &Segment,
    ) -> Result<TickOutcome> {
        let dt = self.timing.dt;
        let projection = segment.projection(self.axis);

        // distance needed to slow from v to vf; negative while vf is still above v
        let a = segment.accel;
        let stop_distance = if a > 0.0 {
            (self.velocity * self.velocity - segment.vf * segment.vf) / (2.0 * a)
        } else {
            0.0
        };
        let remaining = segment.distance - self.distance_traveled;
        self.acceleration = if stop_distance > fabsf(remaining) { -a } else { a };

        let v = self.velocity + self.acceleration * dt;
        if v < -self.tolerance {
            error!("axis {}: velocity {} below tolerance, tick aborted", self.axis, v);
            self.velocity = 0.0;
            self.publish(queue, projection);
            return Err(MotionError::NegativeVelocity(v).into());
        }
        let clamped = v.max(0.0).min(segment.vmax);
        if clamped != v {
            // cruising at vmax or resting at zero
            self.acceleration = 0.0;
        }
        self.velocity = clamped;

        self.distance_traveled += self.velocity * dt;

        let step = self.position.advance(self.velocity * projection * dt);
        let pulse = match step {
            Some(direction) => self.driver.step(self.microsteps, direction.is_positive()),
            None => Ok(()),
        };

        let mut retired = None;
        if self.distance_traveled >= segment.distance {
            let retirement = queue.retire();
            self.distance_traveled -= segment.distance;
            self.current = None;
            retired = retirement.retired.map(|s| s.sequence);

            if retirement.successor_ready {
                self.enter(QueueState::Incrementing);
            } else {
                self.enter(QueueState::Empty);
                self.velocity = 0.0;
                self.acceleration = 0.0;
            }
            debug!(
                "axis {}: retired segment {} (carry {})",
                self.axis,
                segment.sequence,
                self.distance_traveled
            );
        }

        self.publish(queue, projection);

        if let Err(e) = pulse {
            error!("axis {}: step output failed: {}", self.axis, e);
            return Err(e.into());
        }

        Ok(TickOutcome::Integrated { step, retired })
    }

    fn enter(&mut self, next: QueueState) {
        if self.queue_state != next {
            trace!("axis {}: {:?} -> {:?}", self.axis, self.queue_state, next);
            self.queue_state = next;
        }
    }

    fn publish<H: HaltHandler>(&self, queue: &SegmentQueue<H>, projection: f32) {
        queue.publish(AxisState {
            position: self.position.steps(),
            velocity: self.velocity * projection,
            acceleration: self.acceleration * projection,
            mode: Default::default(),
            current_segment: self.current,
        });
    }
}
