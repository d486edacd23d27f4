//! Motion state types shared between the tick and mainline contexts.

/// Direction of a step pulse along the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Increasing position.
    Positive,
    /// Decreasing position.
    Negative,
}

impl Direction {
    /// Whether this is the positive direction.
    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Direction::Positive)
    }
}

/// Which input drives the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Nothing has been commanded since init.
    #[default]
    Idle,
    /// Motion comes from the segment queue.
    Queue,
}

/// Consumer-side progress through the queue.
///
/// Governs when integration of the consumer slot begins, not which slot is
/// current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueState {
    /// Nothing to integrate.
    #[default]
    Empty,
    /// A segment arrived; waiting out the start delay.
    AwaitingStart,
    /// Seed velocity from the consumer slot on the next evaluation.
    Incrementing,
    /// Integrating the consumer slot.
    Running,
}

/// Reported state of the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisState {
    /// Axis position in steps.
    pub position: f32,
    /// Axis velocity in steps/sec.
    pub velocity: f32,
    /// Axis acceleration in steps/sec².
    pub acceleration: f32,
    /// Active mode.
    pub mode: Mode,
    /// Sequence number of the segment being integrated.
    pub current_segment: Option<u32>,
}

impl AxisState {
    /// State at init.
    pub const INITIAL: Self = Self {
        position: 0.0,
        velocity: 0.0,
        acceleration: 0.0,
        mode: Mode::Idle,
        current_segment: None,
    };
}
