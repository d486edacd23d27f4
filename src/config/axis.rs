//! Axis configuration from TOML.

use serde::Deserialize;

use crate::halt::HaltPolicy;

use super::units::{Microseconds, Milliseconds, Microsteps};

/// Complete configuration of one queue-driven actuator axis.
///
/// Every field has a default, so an empty TOML table is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    /// Fixed integration period.
    #[serde(rename = "tick_period_us")]
    pub tick_period: Microseconds,

    /// Grace period between the first admitted segment and the first tick of motion.
    #[serde(rename = "start_delay_ms")]
    pub start_delay: Milliseconds,

    /// Microstep setting passed to the step driver with every pulse.
    pub microsteps: Microsteps,

    /// Which component of a segment's direction vector this actuator follows.
    pub axis_index: u8,

    /// What a halt signal does to integration.
    pub halt_policy: HaltPolicy,

    /// Integrated velocity below `-velocity_tolerance` is an integration fault (steps/sec).
    pub velocity_tolerance: f32,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            tick_period: Microseconds(crate::DEFAULT_TICK_PERIOD_US),
            start_delay: Milliseconds(crate::DEFAULT_START_DELAY_MS),
            microsteps: Microsteps::default(),
            axis_index: 0,
            halt_policy: HaltPolicy::default(),
            velocity_tolerance: crate::DEFAULT_VELOCITY_TOLERANCE,
        }
    }
}

impl AxisConfig {
    /// Configuration for the given tick period with everything else defaulted.
    pub fn with_tick_period(tick_period_us: u32) -> Self {
        Self {
            tick_period: Microseconds(tick_period_us),
            ..Self::default()
        }
    }

    /// Set the followed axis.
    pub fn axis(mut self, index: u8) -> Self {
        self.axis_index = index;
        self
    }

    /// Set the start delay.
    pub fn start_delay(mut self, delay: Milliseconds) -> Self {
        self.start_delay = delay;
        self
    }

    /// Set the halt policy.
    pub fn halt_policy(mut self, policy: HaltPolicy) -> Self {
        self.halt_policy = policy;
        self
    }

    /// Set the microstep setting.
    pub fn microsteps(mut self, microsteps: Microsteps) -> Self {
        self.microsteps = microsteps;
        self
    }
}
