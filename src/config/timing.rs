//! Tick timing derived from axis configuration.

use super::axis::AxisConfig;
use super::units::Microseconds;

/// Derived integration constants.
///
/// Computed once at initialization and fixed for the lifetime of the integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickTiming {
    /// Tick period.
    pub period: Microseconds,

    /// Tick period in seconds (Δt).
    pub dt: f32,

    /// Largest velocity that advances at most one step per tick (1 / Δt), in steps/sec.
    pub max_velocity: f32,
}

impl TickTiming {
    /// Compute timing from a tick period in microseconds.
    ///
    /// A zero period is treated as one microsecond; configuration validation
    /// rejects it before it gets here.
    pub fn from_period(period: Microseconds) -> Self {
        let period = Microseconds(period.0.max(1));
        let dt = period.to_secs();
        Self {
            period,
            dt,
            max_velocity: 1.0 / dt,
        }
    }

    /// Compute timing from axis configuration.
    pub fn from_config(config: &AxisConfig) -> Self {
        Self::from_period(config.tick_period)
    }

    /// Check whether a velocity can be represented at this tick rate.
    #[inline]
    pub fn admits_velocity(&self, velocity: f32) -> bool {
        velocity <= self.max_velocity
    }
}
