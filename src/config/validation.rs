//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::AxisConfig;

/// Validate an axis configuration.
///
/// Checks:
/// - Tick period is at least one microsecond
/// - Axis index addresses a direction vector component
/// - Velocity tolerance is finite and positive
///
/// Microsteps are validated when the value is constructed.
pub fn validate_config(config: &AxisConfig) -> Result<()> {
    if config.tick_period.value() == 0 {
        return Err(Error::Config(ConfigError::ZeroTickPeriod));
    }

    if config.axis_index as usize >= crate::MAX_AXES {
        return Err(Error::Config(ConfigError::AxisIndexOutOfRange(
            config.axis_index,
        )));
    }

    // NaN fails both comparisons
    if !(config.velocity_tolerance > 0.0 && config.velocity_tolerance.is_finite()) {
        return Err(Error::Config(ConfigError::InvalidVelocityTolerance(
            config.velocity_tolerance,
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::Microseconds;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AxisConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_tick_period() {
        let config = AxisConfig {
            tick_period: Microseconds(0),
            ..AxisConfig::default()
        };

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::ZeroTickPeriod))
        ));
    }

    #[test]
    fn test_axis_index_out_of_range() {
        let config = AxisConfig::default().axis(7);

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::AxisIndexOutOfRange(7)))
        ));
        assert!(validate_config(&AxisConfig::default().axis(6)).is_ok());
    }

    #[test]
    fn test_velocity_tolerance() {
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = AxisConfig {
                velocity_tolerance: bad,
                ..AxisConfig::default()
            };
            assert!(validate_config(&config).is_err(), "{} should be rejected", bad);
        }
    }
}
