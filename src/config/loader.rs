//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::AxisConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
///
/// # Example
///
/// ```rust,ignore
/// use segment_stepper::load_config;
///
/// let config = load_config("axis.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AxisConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = truncated(&e.to_string());
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<AxisConfig> {
    let config: AxisConfig = toml::from_str(content).map_err(|e| {
        let msg = truncated(e.message());
        Error::Config(ConfigError::ParseError(msg))
    })?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

// Keeps as much of the message as fits instead of dropping it entirely.
fn truncated(msg: &str) -> heapless::String<128> {
    let mut out = heapless::String::new();
    for c in msg.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Microseconds, Milliseconds, Microsteps};
    use crate::halt::HaltPolicy;

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config, AxisConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
tick_period_us = 1000
start_delay_ms = 250
microsteps = 16
axis_index = 2
halt_policy = "advisory"
velocity_tolerance = 0.5
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.tick_period, Microseconds(1000));
        assert_eq!(config.start_delay, Milliseconds(250));
        assert_eq!(config.microsteps, Microsteps::SIXTEENTH);
        assert_eq!(config.axis_index, 2);
        assert_eq!(config.halt_policy, HaltPolicy::Advisory);
        assert!((config.velocity_tolerance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_parse_rejects_bad_microsteps() {
        let result = parse_config("microsteps = 12");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_parse_runs_validation() {
        let result = parse_config("axis_index = 9");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::AxisIndexOutOfRange(9)))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/axis.toml");
        assert!(matches!(result, Err(Error::Config(ConfigError::IoError(_)))));
    }
}
