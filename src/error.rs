//! Error types for segment-stepper.
//!
//! Provides unified error handling across configuration, segment admission,
//! integration, step output and the wire codec.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all segment-stepper operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Segment admission error
    Queue(QueueError),
    /// Integration or segment kinematics error
    Motion(MotionError),
    /// Step output error
    Motor(MotorError),
    /// Datagram encoding or decoding error
    Wire(WireError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Tick period must be at least one microsecond
    ZeroTickPeriod,
    /// Axis index does not address a component of the direction vector
    AxisIndexOutOfRange(u8),
    /// Velocity tolerance must be finite and > 0
    InvalidVelocityTolerance(f32),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Segment admission errors.
///
/// Both variants drop the incoming segment; the queue is left untouched.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// The producer slot still holds a segment that has not been retired
    QueueFull {
        /// Ring position of the occupied producer slot
        slot: usize,
    },
    /// Segment distance must be > 0
    NonPositiveDistance(f32),
}

/// Integration and segment kinematics errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Integrated velocity fell below the negative tolerance
    NegativeVelocity(f32),
    /// Segment ceiling velocity cannot be represented at the tick rate
    VelocityExceedsTickLimit {
        /// Requested velocity in steps/sec
        requested: f32,
        /// Maximum velocity in steps/sec (1 / dt)
        max: f32,
    },
    /// Segment acceleration must be > 0
    InvalidAcceleration(f32),
    /// Start or end velocity outside `0..=vmax`
    InvalidBoundaryVelocity {
        /// Offending velocity
        velocity: f32,
        /// Segment ceiling velocity
        vmax: f32,
    },
}

/// Step output errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Pin operation failed
    PinError,
}

/// Datagram encoding and decoding errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireError {
    /// Input shorter than the record layout
    Truncated {
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },
    /// Output buffer too small for the record
    BufferTooSmall {
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Queue(e) => write!(f, "Queue error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Wire(e) => write!(f, "Wire error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::ZeroTickPeriod => write!(f, "Tick period must be at least 1 us"),
            ConfigError::AxisIndexOutOfRange(i) => {
                write!(f, "Axis index {} out of range (max {})", i, crate::MAX_AXES - 1)
            }
            ConfigError::InvalidVelocityTolerance(v) => {
                write!(f, "Invalid velocity tolerance: {}. Must be > 0", v)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::QueueFull { slot } => write!(f, "Queue full: slot {} is still pending", slot),
            QueueError::NonPositiveDistance(d) => {
                write!(f, "Segment distance {} must be > 0", d)
            }
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::NegativeVelocity(v) => {
                write!(f, "Integrated velocity {} fell below tolerance", v)
            }
            MotionError::VelocityExceedsTickLimit { requested, max } => {
                write!(f, "Requested velocity {} exceeds tick limit {}", requested, max)
            }
            MotionError::InvalidAcceleration(a) => {
                write!(f, "Invalid acceleration: {}. Must be > 0", a)
            }
            MotionError::InvalidBoundaryVelocity { velocity, vmax } => {
                write!(f, "Boundary velocity {} outside [0, {}]", velocity, vmax)
            }
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
        }
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Truncated { expected, actual } => {
                write!(f, "Datagram truncated: need {} bytes, got {}", expected, actual)
            }
            WireError::BufferTooSmall { expected, actual } => {
                write!(f, "Output buffer too small: need {} bytes, got {}", expected, actual)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<QueueError> for Error {
    fn from(e: QueueError) -> Self {
        Error::Queue(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<WireError> for Error {
    fn from(e: WireError) -> Self {
        Error::Wire(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for QueueError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for WireError {}
