//! Unit types for configuration quantities.
//!
//! Durations are kept as distinct newtypes so a tick period in microseconds
//! can never be mistaken for a start delay in milliseconds.

use core::ops::Add;

use serde::Deserialize;

use crate::error::ConfigError;

/// Duration in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Microseconds(pub u32);

impl Microseconds {
    /// Create a new Microseconds value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Convert to seconds.
    #[inline]
    pub fn to_secs(self) -> f32 {
        self.0 as f32 / 1_000_000.0
    }
}

/// Duration in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Milliseconds(pub u32);

impl Milliseconds {
    /// Create a new Milliseconds value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Convert to microseconds on the 64-bit tick clock.
    #[inline]
    pub const fn as_micros(self) -> u64 {
        self.0 as u64 * 1000
    }
}

/// Point on the monotonic tick clock, in microseconds since init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant(pub u64);

impl Instant {
    /// Microseconds since init.
    #[inline]
    pub const fn micros(self) -> u64 {
        self.0
    }
}

impl Add<Milliseconds> for Instant {
    type Output = Self;

    fn add(self, rhs: Milliseconds) -> Self::Output {
        Self(self.0.saturating_add(rhs.as_micros()))
    }
}

/// Microstep setting handed to the step driver with every pulse.
///
/// Validated at construction to be a power of 2 within the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Microsteps(u16);

impl Microsteps {
    /// Full step (no microstepping).
    pub const FULL: Self = Self(1);
    /// Half step.
    pub const HALF: Self = Self(2);
    /// Quarter step.
    pub const QUARTER: Self = Self(4);
    /// Eighth step.
    pub const EIGHTH: Self = Self(8);
    /// Sixteenth step.
    pub const SIXTEENTH: Self = Self(16);
    /// Thirty-second step.
    pub const THIRTY_SECOND: Self = Self(32);
    /// Sixty-fourth step.
    pub const SIXTY_FOURTH: Self = Self(64);
    /// 128th step.
    pub const ONE_TWENTY_EIGHTH: Self = Self(128);
    /// 256th step (maximum resolution).
    pub const TWO_FIFTY_SIXTH: Self = Self(256);

    /// Valid microstep values.
    const VALID_VALUES: [u16; 9] = [1, 2, 4, 8, 16, 32, 64, 128, 256];

    /// Create a new Microsteps value with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMicrosteps` if the value is not a valid power of 2.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        if Self::is_valid(value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidMicrosteps(value))
        }
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Check if a value is valid.
    #[inline]
    pub fn is_valid(value: u16) -> bool {
        Self::VALID_VALUES.contains(&value)
    }
}

impl Default for Microsteps {
    fn default() -> Self {
        Self(crate::DEFAULT_MICROSTEPS)
    }
}

impl TryFrom<u16> for Microsteps {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Microsteps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u16::deserialize(deserializer)?;
        Microsteps::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}
