//! Configuration module for segment-stepper.
//!
//! Provides the axis configuration, the tick timing derived from it, and
//! TOML loading (with `std` feature).

mod axis;
#[cfg(feature = "std")]
mod loader;
mod timing;
pub mod units;
mod validation;

pub use axis::AxisConfig;
pub use timing::TickTiming;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Instant, Microseconds, Milliseconds, Microsteps};
