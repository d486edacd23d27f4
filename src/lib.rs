//! # segment-stepper
//!
//! Segment-queue motion core for one stepper axis, with embedded-hal 1.0 support.
//!
//! A host coordinator streams numbered, pre-planned constant-acceleration
//! segments to every actuator. Each actuator queues them, integrates the
//! current one once per fixed tick, projects the move onto its own axis and
//! turns the displacement into step pulses.
//!
//! ## Features
//!
//! - **Fixed-capacity ring**: no allocation, no blocking, safe to tick from an interrupt
//! - **Ordered delivery**: sequence checking, acknowledgements and completion messages
//! - **Greedy trapezoid**: braking recomputed every tick, overshoot carried across segments
//! - **Substitutable halts**: every protocol fault goes through one [`HaltHandler`]
//! - **no_std compatible**: core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use segment_stepper::{AxisConfig, Integrator, PinStepDriver, SegmentQueue, HaltLatch, HaltPolicy};
//!
//! static QUEUE: SegmentQueue = SegmentQueue::new(HaltLatch::new(HaltPolicy::Latch));
//!
//! // At init, owned by the tick interrupt
//! let config = AxisConfig::with_tick_period(250).axis(0);
//! let mut integrator = Integrator::new(&config, PinStepDriver::new(step, dir, delay))?;
//!
//! // Tick interrupt, every 250 us
//! let _ = integrator.tick(&QUEUE);
//!
//! // Mainline
//! QUEUE.admit(&segment_stepper::wire::decode_segment(&datagram)?)?;
//! if let Some(ack) = QUEUE.drain_ack() { transport.send(&ack); }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt logging for embedded targets
//! - `log`: Enables logging through the `log` facade
//!
//! ## Critical sections
//!
//! The queue is guarded by the [`critical-section`](https://docs.rs/critical-section)
//! crate, which needs exactly one implementation linked into the final binary.
//! On targets that comes from the HAL or the architecture crate
//! (for example `cortex-m` with `critical-section-single-core`). Host
//! binaries enable `critical-section/std` themselves.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first so the logging macros are visible to the other modules
#[macro_use]
mod fmt;

// Core modules
pub mod actuator;
pub mod config;
pub mod error;
pub mod halt;
pub mod motion;
pub mod motor;
pub mod queue;
pub mod wire;

/// Number of direction components carried by every segment.
pub const MAX_AXES: usize = 7;

/// Ring slots per actuator.
pub const QUEUE_CAPACITY: usize = 32;

/// Bytes per outbound message buffer.
pub const MESSAGE_CAPACITY: usize = 32;

/// Grace period between the first queued segment and the start of motion.
pub const DEFAULT_START_DELAY_MS: u32 = 500;

/// Default microstep setting.
pub const DEFAULT_MICROSTEPS: u16 = 4;

/// Default tick period.
pub const DEFAULT_TICK_PERIOD_US: u32 = 250;

/// Default negative-velocity tolerance in steps/sec.
pub const DEFAULT_VELOCITY_TOLERANCE: f32 = 1.0;

// Re-exports for ergonomic API
pub use actuator::Actuator;
pub use config::{validate_config, AxisConfig, TickTiming};
pub use error::{Error, Result};
pub use halt::{HaltCause, HaltHandler, HaltLatch, HaltPolicy};
pub use motion::{AxisState, Direction, Integrator, Mode, QueueState, TickOutcome};
pub use motor::{PinStepDriver, StepDriver};
pub use queue::{Admission, Message, Segment, SegmentBuilder, SegmentQueue};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Instant, Microseconds, Milliseconds, Microsteps};
