//! Motion module for segment-stepper.
//!
//! Provides the tick integrator, step accumulation and the reported axis state.

mod integrator;
mod position;
mod state;

pub use integrator::{Integrator, TickOutcome};
pub use position::Position;
pub use state::{AxisState, Direction, Mode, QueueState};
