//! Segment queue.
//!
//! Fixed-capacity ring of planned segments, ingestion with sequence checking,
//! and the two single-slot outbound mailboxes.

mod message;
mod segment;
mod shared;
mod store;

pub use message::{Message, MessageSlot};
pub use segment::{Segment, SegmentBuilder};
pub use shared::{Admission, SegmentQueue};
pub use store::{SegmentStore, Slot};
