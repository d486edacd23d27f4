//! The segment queue shared between ingestion and the tick.
//!
//! Everything the two contexts both touch lives behind one
//! `critical_section::Mutex`: ring positions, slot flags and payloads, the
//! sequence counter, both outbound mailboxes, the published axis state and the
//! halt handler. Each operation holds the window only for its bookkeeping.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::error::{QueueError, Result};
use crate::halt::{HaltCause, HaltHandler, HaltLatch};
use crate::motion::{AxisState, Mode};
use crate::wire;
use crate::QUEUE_CAPACITY;

use super::message::{Message, MessageSlot};
use super::segment::Segment;
use super::store::SegmentStore;

/// Outcome of a successful admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Admission {
    /// Ring position the segment was written to.
    pub slot: usize,
    /// Whether the sequence number matched the expected one.
    pub in_order: bool,
    /// Free slots left after this admission.
    pub free: usize,
}

/// What the tick sees of the consumer slot.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConsumerView {
    pub latched: bool,
    pub segment: Option<Segment>,
    /// Bumped by every [`SegmentQueue::reset`].
    pub epoch: u32,
}

/// Result of retiring the consumer slot.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Retirement {
    pub retired: Option<Segment>,
    pub successor_ready: bool,
}

#[derive(Debug)]
struct Inner<H> {
    store: SegmentStore<QUEUE_CAPACITY>,
    expected: u32,
    mode: Mode,
    ack: MessageSlot,
    completion: MessageSlot,
    state: AxisState,
    epoch: u32,
    halt: H,
}

impl<H: HaltHandler> Inner<H> {
    fn signal(&mut self, cause: HaltCause) {
        self.halt.halt(cause);
    }
}

/// Segment queue with its protocol state.
///
/// `Sync`, so it can live in a `static` and be reached from the tick
/// interrupt and the mainline at once.
pub struct SegmentQueue<H = HaltLatch> {
    inner: Mutex<RefCell<Inner<H>>>,
}

impl Default for SegmentQueue<HaltLatch> {
    fn default() -> Self {
        Self::new(HaltLatch::new(crate::halt::HaltPolicy::Latch))
    }
}

impl<H: HaltHandler> SegmentQueue<H> {
    /// Create an empty queue around a halt handler.
    pub const fn new(halt: H) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                store: SegmentStore::new(),
                expected: 0,
                mode: Mode::Idle,
                ack: MessageSlot::new(),
                completion: MessageSlot::new(),
                state: AxisState::INITIAL,
                epoch: 0,
                halt,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner<H>) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.inner.borrow_ref_mut(cs)))
    }

    /// Drop every queued segment and pending message and rewind the ring.
    ///
    /// The halt handler and its latch are left alone. The integrator notices
    /// the reset on its next tick and drops whatever leg it was running, even
    /// if new segments were admitted in between.
    pub fn reset(&self) {
        self.with(|q| {
            q.store.reset();
            q.expected = 0;
            q.mode = Mode::Idle;
            q.ack = MessageSlot::new();
            q.completion = MessageSlot::new();
            q.state = AxisState::INITIAL;
            q.epoch = q.epoch.wrapping_add(1);
        });
    }

    /// Number of ring slots.
    pub fn capacity(&self) -> usize {
        QUEUE_CAPACITY
    }

    /// Admit a segment at the producer position.
    ///
    /// A sequence number other than the expected one signals
    /// [`HaltCause::OutOfOrderArrival`] and the segment is admitted anyway; the
    /// expected counter only advances on a match. A successful admission
    /// writes an acknowledgement and switches the axis to [`Mode::Queue`].
    ///
    /// # Errors
    ///
    /// The segment is dropped and the queue left untouched if:
    /// - the producer slot is still pending (`QueueFull`)
    /// - `distance <= 0` (`NonPositiveDistance`)
    pub fn admit(&self, segment: &Segment) -> Result<Admission> {
        let admission = self.with(|q| {
            if !q.store.has_space() {
                return Err(QueueError::QueueFull {
                    slot: q.store.head(),
                });
            }
            segment.check_admissible()?;

            let in_order = segment.sequence == q.expected;
            if in_order {
                q.expected = q.expected.wrapping_add(1);
            } else {
                q.signal(HaltCause::OutOfOrderArrival);
            }

            let slot = match q.store.push(segment) {
                Some(slot) => slot,
                None => return Err(QueueError::QueueFull { slot: q.store.head() }),
            };
            q.mode = Mode::Queue;
            q.state.mode = Mode::Queue;

            let free = q.store.free();
            let ack = wire::encode_ack(segment.sequence, free);
            if q.ack.write(&ack) {
                q.signal(HaltCause::AckNotPicked);
            }

            Ok(Admission {
                slot,
                in_order,
                free,
            })
        });

        match admission {
            Ok(a) => {
                debug!(
                    "admitted segment {} into slot {} ({} free)",
                    segment.sequence,
                    a.slot,
                    a.free
                );
                if !a.in_order {
                    warn!("segment {} arrived out of order", segment.sequence);
                }
                Ok(a)
            }
            Err(e) => {
                warn!("dropped segment {}: {}", segment.sequence, e);
                Err(e.into())
            }
        }
    }

    /// Whether the producer slot can take another segment.
    pub fn has_space(&self) -> bool {
        self.with(|q| q.store.has_space())
    }

    /// Admitted segments not yet retired.
    pub fn pending(&self) -> usize {
        self.with(|q| q.store.pending())
    }

    /// Sequence number the next segment should carry.
    pub fn expected_sequence(&self) -> u32 {
        self.with(|q| q.expected)
    }

    /// Active mode.
    pub fn mode(&self) -> Mode {
        self.with(|q| q.mode)
    }

    /// Take the pending acknowledgement, if any.
    pub fn drain_ack(&self) -> Option<Message> {
        self.with(|q| q.ack.drain())
    }

    /// Take the pending completion message, if any.
    pub fn drain_completion(&self) -> Option<Message> {
        self.with(|q| q.completion.drain())
    }

    /// Snapshot of position, velocity and acceleration as of the last tick.
    pub fn state(&self) -> AxisState {
        self.with(|q| q.state)
    }

    /// Signal a halt from outside the core (soft stop, cascade).
    pub fn halt(&self, cause: HaltCause) {
        self.with(|q| q.signal(cause));
    }

    /// Release a latched halt.
    pub fn clear_halt(&self) {
        self.with(|q| q.halt.clear());
    }

    /// Whether integration is currently blocked by a halt.
    pub fn is_halted(&self) -> bool {
        self.with(|q| q.halt.is_latched())
    }

    /// Inspect the halt handler.
    pub fn inspect_halt<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        self.with(|q| f(&q.halt))
    }

    /// Read the consumer slot for this tick, optionally claiming it as running.
    pub(crate) fn consumer(&self, claim: bool) -> ConsumerView {
        self.with(|q| {
            let latched = q.halt.is_latched();
            let slot = q.store.tail_slot();
            let segment = slot.ready.then_some(slot.segment);
            if claim && segment.is_some() && !latched {
                q.store.mark_running();
            }
            ConsumerView {
                latched,
                segment,
                epoch: q.epoch,
            }
        })
    }

    /// Retire the consumer slot, post its completion and claim the successor.
    pub(crate) fn retire(&self) -> Retirement {
        self.with(|q| {
            let retired = q.store.retire();
            if let Some(seg) = retired {
                let msg = wire::encode_completion(seg.sequence);
                if q.completion.write(&msg) {
                    q.signal(HaltCause::CompletionNotPicked);
                }
            }

            let successor_ready = q.store.mark_running();
            if !successor_ready && retired.map_or(false, |s| !s.is_last) {
                q.signal(HaltCause::BufferStarved);
            }

            Retirement {
                retired,
                successor_ready,
            }
        })
    }

    /// Publish the tick's kinematic state for external queries.
    pub(crate) fn publish(&self, state: AxisState) {
        self.with(|q| {
            q.state = AxisState {
                mode: q.mode,
                ..state
            };
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::halt::HaltPolicy;

    fn seg(sequence: u32) -> Segment {
        Segment {
            sequence,
            distance: 10.0,
            accel: 1.0,
            vmax: 1.0,
            ..Segment::ZERO
        }
    }

    fn advisory() -> SegmentQueue {
        SegmentQueue::new(HaltLatch::new(HaltPolicy::Advisory))
    }

    #[test]
    fn test_admit_sets_mode_and_ack() {
        let queue = SegmentQueue::default();
        assert_eq!(queue.mode(), Mode::Idle);

        let a = queue.admit(&seg(0)).unwrap();
        assert_eq!(a.slot, 0);
        assert!(a.in_order);
        assert_eq!(a.free, QUEUE_CAPACITY - 1);
        assert_eq!(queue.mode(), Mode::Queue);
        assert_eq!(queue.state().mode, Mode::Queue);

        let ack = queue.drain_ack().unwrap();
        assert_eq!(wire::decode_ack(&ack).unwrap(), (0, QUEUE_CAPACITY - 1));
        assert!(queue.drain_ack().is_none());
    }

    #[test]
    fn test_non_positive_distance_dropped() {
        let queue = SegmentQueue::default();
        let mut bad = seg(0);
        bad.distance = 0.0;

        assert!(matches!(
            queue.admit(&bad),
            Err(Error::Queue(QueueError::NonPositiveDistance(_)))
        ));
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.expected_sequence(), 0);
        assert!(queue.drain_ack().is_none());
        assert_eq!(queue.mode(), Mode::Idle);
    }

    #[test]
    fn test_full_queue_does_not_corrupt_pending_slot() {
        let queue = advisory();
        for n in 0..QUEUE_CAPACITY as u32 {
            queue.admit(&seg(n)).unwrap();
            queue.drain_ack();
        }
        assert!(!queue.has_space());

        let mut intruder = seg(QUEUE_CAPACITY as u32);
        intruder.distance = 99.0;
        assert!(matches!(
            queue.admit(&intruder),
            Err(Error::Queue(QueueError::QueueFull { slot: 0 }))
        ));

        let view = queue.consumer(false);
        let head = view.segment.unwrap();
        assert_eq!(head.sequence, 0);
        assert_eq!(head.distance, 10.0);
        assert_eq!(queue.expected_sequence(), QUEUE_CAPACITY as u32);
    }

    #[test]
    fn test_undrained_ack_signals_halt() {
        let queue = advisory();
        queue.admit(&seg(0)).unwrap();
        queue.admit(&seg(1)).unwrap();

        assert_eq!(queue.inspect_halt(|h| h.count(HaltCause::AckNotPicked)), 1);
        let ack = queue.drain_ack().unwrap();
        assert_eq!(wire::decode_ack(&ack).unwrap().0, 1);
    }

    #[test]
    fn test_retire_posts_completion_and_detects_starvation() {
        let queue = advisory();
        queue.admit(&seg(0)).unwrap();

        let view = queue.consumer(true);
        assert!(!view.latched);
        assert!(view.segment.is_some());

        let r = queue.retire();
        assert_eq!(r.retired.map(|s| s.sequence), Some(0));
        assert!(!r.successor_ready);
        assert_eq!(queue.inspect_halt(|h| h.count(HaltCause::BufferStarved)), 1);

        let msg = queue.drain_completion().unwrap();
        assert_eq!(wire::decode_completion(&msg).unwrap(), 0);
    }

    #[test]
    fn test_last_segment_drains_without_starvation() {
        let queue = advisory();
        let mut last = seg(0);
        last.is_last = true;
        queue.admit(&last).unwrap();
        let r = queue.retire();
        assert!(!r.successor_ready);
        assert_eq!(queue.inspect_halt(|h| h.total()), 0);
    }

    #[test]
    fn test_latched_halt_blocks_claim() {
        let queue = SegmentQueue::default();
        queue.admit(&seg(0)).unwrap();
        queue.halt(HaltCause::SoftStop);

        let view = queue.consumer(true);
        assert!(view.latched);
        assert!(queue.is_halted());

        queue.clear_halt();
        assert!(!queue.is_halted());
        assert!(!queue.consumer(false).latched);
    }

    #[test]
    fn test_reset_rewinds() {
        let queue = advisory();
        queue.admit(&seg(0)).unwrap();
        queue.reset();
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.expected_sequence(), 0);
        assert!(queue.drain_ack().is_none());
        assert_eq!(queue.mode(), Mode::Idle);
    }

    #[test]
    fn test_reset_advances_epoch() {
        let queue = advisory();
        let before = queue.consumer(false).epoch;
        queue.reset();
        queue.admit(&seg(0)).unwrap();
        let view = queue.consumer(false);
        assert_ne!(view.epoch, before);
        assert_eq!(view.segment.map(|s| s.sequence), Some(0));
    }
}
