//! Halt signalling.
//!
//! Every protocol violation detected by the queue or the integrator is funnelled
//! through a single [`HaltHandler`]. The handler decides whether a cause stops
//! integration. [`HaltLatch`] is the stock implementation.

use serde::Deserialize;

/// Named reason for a halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HaltCause {
    /// Operator-requested stop.
    SoftStop,
    /// Halt propagated from another actuator.
    Cascade,
    /// A new acknowledgement overwrote one the transport never drained.
    AckNotPicked,
    /// A new completion message overwrote one the transport never drained.
    CompletionNotPicked,
    /// The queue ran dry before a segment flagged as last.
    BufferStarved,
    /// A segment arrived with an unexpected sequence number.
    OutOfOrderArrival,
}

impl HaltCause {
    /// Number of distinct causes.
    pub const COUNT: usize = 6;

    /// All causes, in code order.
    pub const ALL: [HaltCause; Self::COUNT] = [
        HaltCause::SoftStop,
        HaltCause::Cascade,
        HaltCause::AckNotPicked,
        HaltCause::CompletionNotPicked,
        HaltCause::BufferStarved,
        HaltCause::OutOfOrderArrival,
    ];

    /// Numeric code used on the wire and in logs.
    pub const fn code(self) -> u8 {
        match self {
            HaltCause::SoftStop => 1,
            HaltCause::Cascade => 3,
            HaltCause::AckNotPicked => 4,
            HaltCause::CompletionNotPicked => 5,
            HaltCause::BufferStarved => 6,
            HaltCause::OutOfOrderArrival => 7,
        }
    }

    /// Inverse of [`HaltCause::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    const fn index(self) -> usize {
        match self {
            HaltCause::SoftStop => 0,
            HaltCause::Cascade => 1,
            HaltCause::AckNotPicked => 2,
            HaltCause::CompletionNotPicked => 3,
            HaltCause::BufferStarved => 4,
            HaltCause::OutOfOrderArrival => 5,
        }
    }
}

/// What a [`HaltLatch`] does with a cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum HaltPolicy {
    /// Latch the first cause and block integration until cleared.
    #[default]
    Latch,
    /// Log and count causes; integration continues.
    Advisory,
}

/// Receiver of halt signals.
///
/// Called from both the ingestion path and the tick, always inside the
/// queue's exclusive window. Implementations must not block.
pub trait HaltHandler {
    /// Signal a halt.
    fn halt(&mut self, cause: HaltCause);

    /// Whether integration is currently blocked.
    fn is_latched(&self) -> bool {
        false
    }

    /// Release a latched halt.
    fn clear(&mut self) {}
}

/// Stock halt handler: counts every cause and optionally latches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaltLatch {
    policy: HaltPolicy,
    latched: Option<HaltCause>,
    counts: [u32; HaltCause::COUNT],
}

impl Default for HaltLatch {
    fn default() -> Self {
        Self::new(HaltPolicy::default())
    }
}

impl HaltLatch {
    /// Create a handler with the given policy.
    pub const fn new(policy: HaltPolicy) -> Self {
        Self {
            policy,
            latched: None,
            counts: [0; HaltCause::COUNT],
        }
    }

    /// The configured policy.
    #[inline]
    pub fn policy(&self) -> HaltPolicy {
        self.policy
    }

    /// The cause that latched, if any.
    #[inline]
    pub fn latched_cause(&self) -> Option<HaltCause> {
        self.latched
    }

    /// How many times a cause has been signalled since creation.
    #[inline]
    pub fn count(&self, cause: HaltCause) -> u32 {
        self.counts[cause.index()]
    }

    /// Total number of halt signals since creation.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

impl HaltHandler for HaltLatch {
    fn halt(&mut self, cause: HaltCause) {
        let slot = &mut self.counts[cause.index()];
        *slot = slot.saturating_add(1);

        match self.policy {
            HaltPolicy::Latch => {
                if self.latched.is_none() {
                    warn!("halt latched: {:?} (code {})", cause, cause.code());
                    self.latched = Some(cause);
                } else {
                    warn!("halt while latched: {:?}", cause);
                }
            }
            HaltPolicy::Advisory => {
                warn!("halt (advisory): {:?} (code {})", cause, cause.code());
            }
        }
    }

    fn is_latched(&self) -> bool {
        self.latched.is_some()
    }

    fn clear(&mut self) {
        if let Some(cause) = self.latched.take() {
            info!("halt cleared: {:?}", cause);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_keeps_first_cause() {
        let mut latch = HaltLatch::new(HaltPolicy::Latch);
        assert!(!latch.is_latched());

        latch.halt(HaltCause::OutOfOrderArrival);
        latch.halt(HaltCause::CompletionNotPicked);

        assert!(latch.is_latched());
        assert_eq!(latch.latched_cause(), Some(HaltCause::OutOfOrderArrival));
        assert_eq!(latch.count(HaltCause::OutOfOrderArrival), 1);
        assert_eq!(latch.count(HaltCause::CompletionNotPicked), 1);
        assert_eq!(latch.total(), 2);

        latch.clear();
        assert!(!latch.is_latched());
        // counters survive clearing
        assert_eq!(latch.total(), 2);
    }

    #[test]
    fn test_advisory_never_latches() {
        let mut latch = HaltLatch::new(HaltPolicy::Advisory);
        latch.halt(HaltCause::SoftStop);
        latch.halt(HaltCause::SoftStop);

        assert!(!latch.is_latched());
        assert_eq!(latch.count(HaltCause::SoftStop), 2);
    }

    #[test]
    fn test_cause_codes_round_trip() {
        for cause in HaltCause::ALL {
            assert_eq!(HaltCause::from_code(cause.code()), Some(cause));
        }
        assert_eq!(HaltCause::from_code(0), None);
        assert_eq!(HaltCause::from_code(2), None);
    }
}
