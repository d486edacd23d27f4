//! Planned motion segments.

use crate::config::TickTiming;
use crate::error::{Error, MotionError, QueueError, Result};
use crate::MAX_AXES;

/// One planned, constant-acceleration motion leg along a fixed direction.
///
/// All kinematic quantities are in steps, steps/sec and steps/sec² along the
/// move. Each actuator projects the move onto its own axis through
/// `unit[axis_index]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Strictly increasing counter assigned by the coordinator.
    pub sequence: u32,

    /// End-of-stream hint.
    pub is_last: bool,

    /// Per-axis direction components.
    pub unit: [f32; MAX_AXES],

    /// Start velocity.
    pub vi: f32,

    /// Acceleration magnitude, used both for speeding up and braking.
    pub accel: f32,

    /// Ceiling velocity.
    pub vmax: f32,

    /// End velocity.
    pub vf: f32,

    /// Length of the leg.
    pub distance: f32,
}

impl Default for Segment {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Segment {
    /// All-zero segment, the contents of a fresh slot.
    pub const ZERO: Self = Self {
        sequence: 0,
        is_last: false,
        unit: [0.0; MAX_AXES],
        vi: 0.0,
        accel: 0.0,
        vmax: 0.0,
        vf: 0.0,
        distance: 0.0,
    };

    /// Start building a segment with the given sequence number.
    pub fn builder(sequence: u32) -> SegmentBuilder {
        SegmentBuilder::new(sequence)
    }

    /// Direction component for the given axis (0.0 when out of range).
    #[inline]
    pub fn projection(&self, axis: usize) -> f32 {
        self.unit.get(axis).copied().unwrap_or(0.0)
    }

    /// Admission check: the only payload rule the queue enforces.
    pub fn check_admissible(&self) -> core::result::Result<(), QueueError> {
        // NaN fails the comparison and is rejected with it
        if self.distance > 0.0 {
            Ok(())
        } else {
            Err(QueueError::NonPositiveDistance(self.distance))
        }
    }
}

/// Builder for host-side segment construction.
///
/// Unlike admission, which only rejects non-positive distances, the builder
/// checks the whole kinematic description so planners catch mistakes before a
/// segment reaches the wire.
#[derive(Debug, Clone)]
pub struct SegmentBuilder {
    segment: Segment,
    velocity_limit: Option<(TickTiming, bool)>,
}

impl SegmentBuilder {
    /// Create a new builder.
    pub fn new(sequence: u32) -> Self {
        Self {
            segment: Segment {
                sequence,
                ..Segment::ZERO
            },
            velocity_limit: None,
        }
    }

    /// Set the direction component for one axis. Out-of-range axes are ignored.
    pub fn axis(mut self, axis: usize, component: f32) -> Self {
        if let Some(c) = self.segment.unit.get_mut(axis) {
            *c = component;
        }
        self
    }

    /// Set the full direction vector.
    pub fn unit(mut self, unit: [f32; MAX_AXES]) -> Self {
        self.segment.unit = unit;
        self
    }

    /// Set start velocity.
    pub fn vi(mut self, vi: f32) -> Self {
        self.segment.vi = vi;
        self
    }

    /// Set end velocity.
    pub fn vf(mut self, vf: f32) -> Self {
        self.segment.vf = vf;
        self
    }

    /// Set ceiling velocity.
    pub fn vmax(mut self, vmax: f32) -> Self {
        self.segment.vmax = vmax;
        self
    }

    /// Set acceleration magnitude.
    pub fn accel(mut self, accel: f32) -> Self {
        self.segment.accel = accel;
        self
    }

    /// Set leg length.
    pub fn distance(mut self, distance: f32) -> Self {
        self.segment.distance = distance;
        self
    }

    /// Mark as the last segment of the stream.
    pub fn last(mut self, is_last: bool) -> Self {
        self.segment.is_last = is_last;
        self
    }

    /// Reject velocities the receiving actuator cannot represent.
    pub fn limit_velocity(mut self, timing: &TickTiming) -> Self {
        self.velocity_limit = Some((*timing, false));
        self
    }

    /// Scale velocities down to what the receiving actuator can represent.
    pub fn clamp_velocity(mut self, timing: &TickTiming) -> Self {
        self.velocity_limit = Some((*timing, true));
        self
    }

    /// Build the segment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - distance is not positive
    /// - acceleration is not positive
    /// - `vi` or `vf` lies outside `0..=vmax`
    /// - `vmax` exceeds the tick limit (when limited, not clamped)
    pub fn build(self) -> Result<Segment> {
        let mut s = self.segment;

        if let Some((timing, clamp)) = self.velocity_limit {
            if !timing.admits_velocity(s.vmax) {
                let max = timing.max_velocity;
                if !clamp {
                    return Err(Error::Motion(MotionError::VelocityExceedsTickLimit {
                        requested: s.vmax,
                        max,
                    }));
                }
                s.vmax = max;
                s.vi = s.vi.min(max);
                s.vf = s.vf.min(max);
            }
        }

        s.check_admissible()?;

        if !(s.accel > 0.0) {
            return Err(Error::Motion(MotionError::InvalidAcceleration(s.accel)));
        }

        for v in [s.vi, s.vf] {
            if !(v >= 0.0 && v <= s.vmax) {
                return Err(Error::Motion(MotionError::InvalidBoundaryVelocity {
                    velocity: v,
                    vmax: s.vmax,
                }));
            }
        }

        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::Microseconds;

    #[test]
    fn test_builder_happy_path() {
        let seg = Segment::builder(7)
            .axis(0, 1.0)
            .vi(0.0)
            .vf(0.0)
            .vmax(10.0)
            .accel(5.0)
            .distance(100.0)
            .last(true)
            .build()
            .unwrap();

        assert_eq!(seg.sequence, 7);
        assert!(seg.is_last);
        assert_eq!(seg.projection(0), 1.0);
        assert_eq!(seg.projection(1), 0.0);
        assert_eq!(seg.projection(MAX_AXES), 0.0);
    }

    #[test]
    fn test_builder_rejects_bad_kinematics() {
        let base = || Segment::builder(0).axis(0, 1.0).vmax(10.0).accel(5.0).distance(1.0);

        assert!(matches!(
            base().distance(0.0).build(),
            Err(Error::Queue(QueueError::NonPositiveDistance(_)))
        ));
        assert!(matches!(
            base().accel(0.0).build(),
            Err(Error::Motion(MotionError::InvalidAcceleration(_)))
        ));
        assert!(matches!(
            base().vf(11.0).build(),
            Err(Error::Motion(MotionError::InvalidBoundaryVelocity { .. }))
        ));
        assert!(matches!(
            base().vi(-1.0).build(),
            Err(Error::Motion(MotionError::InvalidBoundaryVelocity { .. }))
        ));
    }

    #[test]
    fn test_velocity_limit_and_clamp() {
        let timing = TickTiming::from_period(Microseconds(1000));
        let fast = || {
            Segment::builder(0)
                .axis(0, 1.0)
                .vi(1500.0)
                .vmax(2000.0)
                .accel(100.0)
                .distance(10.0)
        };

        assert!(matches!(
            fast().limit_velocity(&timing).build(),
            Err(Error::Motion(MotionError::VelocityExceedsTickLimit { .. }))
        ));

        let clamped = fast().clamp_velocity(&timing).build().unwrap();
        assert!(clamped.vmax <= timing.max_velocity);
        assert!(clamped.vi <= clamped.vmax);
    }

    #[test]
    fn test_admission_check() {
        let mut seg = Segment::ZERO;
        assert!(seg.check_admissible().is_err());
        seg.distance = f32::NAN;
        assert!(seg.check_admissible().is_err());
        seg.distance = 0.5;
        assert!(seg.check_admissible().is_ok());
    }
}
