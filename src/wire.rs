//! Byte layouts exchanged with the transport.
//!
//! All records are packed little-endian with no framing; the transport
//! delivers one record per datagram.
//!
//! | Record      | Layout                                                              |
//! |-------------|---------------------------------------------------------------------|
//! | segment     | `u32` seq, `u8` last, 7 × `f32` unit, `f32` vi, accel, vmax, vf, distance |
//! | ack         | `u32` seq, `u8` free slots                                          |
//! | completion  | `u32` seq                                                           |
//! | state       | `f32` position, velocity, acceleration                              |

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Result, WireError};
use crate::motion::AxisState;
use crate::queue::Segment;
use crate::MAX_AXES;

/// Length of an encoded segment.
pub const SEGMENT_LEN: usize = 4 + 1 + 4 * MAX_AXES + 4 * 5;
/// Length of an encoded acknowledgement.
pub const ACK_LEN: usize = 5;
/// Length of an encoded completion message.
pub const COMPLETION_LEN: usize = 4;
/// Length of an encoded state report.
pub const STATE_LEN: usize = 12;

// Segment field offsets
const LAST_AT: usize = 4;
const UNIT_AT: usize = 5;
const KINEMATICS_AT: usize = UNIT_AT + 4 * MAX_AXES;

fn check_len(bytes: &[u8], expected: usize) -> core::result::Result<(), WireError> {
    if bytes.len() < expected {
        Err(WireError::Truncated {
            expected,
            actual: bytes.len(),
        })
    } else {
        Ok(())
    }
}

#[inline]
fn f32_at(bytes: &[u8], at: usize) -> f32 {
    LittleEndian::read_f32(&bytes[at..at + 4])
}

/// Decode a segment datagram. Trailing bytes are ignored.
///
/// The last flag is true for any non-zero byte.
pub fn decode_segment(bytes: &[u8]) -> Result<Segment> {
    check_len(bytes, SEGMENT_LEN)?;

    let mut unit = [0.0f32; MAX_AXES];
    LittleEndian::read_f32_into(&bytes[UNIT_AT..KINEMATICS_AT], &mut unit);

    Ok(Segment {
        sequence: LittleEndian::read_u32(&bytes[..4]),
        is_last: bytes[LAST_AT] != 0,
        unit,
        vi: f32_at(bytes, KINEMATICS_AT),
        accel: f32_at(bytes, KINEMATICS_AT + 4),
        vmax: f32_at(bytes, KINEMATICS_AT + 8),
        vf: f32_at(bytes, KINEMATICS_AT + 12),
        distance: f32_at(bytes, KINEMATICS_AT + 16),
    })
}

/// Encode a segment into `buf`, returning the bytes written.
pub fn encode_segment(segment: &Segment, buf: &mut [u8]) -> Result<usize> {
    if buf.len() < SEGMENT_LEN {
        return Err(WireError::BufferTooSmall {
            expected: SEGMENT_LEN,
            actual: buf.len(),
        }
        .into());
    }

    LittleEndian::write_u32(&mut buf[..4], segment.sequence);
    buf[LAST_AT] = u8::from(segment.is_last);
    LittleEndian::write_f32_into(&segment.unit, &mut buf[UNIT_AT..KINEMATICS_AT]);
    LittleEndian::write_f32_into(
        &[segment.vi, segment.accel, segment.vmax, segment.vf, segment.distance],
        &mut buf[KINEMATICS_AT..SEGMENT_LEN],
    );
    Ok(SEGMENT_LEN)
}

/// Acknowledgement for an admitted segment.
///
/// `free` saturates at 255.
pub fn encode_ack(sequence: u32, free: usize) -> [u8; ACK_LEN] {
    let mut out = [0u8; ACK_LEN];
    LittleEndian::write_u32(&mut out[..4], sequence);
    out[4] = u8::try_from(free).unwrap_or(u8::MAX);
    out
}

/// Decode an acknowledgement into `(sequence, free slots)`.
pub fn decode_ack(bytes: &[u8]) -> Result<(u32, usize)> {
    check_len(bytes, ACK_LEN)?;
    Ok((LittleEndian::read_u32(&bytes[..4]), usize::from(bytes[4])))
}

/// Completion message for a retired segment.
pub fn encode_completion(sequence: u32) -> [u8; COMPLETION_LEN] {
    let mut out = [0u8; COMPLETION_LEN];
    LittleEndian::write_u32(&mut out, sequence);
    out
}

/// Decode a completion message into the retired sequence number.
pub fn decode_completion(bytes: &[u8]) -> Result<u32> {
    check_len(bytes, COMPLETION_LEN)?;
    Ok(LittleEndian::read_u32(&bytes[..COMPLETION_LEN]))
}

/// State query response.
pub fn encode_state(state: &AxisState) -> [u8; STATE_LEN] {
    let mut out = [0u8; STATE_LEN];
    LittleEndian::write_f32_into(
        &[state.position, state.velocity, state.acceleration],
        &mut out,
    );
    out
}

/// Decode a state query response into `(position, velocity, acceleration)`.
pub fn decode_state(bytes: &[u8]) -> Result<(f32, f32, f32)> {
    check_len(bytes, STATE_LEN)?;
    Ok((f32_at(bytes, 0), f32_at(bytes, 4), f32_at(bytes, 8)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_segment_layout() {
        assert_eq!(SEGMENT_LEN, 53);

        let seg = Segment::builder(0x0102_0304)
            .axis(0, 1.0)
            .axis(6, -0.5)
            .vi(1.0)
            .vmax(8.0)
            .accel(2.0)
            .distance(3.5)
            .last(true)
            .build()
            .unwrap();

        let mut buf = [0u8; 64];
        assert_eq!(encode_segment(&seg, &mut buf).unwrap(), SEGMENT_LEN);
        assert_eq!(&buf[..5], &[0x04, 0x03, 0x02, 0x01, 1]);
        assert_eq!(&buf[5..9], &1.0f32.to_le_bytes());
        assert_eq!(&buf[49..53], &3.5f32.to_le_bytes());

        assert_eq!(decode_segment(&buf).unwrap(), seg);
    }

    #[test]
    fn test_truncated_segment() {
        let buf = [0u8; SEGMENT_LEN - 1];
        assert_eq!(
            decode_segment(&buf),
            Err(Error::Wire(WireError::Truncated {
                expected: SEGMENT_LEN,
                actual: SEGMENT_LEN - 1
            }))
        );
    }

    #[test]
    fn test_small_output_buffer() {
        let mut buf = [0u8; 10];
        assert!(matches!(
            encode_segment(&Segment::ZERO, &mut buf),
            Err(Error::Wire(WireError::BufferTooSmall { .. }))
        ));
    }

    #[test]
    fn test_ack_and_completion() {
        assert_eq!(encode_ack(7, 31), [7, 0, 0, 0, 31]);
        assert_eq!(encode_ack(7, 1000)[4], 255);
        assert_eq!(decode_ack(&[9, 0, 0, 0, 2]).unwrap(), (9, 2));

        assert_eq!(encode_completion(258), [2, 1, 0, 0]);
        assert_eq!(decode_completion(&[2, 1, 0, 0]).unwrap(), 258);
        assert!(decode_completion(&[1, 2]).is_err());
    }

    #[test]
    fn test_state_report() {
        let state = AxisState {
            position: 12.5,
            velocity: -3.0,
            acceleration: 0.25,
            ..AxisState::INITIAL
        };
        assert_eq!(decode_state(&encode_state(&state)).unwrap(), (12.5, -3.0, 0.25));
    }
}
