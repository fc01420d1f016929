use bytes::{Buf, BufMut, Bytes};

use crate::error::{FrameError, Result};
use crate::kind::MessageKind;

/// Reliable header: tag (1) + length (2) + padding (1) = 4 bytes.
pub const RELIABLE_HEADER_SIZE: usize = 4;

/// Unreliable header: tag (1) + length (2) + padding (1) + sequence (4) = 8 bytes.
pub const UNRELIABLE_HEADER_SIZE: usize = 8;

/// Frames are padded to multiples of the native integer width.
pub const ALIGNMENT: usize = std::mem::size_of::<u32>();

/// Largest payload the 2-byte length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

const PADDING: u8 = 0;

/// Round `value` up to the next multiple of [`ALIGNMENT`].
pub const fn align(value: usize) -> usize {
    (value + (ALIGNMENT - 1)) & !(ALIGNMENT - 1)
}

/// An owned, decoded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Channel the message travelled on.
    pub kind: MessageKind,
    /// Sender sequence number (unreliable messages only).
    pub sequence: Option<u32>,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a reliable frame.
    pub fn reliable(payload: impl Into<Bytes>) -> Self {
        Self {
            kind: MessageKind::Reliable,
            sequence: None,
            payload: payload.into(),
        }
    }

    /// Create an unreliable frame carrying `sequence`.
    pub fn unreliable(sequence: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            kind: MessageKind::Unreliable,
            sequence: Some(sequence),
            payload: payload.into(),
        }
    }

    /// Buffer space this frame occupies once queued (header + payload, aligned).
    pub fn wire_size(&self) -> usize {
        align(self.kind.header_size() + self.payload.len())
    }
}

/// A frame decoded in place from the head of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRef<'a> {
    pub kind: MessageKind,
    pub sequence: Option<u32>,
    pub payload: &'a [u8],
    /// Bytes to consume from the buffer head to skip past this frame.
    pub occupied: usize,
}

impl FrameRef<'_> {
    /// Copy the payload out into an owned [`Frame`].
    pub fn to_frame(&self) -> Frame {
        Frame {
            kind: self.kind,
            sequence: self.sequence,
            payload: Bytes::copy_from_slice(self.payload),
        }
    }
}

/// Encode a reliable frame at the start of `dst`.
///
/// Wire format:
/// ```text
/// ┌──────────┬───────────┬─────────┬─────────────────┐
/// │ Tag (1B) │ Length    │ Pad     │ Payload         │
/// │ 0x01     │ (2B LE)   │ (1B)    │ (Length bytes)  │
/// └──────────┴───────────┴─────────┴─────────────────┘
/// ```
///
/// Returns the aligned number of bytes the frame occupies. Alignment filler
/// past the payload is left untouched.
pub fn encode_reliable(payload: &[u8], dst: &mut [u8]) -> Result<usize> {
    let mut dst = prepare(MessageKind::Reliable, payload, dst)?;
    dst.put_u8(MessageKind::Reliable.tag());
    dst.put_u16_le(payload.len() as u16);
    dst.put_u8(PADDING);
    dst.put_slice(payload);
    Ok(align(RELIABLE_HEADER_SIZE + payload.len()))
}

/// Encode an unreliable frame at the start of `dst`.
///
/// Wire format:
/// ```text
/// ┌──────────┬───────────┬─────────┬────────────┬─────────────────┐
/// │ Tag (1B) │ Length    │ Pad     │ Sequence   │ Payload         │
/// │ 0x02     │ (2B LE)   │ (1B)    │ (4B LE)    │ (Length bytes)  │
/// └──────────┴───────────┴─────────┴────────────┴─────────────────┘
/// ```
pub fn encode_unreliable(sequence: u32, payload: &[u8], dst: &mut [u8]) -> Result<usize> {
    let mut dst = prepare(MessageKind::Unreliable, payload, dst)?;
    dst.put_u8(MessageKind::Unreliable.tag());
    dst.put_u16_le(payload.len() as u16);
    dst.put_u8(PADDING);
    dst.put_u32_le(sequence);
    dst.put_slice(payload);
    Ok(align(UNRELIABLE_HEADER_SIZE + payload.len()))
}

fn prepare<'a>(kind: MessageKind, payload: &[u8], dst: &'a mut [u8]) -> Result<&'a mut [u8]> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let needed = kind.header_size() + payload.len();
    if dst.len() < needed {
        return Err(FrameError::InsufficientSpace {
            needed,
            available: dst.len(),
        });
    }
    Ok(dst)
}

/// Decode the frame at the head of `src`.
///
/// Returns `Ok(None)` if `src` is empty. Does not consume anything; the
/// caller advances by [`FrameRef::occupied`].
pub fn decode_frame(src: &[u8]) -> Result<Option<FrameRef<'_>>> {
    if src.is_empty() {
        return Ok(None);
    }

    let kind = MessageKind::from_tag(src[0])?;
    let header = kind.header_size();
    if src.len() < header {
        return Err(FrameError::Truncated {
            needed: header,
            available: src.len(),
        });
    }

    let mut cursor = &src[1..header];
    let length = cursor.get_u16_le() as usize;
    cursor.advance(1); // padding
    let sequence = match kind {
        MessageKind::Unreliable => Some(cursor.get_u32_le()),
        MessageKind::Reliable => None,
    };

    let end = header + length;
    if src.len() < end {
        return Err(FrameError::Truncated {
            needed: end,
            available: src.len(),
        });
    }

    Ok(Some(FrameRef {
        kind,
        sequence,
        payload: &src[header..end],
        occupied: align(end),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_rounds_to_int_width() {
        assert_eq!(align(0), 0);
        assert_eq!(align(1), 4);
        assert_eq!(align(4), 4);
        assert_eq!(align(5), 8);
        assert_eq!(align(14), 16);
    }

    #[test]
    fn reliable_wire_layout() {
        let mut buf = [0xEEu8; 16];
        let occupied = encode_reliable(b"hello", &mut buf).unwrap();

        assert_eq!(occupied, 12);
        assert_eq!(buf[0], 1);
        assert_eq!(&buf[1..3], &[5, 0]);
        assert_eq!(&buf[4..9], b"hello");
        // alignment filler untouched
        assert_eq!(&buf[9..12], &[0xEE; 3]);
    }

    #[test]
    fn unreliable_wire_layout() {
        let mut buf = [0u8; 16];
        let occupied = encode_unreliable(0x0403_0201, b"abc", &mut buf).unwrap();

        assert_eq!(occupied, 12);
        assert_eq!(buf[0], 2);
        assert_eq!(&buf[1..3], &[3, 0]);
        assert_eq!(&buf[4..8], &[1, 2, 3, 4]);
        assert_eq!(&buf[8..11], b"abc");
    }

    #[test]
    fn length_is_little_endian() {
        let payload = vec![7u8; 0x0102];
        let mut buf = vec![0u8; 0x0102 + RELIABLE_HEADER_SIZE];
        encode_reliable(&payload, &mut buf).unwrap();
        assert_eq!(&buf[1..3], &[0x02, 0x01]);
    }

    #[test]
    fn decode_reliable() {
        let mut buf = [0u8; 16];
        encode_reliable(b"ping", &mut buf).unwrap();

        let frame = decode_frame(&buf).unwrap().unwrap();
        assert_eq!(frame.kind, MessageKind::Reliable);
        assert_eq!(frame.sequence, None);
        assert_eq!(frame.payload, b"ping");
        assert_eq!(frame.occupied, 8);
    }

    #[test]
    fn decode_unreliable_carries_sequence() {
        let mut buf = [0u8; 24];
        encode_unreliable(42, b"state", &mut buf).unwrap();

        let frame = decode_frame(&buf).unwrap().unwrap();
        assert_eq!(frame.kind, MessageKind::Unreliable);
        assert_eq!(frame.sequence, Some(42));
        assert_eq!(frame.payload, b"state");
        assert_eq!(frame.occupied, 16);
    }

    #[test]
    fn decode_empty_buffer() {
        assert!(decode_frame(&[]).unwrap().is_none());
    }

    #[test]
    fn decode_unknown_tag() {
        let result = decode_frame(&[9, 0, 0, 0]);
        assert!(matches!(result, Err(FrameError::UnknownKind(9))));
    }

    #[test]
    fn decode_truncated_header() {
        let result = decode_frame(&[2, 4, 0, 0, 1]);
        assert!(matches!(
            result,
            Err(FrameError::Truncated {
                needed: 8,
                available: 5
            })
        ));
    }

    #[test]
    fn decode_truncated_payload() {
        let mut buf = [0u8; 16];
        encode_reliable(b"truncated", &mut buf).unwrap();
        let result = decode_frame(&buf[..6]);
        assert!(matches!(result, Err(FrameError::Truncated { .. })));
    }

    #[test]
    fn encode_rejects_short_destination() {
        let mut buf = [0u8; 6];
        let err = encode_unreliable(0, b"x", &mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InsufficientSpace {
                needed: 9,
                available: 6
            }
        ));
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let mut buf = vec![0u8; payload.len() + RELIABLE_HEADER_SIZE];
        let err = encode_reliable(&payload, &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
    }

    #[test]
    fn consecutive_frames_stay_aligned() {
        let mut buf = [0u8; 64];
        let first = encode_reliable(b"a", &mut buf).unwrap();
        let second = encode_unreliable(1, b"bcdef", &mut buf[first..]).unwrap();

        assert_eq!(first % ALIGNMENT, 0);
        assert_eq!(second % ALIGNMENT, 0);

        let f1 = decode_frame(&buf).unwrap().unwrap();
        let f2 = decode_frame(&buf[f1.occupied..]).unwrap().unwrap();
        assert_eq!(f1.payload, b"a");
        assert_eq!(f2.payload, b"bcdef");
        assert_eq!(f2.sequence, Some(1));
    }

    #[test]
    fn empty_payload() {
        let mut buf = [0u8; 8];
        let occupied = encode_reliable(b"", &mut buf).unwrap();
        assert_eq!(occupied, RELIABLE_HEADER_SIZE);

        let frame = decode_frame(&buf[..occupied]).unwrap().unwrap();
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn frame_wire_size() {
        assert_eq!(Frame::reliable(Bytes::from_static(b"test")).wire_size(), 8);
        assert_eq!(
            Frame::unreliable(3, Bytes::from_static(b"test!")).wire_size(),
            16
        );
    }

    #[test]
    fn frame_ref_to_owned() {
        let mut buf = [0u8; 16];
        encode_unreliable(5, b"own", &mut buf).unwrap();
        let frame = decode_frame(&buf).unwrap().unwrap().to_frame();
        assert_eq!(frame, Frame::unreliable(5, Bytes::from_static(b"own")));
    }
}
