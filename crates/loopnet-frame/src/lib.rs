//! Message framing for the in-process loopback transport.
//!
//! Every message queued in an endpoint's receive buffer is framed with:
//! - A 1-byte message kind tag (1 = reliable, 2 = unreliable)
//! - A 2-byte little-endian payload length
//! - A 1-byte padding filler
//! - For unreliable messages only, a 4-byte little-endian sequence number
//!
//! Frames occupy their header plus payload rounded up to [`ALIGNMENT`], so
//! the next frame always starts on an aligned offset. The layout matches
//! the one used by the real network drivers.

pub mod codec;
pub mod error;
pub mod kind;

pub use codec::{
    align, decode_frame, encode_reliable, encode_unreliable, Frame, FrameRef, ALIGNMENT,
    MAX_PAYLOAD, RELIABLE_HEADER_SIZE, UNRELIABLE_HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use kind::MessageKind;
