/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame header carries a tag that is not a known message kind.
    #[error("unknown message kind tag {0}")]
    UnknownKind(u8),

    /// The payload does not fit the 2-byte length field or the configured maximum.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The destination buffer cannot hold the encoded frame.
    #[error("insufficient space for frame ({needed} bytes needed, {available} available)")]
    InsufficientSpace { needed: usize, available: usize },

    /// The buffer ends in the middle of a frame.
    #[error("truncated frame ({needed} bytes needed, {available} available)")]
    Truncated { needed: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
