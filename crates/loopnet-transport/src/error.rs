use crate::endpoint::Side;

/// Errors that can occur in loopback transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Loopback pairing is not available in dedicated-server mode.
    #[error("loopback transport unsupported in dedicated mode")]
    Unsupported,

    /// The connect target is not the local host.
    #[error("host not found: {target}")]
    NotFound { target: String },

    /// The endpoint is not linked to a peer.
    #[error("{0} endpoint has no peer")]
    NoPeer(Side),

    /// The handle does not refer to a live endpoint.
    #[error("stale {0} endpoint handle")]
    StaleHandle(Side),

    /// A reliable send would overrun the peer's receive buffer.
    #[error("receive buffer overflow ({queued} queued + {needed} needed > {capacity} capacity)")]
    Overflow {
        queued: usize,
        needed: usize,
        capacity: usize,
    },

    /// The payload exceeds the configured maximum message size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The configuration is not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Frame-level error while encoding or decoding the receive buffer.
    #[error("frame error: {0}")]
    Frame(#[from] loopnet_frame::FrameError),
}

impl TransportError {
    /// Whether the error breaks the connection for good.
    ///
    /// An overflow or a corrupt receive buffer leaves the pair in a state the
    /// protocol cannot recover from; everything else is an ordinary refusal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Overflow { .. } | Self::Frame(_))
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
