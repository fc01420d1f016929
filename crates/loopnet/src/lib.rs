//! Zero-latency in-process client/server socket pair.
//!
//! loopnet lets a game host talk to its own embedded server through the same
//! reliable/unreliable message interface the network drivers expose, without
//! a network hop.
//!
//! # Crate Structure
//!
//! - [`frame`]: Wire framing for reliable and unreliable messages
//! - [`transport`]: The loopback endpoint pair, flow control and host listing

/// Re-export frame types.
pub mod frame {
    pub use loopnet_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use loopnet_transport::*;
}
