//! In-process loopback transport.
//!
//! Emulates a connected socket pair between a client and a server living in
//! the same process. Each side owns a fixed-size receive buffer; senders push
//! framed messages straight into their peer's buffer, and receivers drain
//! their own buffer frame by frame.
//!
//! Two channels share each buffer:
//! - reliable: FIFO, one outstanding message per direction, overflow is fatal
//! - unreliable: sequence-tagged, dropped when only the reliable reserve is left
//!
//! Everything is synchronous and single-threaded: the [`LoopbackTransport`]
//! context is driven from the owning loop through `&mut self`.

pub mod buffer;
pub mod config;
pub mod directory;
pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod flow;
pub mod messaging;

pub use config::{
    LoopbackConfig, DEFAULT_BUFFERED_MESSAGES, DEFAULT_MAX_MESSAGE, MAX_BUFFER_CAPACITY,
};
pub use directory::{HostMode, LoopbackTransport, LOCAL_HOST};
pub use discovery::{HostEntry, HostStatus, DRIVER_LABEL, UNNAMED_HOST};
pub use endpoint::{Endpoint, EndpointHandle, Side};
pub use error::{Result, TransportError};
pub use flow::FlowState;
pub use messaging::SendStatus;
