use std::fmt;

use crate::buffer::ReceiveBuffer;
use crate::flow::{FlowControl, FlowState};

/// Which directory slot an endpoint lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Client,
    Server,
}

impl Side {
    pub(crate) fn index(self) -> usize {
        match self {
            Side::Client => 0,
            Side::Server => 1,
        }
    }

    /// The opposite side of the pair.
    pub fn other(self) -> Self {
        match self {
            Side::Client => Side::Server,
            Side::Server => Side::Client,
        }
    }

    /// Address string reported for this side in connection listings.
    pub fn address(self) -> &'static str {
        match self {
            Side::Client => "localhost",
            Side::Server => "LOCAL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Client => f.write_str("client"),
            Side::Server => f.write_str("server"),
        }
    }
}

/// Copyable reference to an endpoint in a [`LoopbackTransport`](crate::LoopbackTransport).
///
/// The generation distinguishes an endpoint from a later one created in the
/// same slot after a close, so stale handles are rejected instead of
/// silently addressing the new endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointHandle {
    side: Side,
    generation: u64,
}

impl EndpointHandle {
    pub(crate) fn new(side: Side, generation: u64) -> Self {
        Self { side, generation }
    }

    pub fn side(&self) -> Side {
        self.side
    }
}

/// One side of the loopback pair.
///
/// Senders write into the peer's receive buffer; an endpoint only ever
/// drains its own.
pub struct Endpoint {
    side: Side,
    generation: u64,
    address: String,
    masked_address: String,
    pub(crate) buffer: ReceiveBuffer,
    pub(crate) flow: FlowControl,
    pub(crate) peer: Option<Side>,
    unreliable_send_sequence: u32,
    pub(crate) unreliable_receive_sequence: u32,
}

impl Endpoint {
    pub(crate) fn new(side: Side, generation: u64, capacity: usize) -> Self {
        Self {
            side,
            generation,
            address: side.address().to_string(),
            masked_address: side.address().to_string(),
            buffer: ReceiveBuffer::new(capacity),
            flow: FlowControl::default(),
            peer: None,
            unreliable_send_sequence: 0,
            unreliable_receive_sequence: 0,
        }
    }

    pub fn handle(&self) -> EndpointHandle {
        EndpointHandle::new(self.side, self.generation)
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn masked_address(&self) -> &str {
        &self.masked_address
    }

    /// Bytes waiting in this endpoint's receive buffer.
    pub fn queued_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Raw queued bytes, head first.
    pub fn queued(&self) -> &[u8] {
        self.buffer.queued()
    }

    pub fn can_send(&self) -> bool {
        self.flow.can_send()
    }

    pub fn flow_state(&self) -> FlowState {
        self.flow.state()
    }

    pub fn peer(&self) -> Option<Side> {
        self.peer
    }

    /// Sequence number the next unreliable send will carry.
    pub fn unreliable_send_sequence(&self) -> u32 {
        self.unreliable_send_sequence
    }

    /// Last unreliable sequence received plus one.
    pub fn unreliable_receive_sequence(&self) -> u32 {
        self.unreliable_receive_sequence
    }

    /// Take the next unreliable sequence number.
    pub(crate) fn next_unreliable_sequence(&mut self) -> u32 {
        let sequence = self.unreliable_send_sequence;
        self.unreliable_send_sequence = sequence.wrapping_add(1);
        sequence
    }

    /// Drop buffered data and return the reliable channel to `Ready`.
    pub(crate) fn reset(&mut self) {
        self.buffer.clear();
        self.flow.reset();
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("side", &self.side)
            .field("generation", &self.generation)
            .field("address", &self.address)
            .field("queued", &self.buffer.len())
            .field("can_send", &self.flow.can_send())
            .field("peer", &self.peer)
            .field("unreliable_send_sequence", &self.unreliable_send_sequence)
            .field(
                "unreliable_receive_sequence",
                &self.unreliable_receive_sequence,
            )
            .finish()
    }
}
