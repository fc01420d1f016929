use bytes::Bytes;
use loopnet_frame::{
    decode_frame, encode_reliable, encode_unreliable, Frame, MessageKind, RELIABLE_HEADER_SIZE,
    UNRELIABLE_HEADER_SIZE,
};
use tracing::{debug, error, trace};

use crate::directory::{lookup_mut, LoopbackTransport};
use crate::endpoint::{Endpoint, EndpointHandle, Side};
use crate::error::{Result, TransportError};

/// Outcome of an unreliable send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// The frame was queued on the peer.
    Sent,
    /// The peer's buffer had no room outside the reliable reserve; the
    /// frame was discarded like a lost packet.
    Dropped,
}

impl LoopbackTransport {
    /// Queue a reliable message on the sender's peer.
    ///
    /// Callers check [`can_send_reliable`](Self::can_send_reliable) first;
    /// the flag is not re-validated here. Running out of buffer space is a
    /// fatal [`TransportError::Overflow`].
    pub fn send_reliable(&mut self, sender: EndpointHandle, payload: &[u8]) -> Result<()> {
        let peer_side = self.linked_peer(sender)?;
        self.check_payload(payload)?;

        let capacity = self.config().capacity();
        let peer = peer_mut(&mut self.slots, sender.side(), peer_side)?;
        let queued = peer.buffer.len();
        let needed = payload.len() + RELIABLE_HEADER_SIZE;
        if queued + needed > capacity {
            error!(
                from = %sender.side(),
                queued,
                needed,
                capacity,
                "reliable send overflows peer receive buffer"
            );
            return Err(TransportError::Overflow {
                queued,
                needed,
                capacity,
            });
        }

        let occupied = encode_reliable(payload, peer.buffer.tail_mut())?;
        peer.buffer.commit(occupied);
        trace!(
            from = %sender.side(),
            size = payload.len(),
            occupied,
            queued = peer.buffer.len(),
            "queued reliable frame"
        );

        self.endpoint_mut(sender)?.flow.on_sent();
        Ok(())
    }

    /// Queue an unreliable message on the sender's peer.
    ///
    /// A sequence number is consumed even when the send fails or the frame is
    /// dropped. The last max-size slot of the peer's buffer is reserved for
    /// reliable traffic; frames that would reach into it are dropped.
    pub fn send_unreliable(&mut self, sender: EndpointHandle, payload: &[u8]) -> Result<SendStatus> {
        let endpoint = self.endpoint_mut(sender)?;
        let sequence = endpoint.next_unreliable_sequence();
        let peer_side = endpoint.peer.ok_or(TransportError::NoPeer(sender.side()))?;
        self.check_payload(payload)?;

        let limit = self.config().unreliable_capacity();
        let peer = peer_mut(&mut self.slots, sender.side(), peer_side)?;
        let queued = peer.buffer.len();
        let needed = payload.len() + UNRELIABLE_HEADER_SIZE;
        if queued + needed > limit {
            debug!(
                from = %sender.side(),
                sequence,
                queued,
                needed,
                limit,
                "dropping unreliable frame"
            );
            return Ok(SendStatus::Dropped);
        }

        let occupied = encode_unreliable(sequence, payload, peer.buffer.tail_mut())?;
        peer.buffer.commit(occupied);
        trace!(
            from = %sender.side(),
            sequence,
            size = payload.len(),
            occupied,
            "queued unreliable frame"
        );
        Ok(SendStatus::Sent)
    }

    /// Whether a reliable send is currently permitted.
    pub fn can_send_reliable(&self, handle: EndpointHandle) -> bool {
        self.endpoint(handle)
            .map(|endpoint| endpoint.peer().is_some() && endpoint.can_send())
            .unwrap_or(false)
    }

    /// Unreliable sends are never flow-controlled; capacity is checked at send time.
    pub fn can_send_unreliable(&self, _handle: EndpointHandle) -> bool {
        true
    }

    /// Consume the frame at the head of the endpoint's receive buffer.
    ///
    /// Returns `Ok(None)` when nothing is queued. Otherwise the payload is
    /// left in [`message`](Self::message) and the frame's kind is returned.
    /// Consuming a reliable frame re-enables reliable sends on the peer.
    pub fn receive_next(&mut self, handle: EndpointHandle) -> Result<Option<MessageKind>> {
        Ok(self.consume_head(handle)?.map(|(kind, _)| kind))
    }

    /// Like [`receive_next`](Self::receive_next) but returns an owned frame.
    pub fn recv(&mut self, handle: EndpointHandle) -> Result<Option<Frame>> {
        Ok(self.consume_head(handle)?.map(|(kind, sequence)| Frame {
            kind,
            sequence,
            payload: Bytes::copy_from_slice(&self.message),
        }))
    }

    /// Poll the server endpoint, if one exists.
    pub fn receive_any(&mut self) -> Result<Option<(EndpointHandle, MessageKind)>> {
        let Some(server) = self.server().map(Endpoint::handle) else {
            return Ok(None);
        };
        Ok(self.receive_next(server)?.map(|kind| (server, kind)))
    }

    /// Payload of the most recently received message.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    fn consume_head(&mut self, handle: EndpointHandle) -> Result<Option<(MessageKind, Option<u32>)>> {
        let endpoint = lookup_mut(&mut self.slots, handle)?;
        let Some(frame) = decode_frame(endpoint.buffer.queued())? else {
            return Ok(None);
        };

        self.message.clear();
        self.message.extend_from_slice(frame.payload);
        let (kind, sequence, occupied) = (frame.kind, frame.sequence, frame.occupied);

        if let Some(sequence) = sequence {
            endpoint.unreliable_receive_sequence = sequence.wrapping_add(1);
        }
        endpoint.buffer.consume(occupied);
        trace!(
            side = %handle.side(),
            %kind,
            size = self.message.len(),
            remaining = endpoint.buffer.len(),
            "consumed frame"
        );

        let ack = match kind {
            MessageKind::Reliable => endpoint.peer,
            MessageKind::Unreliable => None,
        };
        if let Some(peer_side) = ack {
            if let Some(peer) = self.slots[peer_side.index()].as_mut() {
                peer.flow.on_consumed();
            }
        }

        Ok(Some((kind, sequence)))
    }

    fn linked_peer(&self, sender: EndpointHandle) -> Result<Side> {
        self.endpoint(sender)?
            .peer()
            .ok_or(TransportError::NoPeer(sender.side()))
    }

    fn check_payload(&self, payload: &[u8]) -> Result<()> {
        let max = self.config().max_message;
        if payload.len() > max {
            return Err(TransportError::PayloadTooLarge {
                size: payload.len(),
                max,
            });
        }
        Ok(())
    }
}

fn peer_mut(slots: &mut [Option<Endpoint>; 2], from: Side, peer: Side) -> Result<&mut Endpoint> {
    slots[peer.index()]
        .as_mut()
        .ok_or(TransportError::NoPeer(from))
}

#[cfg(test)]
mod tests {
    use loopnet_frame::align;

    use super::*;
    use crate::config::LoopbackConfig;
    use crate::directory::{HostMode, LOCAL_HOST};
    use crate::flow::FlowState;

    fn small_config() -> LoopbackConfig {
        LoopbackConfig {
            max_message: 64,
            buffered_messages: 4,
        }
    }

    fn connected(config: LoopbackConfig) -> (LoopbackTransport, EndpointHandle, EndpointHandle) {
        let mut transport =
            LoopbackTransport::with_config(HostMode::Listen, config).expect("config should be valid");
        let client = transport.connect(LOCAL_HOST).expect("local connect should succeed");
        let server = transport.poll_accept().expect("connect should be pending");
        (transport, client, server)
    }

    #[test]
    fn reliable_roundtrip_restores_flow() {
        let (mut transport, client, server) = connected(small_config());

        assert!(transport.can_send_reliable(client));
        transport.send_reliable(client, b"hello").unwrap();
        assert!(!transport.can_send_reliable(client));
        assert_eq!(
            transport.endpoint(client).unwrap().flow_state(),
            FlowState::Pending
        );

        let kind = transport.receive_next(server).unwrap();
        assert_eq!(kind, Some(MessageKind::Reliable));
        assert_eq!(transport.message(), b"hello");
        assert!(transport.can_send_reliable(client));
        assert_eq!(transport.endpoint(server).unwrap().queued_len(), 0);
    }

    #[test]
    fn reliable_send_writes_into_peer_buffer() {
        let (mut transport, client, server) = connected(small_config());
        transport.send_reliable(client, b"abcde").unwrap();

        let server_ep = transport.endpoint(server).unwrap();
        assert_eq!(server_ep.queued_len(), align(4 + 5));
        assert_eq!(&server_ep.queued()[..3], &[1, 5, 0]);
        assert_eq!(&server_ep.queued()[4..9], b"abcde");
        assert_eq!(transport.endpoint(client).unwrap().queued_len(), 0);
    }

    #[test]
    fn receive_on_empty_buffer_is_none() {
        let (mut transport, client, _server) = connected(small_config());
        assert!(transport.receive_next(client).unwrap().is_none());
        assert!(transport.recv(client).unwrap().is_none());
    }

    #[test]
    fn unreliable_frames_carry_sequences() {
        let (mut transport, client, server) = connected(small_config());

        for _ in 0..3 {
            assert_eq!(
                transport.send_unreliable(client, b"tick").unwrap(),
                SendStatus::Sent
            );
        }
        assert!(transport.can_send_reliable(client));

        for expected in 0..3u32 {
            let frame = transport.recv(server).unwrap().unwrap();
            assert_eq!(frame.kind, MessageKind::Unreliable);
            assert_eq!(frame.sequence, Some(expected));
            assert_eq!(frame.payload.as_ref(), b"tick");
            assert_eq!(
                transport.endpoint(server).unwrap().unreliable_receive_sequence(),
                expected + 1
            );
        }
    }

    #[test]
    fn unreliable_consumes_sequence_without_peer() {
        let (mut transport, client, server) = connected(small_config());
        transport.close(server).unwrap();

        let err = transport.send_unreliable(client, b"lost").unwrap_err();
        assert!(matches!(err, TransportError::NoPeer(Side::Client)));
        assert_eq!(
            transport.endpoint(client).unwrap().unreliable_send_sequence(),
            1
        );
    }

    #[test]
    fn unreliable_never_fills_reliable_reserve() {
        let (mut transport, client, server) = connected(small_config());
        // 3 slots of 64 bytes are open to unreliable traffic: 192 bytes.
        let payload = [0u8; 56];
        let mut sent = 0;
        while transport.send_unreliable(client, &payload).unwrap() == SendStatus::Sent {
            sent += 1;
        }
        assert_eq!(sent, 3);
        assert_eq!(transport.endpoint(server).unwrap().queued_len(), 192);

        // The reserved slot still takes a max-size reliable message.
        transport.send_reliable(client, &[1u8; 60]).unwrap();
    }

    #[test]
    fn reliable_without_peer_fails() {
        let (mut transport, client, server) = connected(small_config());
        transport.close(server).unwrap();

        let err = transport.send_reliable(client, b"x").unwrap_err();
        assert!(matches!(err, TransportError::NoPeer(Side::Client)));
        assert!(!err.is_fatal());
        assert!(transport.endpoint(client).unwrap().can_send());
        assert!(!transport.can_send_reliable(client));
    }

    #[test]
    fn oversized_payload_rejected() {
        let (mut transport, client, _server) = connected(small_config());
        let err = transport.send_reliable(client, &[0u8; 65]).unwrap_err();
        assert!(matches!(
            err,
            TransportError::PayloadTooLarge { size: 65, max: 64 }
        ));
        assert!(transport.can_send_reliable(client));
    }

    #[test]
    fn overflow_is_fatal_and_leaves_buffer_intact() {
        let (mut transport, client, server) = connected(small_config());
        let payload = [0u8; 60];
        for _ in 0..4 {
            transport.send_reliable(client, &payload).unwrap();
        }

        let err = transport.send_reliable(client, b"").unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            err,
            TransportError::Overflow {
                queued: 256,
                needed: 4,
                capacity: 256
            }
        ));
        assert_eq!(transport.endpoint(server).unwrap().queued_len(), 256);
    }

    #[test]
    fn mixed_frames_are_fifo() {
        let (mut transport, client, server) = connected(small_config());
        transport.send_unreliable(client, b"u0").unwrap();
        transport.send_reliable(client, b"r0").unwrap();
        transport.send_unreliable(client, b"u1").unwrap();

        let order: Vec<(MessageKind, Vec<u8>)> = std::iter::from_fn(|| {
            transport
                .recv(server)
                .unwrap()
                .map(|frame| (frame.kind, frame.payload.to_vec()))
        })
        .collect();

        assert_eq!(
            order,
            vec![
                (MessageKind::Unreliable, b"u0".to_vec()),
                (MessageKind::Reliable, b"r0".to_vec()),
                (MessageKind::Unreliable, b"u1".to_vec()),
            ]
        );
    }

    #[test]
    fn directions_are_independent() {
        let (mut transport, client, server) = connected(small_config());
        transport.send_reliable(client, b"to-server").unwrap();
        transport.send_reliable(server, b"to-client").unwrap();

        assert_eq!(
            transport.recv(client).unwrap().unwrap().payload.as_ref(),
            b"to-client"
        );
        assert!(transport.can_send_reliable(server));
        assert!(!transport.can_send_reliable(client));

        assert_eq!(
            transport.recv(server).unwrap().unwrap().payload.as_ref(),
            b"to-server"
        );
        assert!(transport.can_send_reliable(client));
    }

    #[test]
    fn receive_any_polls_server() {
        let (mut transport, client, server) = connected(small_config());
        assert!(transport.receive_any().unwrap().is_none());

        transport.send_reliable(client, b"any").unwrap();
        let (handle, kind) = transport.receive_any().unwrap().unwrap();
        assert_eq!(handle, server);
        assert_eq!(kind, MessageKind::Reliable);
        assert_eq!(transport.message(), b"any");
    }

    #[test]
    fn receive_any_without_server() {
        let mut transport = LoopbackTransport::init(HostMode::Listen).unwrap();
        assert!(transport.receive_any().unwrap().is_none());
    }

    #[test]
    fn scratch_buffer_is_cleared_between_messages() {
        let (mut transport, client, server) = connected(small_config());
        transport.send_unreliable(client, b"longer payload").unwrap();
        transport.send_unreliable(client, b"s").unwrap();

        transport.receive_next(server).unwrap();
        transport.receive_next(server).unwrap();
        assert_eq!(transport.message(), b"s");
    }

    #[test]
    fn unreliable_can_always_send() {
        let (transport, client, _server) = connected(small_config());
        assert!(transport.can_send_unreliable(client));
    }
}
