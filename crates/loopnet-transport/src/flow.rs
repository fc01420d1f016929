//! Reliable-channel back-pressure.
//!
//! Each direction allows one outstanding reliable message. The sender goes
//! `Ready -> Pending` when it queues a reliable frame and returns to `Ready`
//! once the receiving side consumes that frame. There is no timeout: a frame
//! that is never polled keeps the sender pending.

use serde::Serialize;

/// Observable state of a sender's reliable channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowState {
    /// A reliable send is permitted.
    Ready,
    /// Waiting for the peer to consume the last reliable frame.
    Pending,
}

/// Send-permission flag for one endpoint's outgoing reliable traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowControl {
    can_send: bool,
}

impl Default for FlowControl {
    fn default() -> Self {
        Self { can_send: true }
    }
}

impl FlowControl {
    pub fn can_send(&self) -> bool {
        self.can_send
    }

    pub fn state(&self) -> FlowState {
        if self.can_send {
            FlowState::Ready
        } else {
            FlowState::Pending
        }
    }

    /// A reliable frame was queued on the peer.
    pub fn on_sent(&mut self) {
        self.can_send = false;
    }

    /// The peer consumed our reliable frame.
    pub fn on_consumed(&mut self) {
        self.can_send = true;
    }

    pub fn reset(&mut self) {
        self.can_send = true;
    }
}
