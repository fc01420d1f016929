use loopnet_frame::{ALIGNMENT, MAX_PAYLOAD};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransportError};

/// Default maximum message size in bytes.
pub const DEFAULT_MAX_MESSAGE: usize = 64000;

/// Default number of max-size messages a receive buffer can hold.
pub const DEFAULT_BUFFERED_MESSAGES: usize = 8;

/// Upper bound on a single receive buffer, in bytes.
pub const MAX_BUFFER_CAPACITY: usize = u32::MAX as usize;

/// Sizing for the per-endpoint receive buffers.
///
/// Deserializes from a host config section; missing fields take the defaults.
/// Call [`validate`](Self::validate) before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopbackConfig {
    /// Largest payload a single message may carry.
    pub max_message: usize,
    /// Number of max-size message slots per receive buffer.
    pub buffered_messages: usize,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            max_message: DEFAULT_MAX_MESSAGE,
            buffered_messages: DEFAULT_BUFFERED_MESSAGES,
        }
    }
}

impl LoopbackConfig {
    /// Total receive buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_message.saturating_mul(self.buffered_messages)
    }

    /// Capacity unreliable traffic may fill; the last slot is kept for reliable frames.
    pub fn unreliable_capacity(&self) -> usize {
        self.max_message
            .saturating_mul(self.buffered_messages.saturating_sub(1))
    }

    /// Check the sizing is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_message == 0 || self.max_message > MAX_PAYLOAD {
            return Err(TransportError::InvalidConfig(format!(
                "max_message must be in 1..={MAX_PAYLOAD} (got {})",
                self.max_message
            )));
        }
        if self.max_message % ALIGNMENT != 0 {
            return Err(TransportError::InvalidConfig(format!(
                "max_message must be a multiple of {ALIGNMENT} (got {})",
                self.max_message
            )));
        }
        if self.buffered_messages < 2 {
            return Err(TransportError::InvalidConfig(format!(
                "buffered_messages must be at least 2 (got {})",
                self.buffered_messages
            )));
        }
        match self.max_message.checked_mul(self.buffered_messages) {
            Some(capacity) if capacity <= MAX_BUFFER_CAPACITY => Ok(()),
            _ => Err(TransportError::InvalidConfig(format!(
                "receive buffer of {} x {} bytes exceeds {MAX_BUFFER_CAPACITY} bytes",
                self.buffered_messages, self.max_message
            ))),
        }
    }
}
