//! Message kinds carried in the frame tag byte.

use crate::error::{FrameError, Result};

/// Logical channel a frame travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    /// Ordered, flow-controlled delivery.
    Reliable = 1,
    /// Best-effort, sequence-tagged delivery.
    Unreliable = 2,
}

impl MessageKind {
    /// Wire tag value.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Parse a wire tag value.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Self::Reliable),
            2 => Ok(Self::Unreliable),
            other => Err(FrameError::UnknownKind(other)),
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Reliable => "RELIABLE",
            Self::Unreliable => "UNRELIABLE",
        }
    }

    /// Header size in bytes for frames of this kind.
    pub fn header_size(self) -> usize {
        match self {
            Self::Reliable => crate::codec::RELIABLE_HEADER_SIZE,
            Self::Unreliable => crate::codec::UNRELIABLE_HEADER_SIZE,
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_wire_values() {
        assert_eq!(MessageKind::Reliable.tag(), 1);
        assert_eq!(MessageKind::Unreliable.tag(), 2);
        assert_eq!(MessageKind::from_tag(1).unwrap(), MessageKind::Reliable);
        assert_eq!(MessageKind::from_tag(2).unwrap(), MessageKind::Unreliable);
    }

    #[test]
    fn unknown_tag_rejected() {
        assert!(matches!(
            MessageKind::from_tag(0),
            Err(FrameError::UnknownKind(0))
        ));
        assert!(matches!(
            MessageKind::from_tag(7),
            Err(FrameError::UnknownKind(7))
        ));
    }

    #[test]
    fn header_sizes() {
        assert_eq!(MessageKind::Reliable.header_size(), 4);
        assert_eq!(MessageKind::Unreliable.header_size(), 8);
    }
}
