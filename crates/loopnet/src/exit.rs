use std::fmt;

use loopnet_frame::FrameError;
use loopnet_transport::TransportError;

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Frame(err) => frame_error(context, err),
        TransportError::InvalidConfig(_) | TransportError::Unsupported => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        TransportError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        TransportError::NotFound { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        TransportError::Overflow { .. }
        | TransportError::NoPeer(_)
        | TransportError::StaleHandle(_) => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
    }
}
