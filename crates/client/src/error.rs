use thiserror::Error;

/// Client-side failure. `Display` is the text shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The server answered with an error; its message is surfaced verbatim.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Network error or server is unreachable")]
    Unreachable,

    #[error("An unexpected error occurred")]
    Unexpected,

    #[error("No token found")]
    NoSession,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
