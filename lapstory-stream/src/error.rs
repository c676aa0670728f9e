//! Stream client errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("malformed message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid stream config: {0}")]
    InvalidConfig(String),
}

pub type StreamResult<T> = Result<T, StreamError>;
