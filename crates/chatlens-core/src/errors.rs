//! Error types for failure handling across the proxy.
//!
//! The taxonomy separates the three ways an upstream call can fail (transport,
//! upstream status, protocol) from the ways persistence can fail (not found,
//! validation, I/O), because the HTTP surface maps each onto a different
//! status code. No variant is ever retried automatically.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ChatLensError {
    #[error("upstream provider returned status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("transport failure reaching upstream provider: {0}")]
    Transport(String),
    #[error("protocol error in upstream response: {0}")]
    Protocol(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for ChatLensError {
    fn from(err: std::io::Error) -> Self {
        ChatLensError::Io(err.to_string())
    }
}
