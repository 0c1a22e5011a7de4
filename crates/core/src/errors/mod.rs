//! Error types and Result alias for the dashboard client

use thiserror::Error;

/// Main error type for the dashboard client
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed state payload: {0}")]
    Decode(String),

    #[error("Failed to encode command: {0}")]
    Encode(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
