use thiserror::Error;

/// Top-level error type for Warden support utilities.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed bot token.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
