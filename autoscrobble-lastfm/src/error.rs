//! Error types for the Last.fm client

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LastfmError>;

#[derive(Error, Debug)]
pub enum LastfmError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Last.fm error {0}: {1}")]
    ServiceError(u32, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not authenticated, call authenticate() first")]
    NotAuthenticated,
}
