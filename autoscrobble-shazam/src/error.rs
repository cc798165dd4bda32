//! Error types for song recognition

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShazamError>;

#[derive(Error, Debug)]
pub enum ShazamError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Recognized track is missing artist or title")]
    IncompleteTrackInfo,
}
