//! Error types for audio capture

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AudioError>;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio device error: {0}")]
    DeviceError(String),

    #[error("No input device matching '{0}'")]
    DeviceNotFound(String),

    #[error("Audio stream error: {0}")]
    StreamError(String),

    #[error("Resampling error: {0}")]
    ResampleError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("WAV encoding error: {0}")]
    WavError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    pub fn device<S: Into<String>>(msg: S) -> Self {
        Self::DeviceError(msg.into())
    }

    pub fn stream<S: Into<String>>(msg: S) -> Self {
        Self::StreamError(msg.into())
    }

    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
