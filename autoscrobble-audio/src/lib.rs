//! Autoscrobble Audio Capture
//!
//! Fixed-duration ambient audio capture for song recognition.
//!
//! ## Architecture
//!
//! ```text
//! Audio Device (cpal)
//!   │
//!   ├─> first-channel downmix (mono)
//!   │     │
//!   │     └─> Resampler (rubato) -> 44.1kHz
//!   │           │
//!   │           └─> i16 PCM clip
//!   │
//!   └─> AudioCapture (one clip per duty cycle)
//! ```
//!
//! Unlike a dictation-style stream, the scrobbler only needs one short clip
//! per duty cycle, so capture is a blocking record-for-N-seconds call.

pub mod capture;
pub mod error;
pub mod resampler;
pub mod wav;

pub use capture::{AudioCapture, DeviceInfo, DeviceSelector};
pub use error::{AudioError, Result};
pub use resampler::Resampler;
pub use wav::encode_wav;

/// Sample rate the recognition service expects (44.1 kHz)
pub const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Default clip length per recognition attempt (seconds)
pub const DEFAULT_RECORD_SECONDS: f32 = 10.0;

/// Audio configuration
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Target sample rate (default: 44100 Hz)
    pub sample_rate: u32,
    /// Clip length in seconds (default: 10.0)
    pub record_seconds: f32,
    /// Which input device to capture from
    pub device: DeviceSelector,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: TARGET_SAMPLE_RATE,
            record_seconds: DEFAULT_RECORD_SECONDS,
            device: DeviceSelector::Default,
        }
    }
}
