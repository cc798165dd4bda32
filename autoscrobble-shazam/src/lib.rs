//! Autoscrobble Song Recognition
//!
//! Client for a Shazam-compatible detection endpoint plus the extraction
//! logic that turns its loosely-typed payload into a submission candidate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use autoscrobble_shazam::{extract_candidate, ShazamClient};
//!
//! # async fn run(samples: Vec<i16>) -> Result<(), autoscrobble_shazam::ShazamError> {
//! let client = ShazamClient::new("api-key".to_string())?;
//! let result = client.recognize(&samples).await?;
//! if let Some(candidate) = extract_candidate(&result)? {
//!     println!("{} - {}", candidate.artist, candidate.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod extract;
pub mod types;

pub use client::ShazamClient;
pub use error::{Result, ShazamError};
pub use extract::{clean_album, clean_title, extract_candidate, TrackCandidate};
pub use types::{MetadataItem, RecognitionResult, Section, Track};

/// Sample rate of the PCM payload the detection endpoint expects
pub const RAW_SAMPLE_RATE: u32 = 44_100;
