//! Autoscrobble Last.fm Client
//!
//! Minimal Last.fm web API surface for the scrobbler: mobile-session
//! authentication, `track.scrobble`, and the `user.getRecentTracks` lookup
//! that backs remote duplicate detection.

pub mod client;
pub mod error;

pub use client::{LastfmClient, RecentTrack};
pub use error::{LastfmError, Result};
