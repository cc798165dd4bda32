//! Autoscrobble Daemon
//!
//! The duty-cycled recognition-and-deduplication loop: capture a clip,
//! recognize it, decide whether it is a new listen, scrobble it, sleep out
//! the rest of the cycle, repeat until interrupted.

pub mod config;
pub mod dedup;
pub mod pipeline;
pub mod track;
