//! Capture → recognize → dedup → scrobble pipeline
//!
//! One iteration per duty cycle, strictly sequential: the next capture never
//! starts before the previous iteration's decision and optional submission
//! have completed, so the recency cache has a single writer by construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

use autoscrobble_audio::{AudioCapture, AudioError};
use autoscrobble_lastfm::{LastfmClient, LastfmError};
use autoscrobble_shazam::{
    extract_candidate, RecognitionResult, ShazamClient, ShazamError, TrackCandidate,
};

use crate::dedup::{should_submit, Decision, RecencyOracle};
use crate::track::TrackIdentity;

/// Everything that can go wrong inside one iteration. The loop matches on
/// the kind, logs, and proceeds to the sleep; nothing here terminates the
/// process.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Audio capture failed: {0}")]
    Capture(#[from] AudioError),

    #[error("Recognition failed: {0}")]
    Recognition(#[from] ShazamError),

    #[error("Scrobble submission failed: {0}")]
    Submission(#[from] LastfmError),
}

/// How one iteration resolved
#[derive(Debug)]
pub enum CycleOutcome {
    Scrobbled(TrackCandidate),
    DuplicateLocal(TrackIdentity),
    DuplicateRemote(TrackIdentity),
    NoMatch,
    IncompleteTrack,
}

/// Clip capture collaborator
pub trait CaptureSource {
    fn record(&mut self) -> Result<Vec<i16>, AudioError>;
}

/// Song recognition collaborator
#[allow(async_fn_in_trait)]
pub trait RecognizerService {
    async fn recognize(&self, samples: &[i16]) -> Result<RecognitionResult, ShazamError>;
}

/// Listen submission collaborator
#[allow(async_fn_in_trait)]
pub trait ScrobbleSink {
    async fn scrobble(
        &self,
        artist: &str,
        title: &str,
        album: Option<&str>,
        timestamp: i64,
    ) -> Result<(), LastfmError>;
}

/// The duty-cycled scheduler
pub struct Pipeline<C, R, O, S> {
    capture: C,
    recognizer: R,
    oracle: O,
    sink: S,
    duty_cycle: Duration,
    dump_path: Option<PathBuf>,

    /// Identity of the last successful submission. Reset only at process
    /// start; overwritten only after the sink confirms a submission.
    last_song: Option<TrackIdentity>,
}

impl<C, R, O, S> Pipeline<C, R, O, S>
where
    C: CaptureSource,
    R: RecognizerService,
    O: RecencyOracle,
    S: ScrobbleSink,
{
    pub fn new(capture: C, recognizer: R, oracle: O, sink: S, duty_cycle: Duration) -> Self {
        Self {
            capture,
            recognizer,
            oracle,
            sink,
            duty_cycle,
            dump_path: None,
            last_song: None,
        }
    }

    /// Write each raw recognition payload to the given file
    pub fn with_dump_path(mut self, dump_path: Option<PathBuf>) -> Self {
        self.dump_path = dump_path;
        self
    }

    /// Identity of the last successful submission
    pub fn last_song(&self) -> Option<&TrackIdentity> {
        self.last_song.as_ref()
    }

    /// Run iterations until `shutdown` flips to true.
    ///
    /// The residual sleep is the only point that races the shutdown signal,
    /// so cancellation lands between iterations, never mid-submission; a
    /// signal raised during an iteration takes effect once that iteration's
    /// decision and optional submission have completed.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting passive audio scrobbler with {}s duty cycle. Press Ctrl+C to stop.",
            self.duty_cycle.as_secs()
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let started = Instant::now();

            match self.run_cycle().await {
                Ok(CycleOutcome::Scrobbled(candidate)) => {
                    info!(
                        artist = %candidate.artist,
                        title = %candidate.title,
                        "New listen submitted"
                    );
                }
                Ok(CycleOutcome::DuplicateLocal(_)) => {
                    info!("Same song as last time, skipping scrobble.");
                }
                Ok(CycleOutcome::DuplicateRemote(identity)) => {
                    info!("Same song as last scrobbled on Last.fm, skipping: {}", identity);
                }
                Ok(CycleOutcome::NoMatch) => {
                    warn!("No song identified.");
                }
                Ok(CycleOutcome::IncompleteTrack) => {
                    warn!("Incomplete track info, skipping.");
                }
                Err(e) => error!("{}", e),
            }

            let elapsed = started.elapsed();
            let sleep_for = sleep_duration(self.duty_cycle, elapsed);
            info!(
                "Processing took {:.1}s, waiting {:.1}s before next attempt...",
                elapsed.as_secs_f32(),
                sleep_for.as_secs_f32()
            );

            let deadline = tokio::time::Instant::now() + sleep_for;
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("🛑 Received shutdown signal");
                        break;
                    }
                    tokio::time::sleep_until(deadline).await;
                }
                _ = tokio::time::sleep_until(deadline) => {}
            }
        }
    }

    /// One capture → recognize → decide → submit iteration.
    ///
    /// A failed submission leaves the recency cache untouched, so the same
    /// track is retried as new on the next differing recognition.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        let samples = tokio::task::block_in_place(|| self.capture.record())?;

        let result = self.recognizer.recognize(&samples).await?;

        if let Some(path) = &self.dump_path {
            dump_result(path, &result);
        }

        let candidate = match extract_candidate(&result) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return Ok(CycleOutcome::NoMatch),
            Err(ShazamError::IncompleteTrackInfo) => return Ok(CycleOutcome::IncompleteTrack),
            Err(e) => return Err(CycleError::Recognition(e)),
        };

        let current = TrackIdentity::normalized(&candidate.artist, &candidate.title);

        match should_submit(&current, self.last_song.as_ref(), &self.oracle).await {
            Decision::SkipLocalDuplicate => Ok(CycleOutcome::DuplicateLocal(current)),
            Decision::SkipRemoteDuplicate => Ok(CycleOutcome::DuplicateRemote(current)),
            Decision::Submit => {
                self.sink
                    .scrobble(
                        &candidate.artist,
                        &candidate.title,
                        candidate.album.as_deref(),
                        Utc::now().timestamp(),
                    )
                    .await?;

                self.last_song = Some(current);
                Ok(CycleOutcome::Scrobbled(candidate))
            }
        }
    }
}

/// Residual sleep after one iteration: the configured period net of
/// processing time, floored at zero. An over-budget iteration starts the
/// next one immediately, with no catch-up burst.
pub fn sleep_duration(period: Duration, elapsed: Duration) -> Duration {
    period.saturating_sub(elapsed)
}

fn dump_result(path: &Path, result: &RecognitionResult) {
    let write = serde_json::to_string(result)
        .map_err(|e| e.to_string())
        .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));

    if let Err(e) = write {
        warn!("Could not write recognition dump: {}", e);
    }
}

impl CaptureSource for AudioCapture {
    fn record(&mut self) -> Result<Vec<i16>, AudioError> {
        AudioCapture::record(self)
    }
}

impl RecognizerService for ShazamClient {
    async fn recognize(&self, samples: &[i16]) -> Result<RecognitionResult, ShazamError> {
        ShazamClient::recognize(self, samples).await
    }
}

impl ScrobbleSink for Arc<LastfmClient> {
    async fn scrobble(
        &self,
        artist: &str,
        title: &str,
        album: Option<&str>,
        timestamp: i64,
    ) -> Result<(), LastfmError> {
        LastfmClient::scrobble(self, artist, title, album, timestamp).await
    }
}

/// Remote recency oracle backed by the user's Last.fm listening history
pub struct LastfmOracle {
    client: Arc<LastfmClient>,
    user: String,
}

impl LastfmOracle {
    pub fn new(client: Arc<LastfmClient>, user: String) -> Self {
        Self { client, user }
    }
}

impl RecencyOracle for LastfmOracle {
    async fn last_submitted(&self) -> autoscrobble_lastfm::Result<Option<TrackIdentity>> {
        Ok(self
            .client
            .recent_track(&self.user)
            .await?
            .map(|track| TrackIdentity::normalized(&track.artist, &track.title)))
    }
}
