//! Duplicate detection
//!
//! Combines the in-process recency cache with the remote listening history
//! into one accept/reject decision. The local check runs first so the common
//! case, back-to-back recognitions of a continuously playing track, never
//! touches the network.

use tracing::warn;

use autoscrobble_lastfm::Result as LastfmResult;

use crate::track::TrackIdentity;

/// What to do with a recognized candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Submit,
    SkipLocalDuplicate,
    SkipRemoteDuplicate,
}

/// Source of the last identity known to the remote service.
///
/// Re-queried on every consult; the remote truth may change under us due to
/// other submitters.
#[allow(async_fn_in_trait)]
pub trait RecencyOracle {
    async fn last_submitted(&self) -> LastfmResult<Option<TrackIdentity>>;
}

/// Decide whether `current` is a new listen.
///
/// `current` must already be normalized, as must anything the cache and
/// oracle hold. An oracle failure is absorbed as "no remote identity known":
/// a failed dedup check fails open toward submitting, never toward silently
/// dropping a real new track, and never reaches the caller as an error.
pub async fn should_submit<O: RecencyOracle>(
    current: &TrackIdentity,
    last_submitted: Option<&TrackIdentity>,
    oracle: &O,
) -> Decision {
    if last_submitted == Some(current) {
        return Decision::SkipLocalDuplicate;
    }

    match oracle.last_submitted().await {
        Ok(Some(remote)) if remote == *current => Decision::SkipRemoteDuplicate,
        Ok(_) => Decision::Submit,
        Err(e) => {
            warn!("Could not fetch last scrobbled track: {}", e);
            Decision::Submit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use autoscrobble_lastfm::LastfmError;

    struct MockOracle {
        response: LastfmResult<Option<TrackIdentity>>,
        calls: AtomicUsize,
    }

    impl MockOracle {
        fn returning(response: Option<TrackIdentity>) -> Self {
            Self {
                response: Ok(response),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(LastfmError::NetworkError("connection refused".into())),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RecencyOracle for MockOracle {
        async fn last_submitted(&self) -> LastfmResult<Option<TrackIdentity>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(identity) => Ok(identity.clone()),
                Err(LastfmError::NetworkError(msg)) => {
                    Err(LastfmError::NetworkError(msg.clone()))
                }
                Err(_) => unreachable!("mock only fails with NetworkError"),
            }
        }
    }

    #[tokio::test]
    async fn test_local_duplicate_short_circuits_oracle() {
        let current = TrackIdentity::normalized("Test Artist", "Test Song");
        let cached = TrackIdentity::normalized("test artist", "test song");
        let oracle = MockOracle::returning(None);

        let decision = should_submit(&current, Some(&cached), &oracle).await;

        assert_eq!(decision, Decision::SkipLocalDuplicate);
        assert_eq!(oracle.call_count(), 0, "fast path must not query the oracle");
    }

    #[tokio::test]
    async fn test_remote_duplicate_with_empty_cache() {
        let current = TrackIdentity::normalized("Artist X", "Song Y");
        let oracle = MockOracle::returning(Some(TrackIdentity::normalized("artist x", "song y")));

        let decision = should_submit(&current, None, &oracle).await;

        assert_eq!(decision, Decision::SkipRemoteDuplicate);
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_new_track_submits() {
        let current = TrackIdentity::normalized("Artist X", "Song Y");
        let oracle = MockOracle::returning(Some(TrackIdentity::normalized("Other", "Track")));

        let decision = should_submit(&current, None, &oracle).await;

        assert_eq!(decision, Decision::Submit);
    }

    #[tokio::test]
    async fn test_empty_history_submits() {
        let current = TrackIdentity::normalized("Artist X", "Song Y");
        let oracle = MockOracle::returning(None);

        let decision = should_submit(&current, None, &oracle).await;

        assert_eq!(decision, Decision::Submit);
    }

    #[tokio::test]
    async fn test_oracle_failure_fails_open() {
        let current = TrackIdentity::normalized("Artist X", "Song Y");
        let oracle = MockOracle::failing();

        let decision = should_submit(&current, None, &oracle).await;

        assert_eq!(decision, Decision::Submit);
    }

    #[tokio::test]
    async fn test_cache_mismatch_consults_oracle() {
        let current = TrackIdentity::normalized("Artist X", "Song Y");
        let cached = TrackIdentity::normalized("Other", "Track");
        let oracle = MockOracle::returning(None);

        let decision = should_submit(&current, Some(&cached), &oracle).await;

        assert_eq!(decision, Decision::Submit);
        assert_eq!(oracle.call_count(), 1);
    }
}
