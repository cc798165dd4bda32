//! Extraction of a submission candidate from a recognition payload

use crate::error::{Result, ShazamError};
use crate::types::{RecognitionResult, Track};

/// Titles stripped below this length keep their parenthetical; very short
/// base titles are more often truncation artifacts than genuine remix tags.
const MIN_TITLE_LEN: usize = 3;

/// A track ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCandidate {
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
}

/// Pull a submission candidate out of a recognition payload.
///
/// Returns `Ok(None)` when nothing was recognized (no track block), and
/// `Err(ShazamError::IncompleteTrackInfo)` when a track block is present but
/// artist or title is unusable after cleaning.
pub fn extract_candidate(result: &RecognitionResult) -> Result<Option<TrackCandidate>> {
    let Some(track) = &result.track else {
        return Ok(None);
    };

    let artist = track.subtitle.as_deref().unwrap_or("").trim().to_string();
    let title = clean_title(track.title.as_deref().unwrap_or(""));

    if artist.is_empty() || title.is_empty() {
        return Err(ShazamError::IncompleteTrackInfo);
    }

    Ok(Some(TrackCandidate {
        artist,
        title,
        album: find_album(track),
    }))
}

/// Strip a trailing parenthetical qualifier, e.g. "(Remix)", keeping the
/// whole title when the stripped form would fall below the length floor.
pub fn clean_title(raw: &str) -> String {
    let stripped = raw.split('(').next().unwrap_or("").trim();
    if stripped.chars().count() < MIN_TITLE_LEN {
        raw.trim().to_string()
    } else {
        stripped.to_string()
    }
}

/// Strip a trailing parenthetical qualifier from an album name,
/// e.g. "(Deluxe Edition)". No length floor.
pub fn clean_album(raw: &str) -> String {
    raw.split('(').next().unwrap_or("").trim().to_string()
}

/// Album lives in the "SONG" metadata section under the "Album" label.
/// First match wins; an empty or absent value leaves the album unset.
fn find_album(track: &Track) -> Option<String> {
    for section in &track.sections {
        if section.section_type.as_deref() != Some("SONG") {
            continue;
        }
        for item in &section.metadata {
            if item.title.as_deref() == Some("Album") {
                let album = clean_album(item.text.as_deref().unwrap_or(""));
                if album.is_empty() {
                    return None;
                }
                return Some(album);
            }
        }
    }
    None
}
