//! Last.fm web API client
//!
//! Write calls are signed per the protocol: parameters sorted by name,
//! concatenated as `keyvalue`, secret appended, MD5-hexed. The `format`
//! parameter is excluded from signing.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{LastfmError, Result};

const API_URL: &str = "https://ws.audioscrobbler.com/2.0/";
const USER_AGENT: &str = "autoscrobble/0.1.0 (https://github.com/autoscrobble/autoscrobble)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A completed scrobble as reported by `user.getRecentTracks`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTrack {
    pub artist: String,
    pub title: String,
}

/// Last.fm API client
pub struct LastfmClient {
    http_client: reqwest::Client,
    api_key: String,
    api_secret: String,
    session_key: Option<String>,
}

impl LastfmClient {
    pub fn new(api_key: String, api_secret: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LastfmError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            api_secret,
            session_key: None,
        })
    }

    /// Whether a session key is held
    pub fn is_authenticated(&self) -> bool {
        self.session_key.is_some()
    }

    /// Obtain a session key via `auth.getMobileSession`
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        let params = [
            ("method", "auth.getMobileSession"),
            ("api_key", self.api_key.as_str()),
            ("username", username),
            ("password", password),
        ];
        let api_sig = api_signature(&params, &self.api_secret);

        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("api_sig", api_sig.as_str()));
        form.push(("format", "json"));

        let body = self.post(&form).await?;

        let session: SessionResponse = serde_json::from_str(&body)
            .map_err(|e| LastfmError::ParseError(e.to_string()))?;

        info!(user = %session.session.name, "Authenticated with Last.fm");
        self.session_key = Some(session.session.key);

        Ok(())
    }

    /// Submit one listen via `track.scrobble`
    pub async fn scrobble(
        &self,
        artist: &str,
        title: &str,
        album: Option<&str>,
        timestamp: i64,
    ) -> Result<()> {
        let session_key = self
            .session_key
            .as_deref()
            .ok_or(LastfmError::NotAuthenticated)?;

        let timestamp = timestamp.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("method", "track.scrobble"),
            ("api_key", self.api_key.as_str()),
            ("sk", session_key),
            ("artist", artist),
            ("track", title),
            ("timestamp", timestamp.as_str()),
        ];
        if let Some(album) = album {
            params.push(("album", album));
        }

        let api_sig = api_signature(&params, &self.api_secret);
        params.push(("api_sig", api_sig.as_str()));
        params.push(("format", "json"));

        self.post(&params).await?;

        info!(
            artist,
            title,
            album = album.unwrap_or("Unknown album"),
            "Scrobbled"
        );

        Ok(())
    }

    /// Fetch the user's most recent completed scrobble.
    ///
    /// Now-playing entries are skipped; `Ok(None)` means the history is
    /// empty. Callers deciding on duplicates treat the error arm as "no
    /// remote identity known".
    pub async fn recent_track(&self, user: &str) -> Result<Option<RecentTrack>> {
        debug!(user, "Fetching last scrobbled track");

        let response = self
            .http_client
            .get(API_URL)
            .query(&[
                ("method", "user.getRecentTracks"),
                ("user", user),
                ("limit", "1"),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| LastfmError::NetworkError(e.to_string()))?;

        let body = check_response(response).await?;

        let recent: RecentTracksResponse = serde_json::from_str(&body)
            .map_err(|e| LastfmError::ParseError(e.to_string()))?;

        Ok(pick_completed(recent))
    }

    async fn post(&self, form: &[(&str, &str)]) -> Result<String> {
        let response = self
            .http_client
            .post(API_URL)
            .form(form)
            .send()
            .await
            .map_err(|e| LastfmError::NetworkError(e.to_string()))?;

        check_response(response).await
    }
}

/// Sign request parameters: sort by name, concatenate `keyvalue`, append the
/// shared secret, MD5-hex the result.
fn api_signature(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted: Vec<(&str, &str)> = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut material = String::new();
    for (key, value) in sorted {
        material.push_str(key);
        material.push_str(value);
    }
    material.push_str(secret);

    format!("{:x}", md5::compute(material.as_bytes()))
}

async fn check_response(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| LastfmError::NetworkError(e.to_string()))?;

    // Errors arrive as {"error": <code>, "message": "..."}, sometimes with
    // an HTTP 200 status
    if let Ok(error) = serde_json::from_str::<ErrorResponse>(&body) {
        return Err(LastfmError::ServiceError(error.error, error.message));
    }

    if !status.is_success() {
        return Err(LastfmError::ApiError(status.as_u16(), body));
    }

    Ok(body)
}

fn pick_completed(recent: RecentTracksResponse) -> Option<RecentTrack> {
    recent
        .recenttracks
        .track
        .into_iter()
        .find(|entry| {
            entry
                .attr
                .as_ref()
                .and_then(|attr| attr.nowplaying.as_deref())
                != Some("true")
        })
        .map(|entry| RecentTrack {
            artist: entry.artist.text,
            title: entry.name,
        })
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: u32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session: Session,
}

#[derive(Debug, Deserialize)]
struct Session {
    name: String,
    key: String,
}

#[derive(Debug, Deserialize)]
struct RecentTracksResponse {
    recenttracks: RecentTracks,
}

#[derive(Debug, Default, Deserialize)]
struct RecentTracks {
    #[serde(default)]
    track: Vec<RecentTrackEntry>,
}

#[derive(Debug, Deserialize)]
struct RecentTrackEntry {
    name: String,
    artist: ArtistRef,
    #[serde(rename = "@attr", default)]
    attr: Option<TrackAttr>,
}

#[derive(Debug, Default, Deserialize)]
struct ArtistRef {
    #[serde(rename = "#text", default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct TrackAttr {
    #[serde(default)]
    nowplaying: Option<String>,
}
