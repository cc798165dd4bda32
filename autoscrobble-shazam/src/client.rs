//! Detection endpoint client
//!
//! Speaks the Shazam-compatible `songs/v2/detect` shape: the request body is
//! base64-encoded 44.1 kHz mono s16le PCM, the response is the track payload
//! decoded by [`crate::types`].

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::{Result, ShazamError};
use crate::types::RecognitionResult;

const DETECT_URL: &str = "https://shazam.p.rapidapi.com/songs/v2/detect";
const USER_AGENT: &str = "autoscrobble/0.1.0 (https://github.com/autoscrobble/autoscrobble)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Song recognition API client
pub struct ShazamClient {
    http_client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl ShazamClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_endpoint(api_key, DETECT_URL.to_string())
    }

    /// Build a client against a non-default endpoint (self-hosted proxies)
    pub fn with_endpoint(api_key: String, endpoint: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ShazamError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            endpoint,
        })
    }

    /// Identify a clip of 44.1 kHz mono s16le PCM
    pub async fn recognize(&self, samples: &[i16]) -> Result<RecognitionResult> {
        let body = encode_payload(samples);

        tracing::debug!(
            samples = samples.len(),
            payload_bytes = body.len(),
            "Querying recognition API"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("content-type", "text/plain")
            .header("X-RapidAPI-Key", &self.api_key)
            .body(body)
            .send()
            .await
            .map_err(|e| ShazamError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(ShazamError::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ShazamError::ApiError(status.as_u16(), error_text));
        }

        let result: RecognitionResult = response
            .json()
            .await
            .map_err(|e| ShazamError::ParseError(e.to_string()))?;

        match &result.track {
            Some(track) => tracing::info!(
                title = track.title.as_deref().unwrap_or("?"),
                artist = track.subtitle.as_deref().unwrap_or("?"),
                "Track identified"
            ),
            None => tracing::debug!("Recognition returned no track"),
        }

        Ok(result)
    }
}

/// Base64 of little-endian s16 PCM, the detect endpoint's body format
fn encode_payload(samples: &[i16]) -> String {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    BASE64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ShazamClient::new("test_key".to_string());
        assert!(client.is_ok());
    }

    #[test]
    fn test_encode_payload_little_endian() {
        // i16 [0, 1] -> bytes [0x00, 0x00, 0x01, 0x00]
        assert_eq!(encode_payload(&[0, 1]), "AAABAA==");
    }

    #[test]
    fn test_encode_payload_empty() {
        assert_eq!(encode_payload(&[]), "");
    }

    #[test]
    fn test_decode_detect_response() {
        let json = r#"{
            "matches": [{"id": "x", "offset": 11.5}],
            "timestamp": 1700000000,
            "track": {
                "key": "12345",
                "title": "Test Song (Remix)",
                "subtitle": "Test Artist",
                "sections": [
                    {
                        "type": "SONG",
                        "metadata": [
                            {"title": "Album", "text": "Test Album"},
                            {"title": "Released", "text": "2020"}
                        ]
                    },
                    {"type": "VIDEO"}
                ]
            }
        }"#;

        let result: RecognitionResult = serde_json::from_str(json).unwrap();
        let track = result.track.unwrap();
        assert_eq!(track.title.as_deref(), Some("Test Song (Remix)"));
        assert_eq!(track.subtitle.as_deref(), Some("Test Artist"));
        assert_eq!(track.sections.len(), 2);
        assert_eq!(track.sections[0].section_type.as_deref(), Some("SONG"));
        assert!(track.sections[1].metadata.is_empty());
    }

    #[test]
    fn test_decode_no_match_response() {
        let result: RecognitionResult =
            serde_json::from_str(r#"{"matches": [], "timestamp": 1700000000}"#).unwrap();
        assert!(result.track.is_none());
    }
}
