//! Recognition payload types
//!
//! The detection endpoint returns a deeply nested JSON document where any
//! field may be absent; everything here decodes totally via defaults so a
//! malformed payload degrades to "nothing recognized" rather than a parse
//! failure.

use serde::{Deserialize, Serialize};

/// One recognition attempt's payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognitionResult {
    #[serde(default)]
    pub track: Option<Track>,
}

/// The recognized track block
///
/// `subtitle` carries the artist name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub subtitle: Option<String>,

    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A metadata section of the track block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "type", default)]
    pub section_type: Option<String>,

    #[serde(default)]
    pub metadata: Vec<MetadataItem>,
}

/// A labeled metadata entry, e.g. `{"title": "Album", "text": "..."}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataItem {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub text: Option<String>,
}
