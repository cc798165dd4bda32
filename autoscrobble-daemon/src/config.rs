//! Configuration management
//!
//! Two files: `config.toml` (daemon settings, created with defaults on first
//! run) and `credentials.json` (API secrets, never auto-created).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Default duty cycle between recognition attempts (seconds)
pub const DEFAULT_DUTY_CYCLE_SECS: u64 = 60;

/// Daemon settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path this settings file was loaded from
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Seconds between recording attempts, net of processing time
    pub duty_cycle_secs: u64,

    /// Clip length per recognition attempt (seconds)
    pub record_seconds: f32,

    /// Input source: "auto", a device index, or a device name substring.
    /// Unset means the default input device.
    pub input_source: Option<String>,

    /// Write each raw recognition payload to last_result.json
    pub dump_last_result: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            duty_cycle_secs: DEFAULT_DUTY_CYCLE_SECS,
            record_seconds: 10.0,
            input_source: None,
            dump_last_result: false,
        }
    }
}

impl Settings {
    /// Load settings from file, or create the default file
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let mut settings: Settings =
                toml::from_str(&contents).context("Failed to parse config file")?;

            settings.config_path = config_path;
            Ok(settings)
        } else {
            let settings = Self::default();
            settings.save().context("Failed to save default config")?;
            Ok(settings)
        }
    }

    /// Save settings to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&self.config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("autoscrobble")
            .join("config.toml")
    }
}

/// Contents of credentials.json
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub lastfm: LastfmCredentials,

    #[serde(default)]
    pub shazam: ShazamCredentials,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastfmCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShazamCredentials {
    /// Detection API key; some self-hosted endpoints accept none
    #[serde(default)]
    pub api_key: Option<String>,

    /// Non-default detection endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Locate credentials.json: explicit path, then the working directory, then
/// the user config directory.
pub fn find_credentials_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        bail!("Credentials file not found: {}", path.display());
    }

    let cwd_path = PathBuf::from("credentials.json");
    if cwd_path.is_file() {
        return Ok(cwd_path);
    }

    let config_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autoscrobble")
        .join("credentials.json");
    if config_path.is_file() {
        return Ok(config_path);
    }

    bail!(
        "Could not find credentials.json in {} or {}. Please provide your credentials.json.",
        cwd_path.display(),
        config_path.display()
    )
}

/// Load and parse credentials
pub fn load_credentials(explicit: Option<&Path>) -> Result<Credentials> {
    let path = find_credentials_path(explicit)?;

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.duty_cycle_secs, 60);
        assert_eq!(settings.record_seconds, 10.0);
        assert!(settings.input_source.is_none());
        assert!(!settings.dump_last_result);
    }

    #[test]
    fn test_settings_roundtrip() {
        let mut settings = Settings::default();
        settings.duty_cycle_secs = 30;
        settings.input_source = Some("Microphone".to_string());

        let serialized = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.duty_cycle_secs, 30);
        assert_eq!(parsed.input_source.as_deref(), Some("Microphone"));
    }

    #[test]
    fn test_credentials_parsing() {
        let json = r#"{
            "lastfm": {
                "api_key": "k",
                "api_secret": "s",
                "username": "u",
                "password": "p"
            },
            "shazam": {
                "api_key": "rapid-key"
            }
        }"#;

        let creds: Credentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.lastfm.username, "u");
        assert_eq!(creds.shazam.api_key.as_deref(), Some("rapid-key"));
        assert!(creds.shazam.endpoint.is_none());
    }

    #[test]
    fn test_credentials_shazam_block_optional() {
        let json = r#"{
            "lastfm": {
                "api_key": "k",
                "api_secret": "s",
                "username": "u",
                "password": "p"
            }
        }"#;

        let creds: Credentials = serde_json::from_str(json).unwrap();
        assert!(creds.shazam.api_key.is_none());
    }

    #[test]
    fn test_explicit_credentials_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{}").unwrap();

        let found = find_credentials_path(Some(&path)).unwrap();
        assert_eq!(found, path);

        let missing = dir.path().join("nope.json");
        assert!(find_credentials_path(Some(&missing)).is_err());
    }
}
