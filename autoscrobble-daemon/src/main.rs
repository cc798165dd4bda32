//! Autoscrobble - passive audio scrobbler
//!
//! Records a short clip from an input device on a fixed duty cycle, asks a
//! recognition service what is playing, and scrobbles newly heard tracks to
//! Last.fm, deduplicating against both the in-process cache and the user's
//! remote listening history.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::info;

use autoscrobble_audio::{AudioCapture, AudioConfig, DeviceSelector};
use autoscrobble_daemon::config::{load_credentials, Settings};
use autoscrobble_daemon::pipeline::{LastfmOracle, Pipeline};
use autoscrobble_lastfm::LastfmClient;
use autoscrobble_shazam::ShazamClient;

#[derive(Parser, Debug)]
#[command(
    name = "autoscrobble",
    version,
    about = "Automatically scrobble songs to Last.fm using audio recognition"
)]
struct Args {
    /// Path to credentials.json file (default: auto-detect)
    #[arg(short = 'c', long)]
    credentials: Option<PathBuf>,

    /// Duty cycle in seconds between recording attempts (default: 60)
    #[arg(short = 'd', long)]
    duty_cycle: Option<u64>,

    /// Input source for recording: 'auto', 'list', device index, or device
    /// name substring (default: auto)
    #[arg(short = 'i', long)]
    input_source: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let args = Args::parse();

    if args
        .input_source
        .as_deref()
        .is_some_and(|source| source.eq_ignore_ascii_case("list"))
    {
        AudioCapture::print_devices()?;
        return Ok(());
    }

    info!("🎙️ Starting autoscrobble v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = Settings::load().context("Failed to load configuration")?;
    info!("📋 Configuration loaded from {}", settings.config_path.display());

    if let Some(duty_cycle) = args.duty_cycle {
        settings.duty_cycle_secs = duty_cycle;
    }
    if let Some(input_source) = args.input_source {
        settings.input_source = Some(input_source);
    }
    ensure!(
        settings.duty_cycle_secs > 0,
        "Duty cycle must be a positive number of seconds"
    );

    let credentials =
        load_credentials(args.credentials.as_deref()).context("Failed to load credentials")?;

    let selector = settings
        .input_source
        .as_deref()
        .map(DeviceSelector::from_arg)
        .unwrap_or(DeviceSelector::Default);

    let capture = AudioCapture::new(AudioConfig {
        record_seconds: settings.record_seconds,
        device: selector,
        ..AudioConfig::default()
    })
    .context("Error selecting input device")?;

    let device = capture.info();
    info!("Recording from device:");
    info!("  Name: {}", device.name);
    info!("  Index: {}", device.index);
    info!("  Samplerate: {}", device.sample_rate);
    info!("  Channels: {}", device.channels);

    let shazam_key = credentials.shazam.api_key.clone().unwrap_or_default();
    let shazam = match credentials.shazam.endpoint.clone() {
        Some(endpoint) => ShazamClient::with_endpoint(shazam_key, endpoint),
        None => ShazamClient::new(shazam_key),
    }
    .context("Failed to build recognition client")?;

    let mut lastfm = LastfmClient::new(
        credentials.lastfm.api_key.clone(),
        credentials.lastfm.api_secret.clone(),
    )
    .context("Failed to build Last.fm client")?;
    lastfm
        .authenticate(&credentials.lastfm.username, &credentials.lastfm.password)
        .await
        .context("Last.fm authentication failed")?;
    let lastfm = Arc::new(lastfm);

    let oracle = LastfmOracle::new(Arc::clone(&lastfm), credentials.lastfm.username.clone());

    let dump_path = settings
        .dump_last_result
        .then(|| PathBuf::from("last_result.json"));

    let mut pipeline = Pipeline::new(
        capture,
        shazam,
        oracle,
        Arc::clone(&lastfm),
        Duration::from_secs(settings.duty_cycle_secs),
    )
    .with_dump_path(dump_path);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    pipeline.run(shutdown_rx).await;

    info!("👋 Autoscrobble stopped");

    Ok(())
}
