//! Audio troubleshooting tool
//!
//! Diagnoses device access issues when the scrobbler runs as a service:
//! prints the relevant environment, lists input devices, records a
//! one-second test clip from the default device, and writes it to
//! troubleshoot.wav for listening back.

use anyhow::{bail, Context, Result};

use autoscrobble_audio::{encode_wav, AudioCapture, AudioConfig, TARGET_SAMPLE_RATE};

fn main() -> Result<()> {
    println!("Autoscrobble Audio Troubleshooting");
    println!("{}", "=".repeat(40));

    println!("\n=== Environment Check ===");
    for var in [
        "USER",
        "XDG_RUNTIME_DIR",
        "PULSE_RUNTIME_PATH",
        "DBUS_SESSION_BUS_ADDRESS",
    ] {
        println!(
            "{}: {}",
            var,
            std::env::var(var).unwrap_or_else(|_| "Not set".to_string())
        );
    }

    println!("\n=== Audio Devices Check ===");
    let devices = AudioCapture::list_devices().context("Error querying audio devices")?;
    println!("Input devices: {}", devices.len());
    if devices.is_empty() {
        bail!("No input devices found!");
    }
    for device in &devices {
        let default_marker = if device.is_default { " (default)" } else { "" };
        println!("  [{}] {}{}", device.index, device.name, default_marker);
        println!("      Channels: {}", device.channels);
        println!("      Sample rate: {}", device.sample_rate);
    }

    println!("\n=== Audio Recording Test ===");
    println!("Attempting to record 1 second of audio...");
    let capture = AudioCapture::new(AudioConfig {
        record_seconds: 1.0,
        ..AudioConfig::default()
    })
    .context("Error selecting input device")?;

    let samples = capture.record().context("Audio recording failed")?;
    let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
    println!("✓ Audio recording successful");
    println!("  Recorded {} samples, peak level {}", samples.len(), peak);
    if peak == 0 {
        println!("  Warning: clip is silent, check the input source volume");
    }

    let wav = encode_wav(&samples, TARGET_SAMPLE_RATE)?;
    std::fs::write("troubleshoot.wav", &wav)?;
    println!(
        "  Wrote troubleshoot.wav ({} bytes) for listening back",
        wav.len()
    );

    println!("\n✓ All audio checks passed! Autoscrobble should work.");
    Ok(())
}
