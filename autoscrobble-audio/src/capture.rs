//! Audio capture with cpal
//!
//! Records a fixed-length mono clip from the selected input device, once per
//! duty cycle. Multi-channel input is downmixed by taking the first channel
//! of each frame; averaging would cut amplitude in half when the microphone
//! only drives one channel.

use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Host, Sample, SampleFormat, StreamConfig};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{AudioError, Result};
use crate::resampler::Resampler;
use crate::AudioConfig;

/// Which input device to record from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    /// System default input device
    Default,
    /// Position in the input device list
    Index(usize),
    /// Case-insensitive name substring
    Name(String),
}

impl DeviceSelector {
    /// Parse a command-line device argument: `auto`, an index, or a name
    pub fn from_arg(arg: &str) -> Self {
        if arg.eq_ignore_ascii_case("auto") {
            Self::Default
        } else if let Ok(index) = arg.parse::<usize>() {
            Self::Index(index)
        } else {
            Self::Name(arg.to_string())
        }
    }
}

/// Audio input device information
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub is_default: bool,
    pub channels: u16,
    pub sample_rate: u32,
}

/// One-shot clip capture from a selected input device
pub struct AudioCapture {
    config: AudioConfig,
    device: Device,
    info: DeviceInfo,
}

impl AudioCapture {
    /// Select the configured device and prepare for capture
    pub fn new(config: AudioConfig) -> Result<Self> {
        if config.record_seconds <= 0.0 {
            return Err(AudioError::invalid_config(
                "Record duration must be positive",
            ));
        }
        if config.sample_rate == 0 {
            return Err(AudioError::invalid_config("Sample rate cannot be zero"));
        }

        let host = cpal::default_host();
        let (device, info) = select_device(&host, &config.device)?;

        Ok(Self {
            config,
            device,
            info,
        })
    }

    /// Information about the selected device
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// List all available input devices
    pub fn list_devices() -> Result<Vec<DeviceInfo>> {
        let host = cpal::default_host();
        Ok(enumerate_devices(&host)?
            .into_iter()
            .map(|(_, info)| info)
            .collect())
    }

    /// Print the input device list in formatted output
    pub fn print_devices() -> Result<()> {
        let devices = Self::list_devices()?;

        if devices.is_empty() {
            println!("No input devices found.");
            return Ok(());
        }

        println!("\nAvailable input devices:");
        println!("{}", "=".repeat(50));

        for device in &devices {
            let default_marker = if device.is_default { " (default)" } else { "" };
            println!("  [{}] {}{}", device.index, device.name, default_marker);
            println!("      Channels: {}", device.channels);
            println!("      Sample Rate: {} Hz\n", device.sample_rate);
        }

        println!("Usage:");
        println!("  --input-source auto          # Use default device");
        println!("  --input-source 0             # Use device by index");
        println!("  --input-source 'Microphone'  # Use device by name (partial match)");

        Ok(())
    }

    /// Record one clip and return it as 44.1 kHz mono i16 PCM
    ///
    /// Blocks for the configured clip duration.
    pub fn record(&self) -> Result<Vec<i16>> {
        let supported = self
            .device
            .default_input_config()
            .map_err(|e| AudioError::device(format!("Failed to get device config: {}", e)))?;

        let source_rate = supported.sample_rate().0;
        let source_channels = supported.channels() as usize;
        let sample_format = supported.sample_format();
        let stream_config: StreamConfig = supported.config();

        let needed = (self.config.record_seconds * source_rate as f32) as usize;
        let samples: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::with_capacity(needed)));

        debug!(
            device = %self.info.name,
            source_rate,
            source_channels,
            format = ?sample_format,
            "Starting clip capture"
        );

        let err_fn = |err| warn!("Audio stream error: {}", err);

        let stream = match sample_format {
            SampleFormat::F32 => {
                let samples = Arc::clone(&samples);
                self.device.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        push_frames(data, &samples, source_channels, needed)
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::I16 => {
                let samples = Arc::clone(&samples);
                self.device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        push_frames(data, &samples, source_channels, needed)
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::U16 => {
                let samples = Arc::clone(&samples);
                self.device.build_input_stream(
                    &stream_config,
                    move |data: &[u16], _: &cpal::InputCallbackInfo| {
                        push_frames(data, &samples, source_channels, needed)
                    },
                    err_fn,
                    None,
                )
            }
            other => {
                return Err(AudioError::stream(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        }
        .map_err(|e| AudioError::stream(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| AudioError::stream(format!("Failed to start stream: {}", e)))?;

        std::thread::sleep(Duration::from_secs_f32(self.config.record_seconds));
        drop(stream);

        let mut captured = std::mem::take(&mut *samples.lock());
        captured.truncate(needed);

        debug!(
            frames = captured.len(),
            seconds = captured.len() as f32 / source_rate as f32,
            "Clip captured"
        );

        let mut resampler = Resampler::new(source_rate, self.config.sample_rate)?;
        let resampled = resampler.process_clip(&captured)?;

        Ok(pcm_i16(&resampled))
    }
}

/// Convert f32 samples in [-1.0, 1.0] to i16 PCM
pub fn pcm_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

fn push_frames<T>(data: &[T], samples: &Mutex<Vec<f32>>, channels: usize, needed: usize)
where
    T: Sample,
    f32: FromSample<T>,
{
    let mut buf = samples.lock();
    if buf.len() >= needed {
        return;
    }
    for frame in data.chunks(channels.max(1)) {
        if buf.len() >= needed {
            break;
        }
        buf.push(f32::from_sample(frame[0]));
    }
}

fn enumerate_devices(host: &Host) -> Result<Vec<(Device, DeviceInfo)>> {
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let mut devices = Vec::new();
    for (index, device) in host
        .input_devices()
        .map_err(|e| AudioError::device(format!("Failed to enumerate devices: {}", e)))?
        .enumerate()
    {
        let name = device
            .name()
            .unwrap_or_else(|_| format!("Unknown Device {}", index));

        let (channels, sample_rate) = device
            .default_input_config()
            .map(|c| (c.channels(), c.sample_rate().0))
            .unwrap_or((0, 0));

        let is_default = default_name.as_deref() == Some(name.as_str());

        devices.push((
            device,
            DeviceInfo {
                index,
                name,
                is_default,
                channels,
                sample_rate,
            },
        ));
    }

    Ok(devices)
}

fn select_device(host: &Host, selector: &DeviceSelector) -> Result<(Device, DeviceInfo)> {
    let mut devices = enumerate_devices(host)?;

    if devices.is_empty() {
        return Err(AudioError::device("No input devices found"));
    }

    match selector {
        DeviceSelector::Default => {
            let position = devices
                .iter()
                .position(|(_, info)| info.is_default)
                .unwrap_or(0);
            Ok(devices.swap_remove(position))
        }
        DeviceSelector::Index(index) => {
            if *index >= devices.len() {
                return Err(AudioError::device(format!(
                    "Device index {} out of range",
                    index
                )));
            }
            Ok(devices.swap_remove(*index))
        }
        DeviceSelector::Name(query) => {
            let needle = query.to_lowercase();
            match devices
                .iter()
                .position(|(_, info)| info.name.to_lowercase().contains(&needle))
            {
                Some(position) => {
                    let (device, device_info) = devices.swap_remove(position);
                    info!(
                        index = device_info.index,
                        name = %device_info.name,
                        "Found matching device"
                    );
                    Ok((device, device_info))
                }
                None => {
                    let available: Vec<String> = devices
                        .iter()
                        .map(|(_, info)| format!("[{}] {}", info.index, info.name))
                        .collect();
                    info!("Available input devices: {}", available.join(", "));
                    Err(AudioError::DeviceNotFound(query.clone()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_from_arg() {
        assert_eq!(DeviceSelector::from_arg("auto"), DeviceSelector::Default);
        assert_eq!(DeviceSelector::from_arg("AUTO"), DeviceSelector::Default);
        assert_eq!(DeviceSelector::from_arg("3"), DeviceSelector::Index(3));
        assert_eq!(
            DeviceSelector::from_arg("Microphone"),
            DeviceSelector::Name("Microphone".to_string())
        );
    }

    #[test]
    fn test_pcm_i16_conversion() {
        let pcm = pcm_i16(&[0.0, 1.0, -1.0, 2.0]);
        assert_eq!(pcm[0], 0);
        assert_eq!(pcm[1], i16::MAX);
        assert_eq!(pcm[2], -i16::MAX);
        // Out-of-range input is clamped
        assert_eq!(pcm[3], i16::MAX);
    }

    #[test]
    fn test_config_defaults() {
        let config = AudioConfig::default();
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.device, DeviceSelector::Default);
        assert!(config.record_seconds > 0.0);
    }
}
