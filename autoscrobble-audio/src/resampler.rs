//! Audio resampling with rubato
//!
//! Converts captured audio from the device's native rate to the 44.1 kHz
//! mono format the recognition service expects.

use rubato::{
    Resampler as RubatoResampler, SincFixedIn, SincInterpolationParameters,
    SincInterpolationType, WindowFunction,
};

use crate::error::{AudioError, Result};

/// Mono resampler for converting a whole captured clip to the target rate
pub struct Resampler {
    source_rate: u32,
    chunk_size: usize,
    resampler: Option<SincFixedIn<f32>>,
}

impl Resampler {
    /// Create new resampler
    ///
    /// # Arguments
    ///
    /// * `source_rate` - Source sample rate (e.g., 48000)
    /// * `target_rate` - Target sample rate (typically 44100)
    pub fn new(source_rate: u32, target_rate: u32) -> Result<Self> {
        if source_rate == 0 || target_rate == 0 {
            return Err(AudioError::invalid_config("Sample rate cannot be zero"));
        }

        // Process 100ms at a time
        let chunk_size = (source_rate as f32 * 0.1) as usize;

        // If rates are the same, no resampling needed
        let resampler = if source_rate != target_rate {
            Some(Self::create_resampler(source_rate, target_rate, chunk_size)?)
        } else {
            None
        };

        Ok(Self {
            source_rate,
            chunk_size,
            resampler,
        })
    }

    fn create_resampler(
        source_rate: u32,
        target_rate: u32,
        chunk_size: usize,
    ) -> Result<SincFixedIn<f32>> {
        // High-quality sinc interpolation
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let resampler = SincFixedIn::<f32>::new(
            target_rate as f64 / source_rate as f64,
            2.0, // max_resample_ratio_relative
            params,
            chunk_size,
            1, // mono, downmix happens before resampling
        )
        .map_err(|e| AudioError::ResampleError(format!("Failed to create resampler: {:?}", e)))?;

        Ok(resampler)
    }

    /// Resample a complete mono clip to the target rate
    ///
    /// The fixed-input-size resampler consumes 100ms chunks; the tail of the
    /// clip is zero-padded up to one chunk.
    pub fn process_clip(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        // If no resampling needed, return input as-is
        if self.resampler.is_none() {
            return Ok(input.to_vec());
        }

        if input.is_empty() {
            return Ok(Vec::new());
        }

        let resampler = self.resampler.as_mut().unwrap();
        let mut output = Vec::new();

        for chunk in input.chunks(self.chunk_size) {
            let planar_input = if chunk.len() == self.chunk_size {
                vec![chunk.to_vec()]
            } else {
                // Zero-pad the final partial chunk
                let mut padded = chunk.to_vec();
                padded.resize(self.chunk_size, 0.0);
                vec![padded]
            };

            let planar_output = resampler
                .process(&planar_input, None)
                .map_err(|e| AudioError::ResampleError(format!("Resampling failed: {:?}", e)))?;

            output.extend_from_slice(&planar_output[0]);
        }

        Ok(output)
    }

    /// Source sample rate this resampler was built for
    pub fn source_rate(&self) -> u32 {
        self.source_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_resampling_needed() {
        let mut resampler = Resampler::new(44100, 44100).unwrap();
        let input = vec![0.5, 0.3, 0.1, -0.2];
        let output = resampler.process_clip(&input).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_resampling_48k_to_44_1k() {
        let mut resampler = Resampler::new(48000, 44100).unwrap();

        // One second of a 440 Hz tone at 48kHz
        let input: Vec<f32> = (0..48000)
            .map(|i| (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / 48000.0).sin() * 0.5)
            .collect();

        let output = resampler.process_clip(&input).unwrap();

        // Expect roughly 44100 samples out (48000 * 44100/48000)
        assert!(
            output.len() > 43000 && output.len() < 45500,
            "Output length {} not in expected range (expected ~44100)",
            output.len()
        );
    }

    #[test]
    fn test_partial_tail_chunk() {
        let mut resampler = Resampler::new(48000, 44100).unwrap();

        // 250ms: two full 100ms chunks plus a padded 50ms tail
        let input = vec![0.1f32; 12000];
        let output = resampler.process_clip(&input).unwrap();

        // Three chunks worth of output (~4410 each)
        assert!(
            output.len() > 12500 && output.len() < 14000,
            "Output length {} not in expected range (expected ~13230)",
            output.len()
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(Resampler::new(0, 44100).is_err());
        assert!(Resampler::new(48000, 0).is_err());
    }
}
