//! WAV encoding with hound
//!
//! Used for debug dumps of captured clips.

use std::io::Cursor;

use hound::{WavSpec, WavWriter};

use crate::error::{AudioError, Result};

/// Encode mono i16 PCM samples as an in-memory WAV file
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer =
        WavWriter::new(&mut cursor, spec).map_err(|e| AudioError::WavError(e.to_string()))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| AudioError::WavError(e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| AudioError::WavError(e.to_string()))?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wav_header() {
        let bytes = encode_wav(&[0, 1000, -1000, i16::MAX], 44_100).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // 44-byte canonical header plus 2 bytes per sample
        assert_eq!(bytes.len(), 44 + 4 * 2);
    }

    #[test]
    fn test_encode_empty_clip() {
        let bytes = encode_wav(&[], 44_100).unwrap();
        assert_eq!(bytes.len(), 44);
    }
}
