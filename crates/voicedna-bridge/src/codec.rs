//! WAV marshalling for audio blocks.
//!
//! Blocks are written as 16-bit integer PCM. Reading accepts 8/16/24/32-bit
//! integer PCM and 32-bit float, normalized to `f32`.

use std::io;
use std::path::Path;

use crate::block::AudioBlock;
use crate::error::{DecodeError, EncodeError};

/// Bit depth of every file this codec writes.
pub const BITS_PER_SAMPLE: u16 = 16;

const I16_SCALE: f32 = 32768.0;

/// Upper bound on up-front buffer reservation; larger files grow as they are read.
const MAX_PREALLOC_SAMPLES: usize = 1 << 22;

/// Writes `block` to a newly created WAV file at `path`.
///
/// Samples outside `[-1.0, 1.0]` saturate at the 16-bit limits.
pub fn encode(block: &AudioBlock, path: &Path) -> Result<(), EncodeError> {
    let spec = wav_spec(block)?;

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| io_failure(path, e))?;
    for sample in block.interleaved() {
        writer
            .write_sample(quantize(sample))
            .map_err(|e| io_failure(path, e))?;
    }
    writer.finalize().map_err(|e| io_failure(path, e))
}

/// Reads the WAV file at `path` into a new block.
///
/// The hints are advisory. Buffers are sized from the file header, and the
/// returned geometry is whatever the file contains.
pub fn decode(
    path: &Path,
    channel_hint: usize,
    sample_hint: usize,
) -> Result<AudioBlock, DecodeError> {
    let mut reader = hound::WavReader::open(path).map_err(|e| match e {
        hound::Error::IoError(ref io) if io.kind() == io::ErrorKind::NotFound => {
            DecodeError::NotFound {
                path: path.to_path_buf(),
            }
        }
        other => unreadable(path, other),
    })?;

    let spec = reader.spec();
    let num_channels = usize::from(spec.channels);
    if num_channels == 0 {
        return Err(DecodeError::Unreadable {
            path: path.to_path_buf(),
            reason: "zero channels".to_string(),
        });
    }

    let expected = match reader.len() {
        0 => channel_hint.max(1).saturating_mul(sample_hint),
        n => n as usize,
    };
    let mut interleaved = Vec::with_capacity(expected.min(MAX_PREALLOC_SAMPLES));
    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => {
            for s in reader.samples::<f32>() {
                interleaved.push(s.map_err(|e| unreadable(path, e))?);
            }
        }
        (hound::SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let scale = (1u64 << (bits - 1)) as f32;
            for s in reader.samples::<i32>() {
                interleaved.push(s.map_err(|e| unreadable(path, e))? as f32 / scale);
            }
        }
        (format, bits) => {
            return Err(DecodeError::Unreadable {
                path: path.to_path_buf(),
                reason: format!("unsupported sample format {:?} at {} bits", format, bits),
            });
        }
    }

    if interleaved.len() < num_channels {
        return Err(DecodeError::EmptyResult {
            path: path.to_path_buf(),
        });
    }

    Ok(AudioBlock::from_interleaved(
        &interleaved,
        num_channels,
        f64::from(spec.sample_rate),
    ))
}

fn wav_spec(block: &AudioBlock) -> Result<hound::WavSpec, EncodeError> {
    let channels = u16::try_from(block.num_channels())
        .ok()
        .filter(|&c| c > 0)
        .ok_or_else(|| EncodeError::UnsupportedFormat {
            reason: format!("cannot store {} channels", block.num_channels()),
        })?;

    let rate = block.sample_rate().round();
    if !rate.is_finite() || rate < 1.0 || rate > f64::from(u32::MAX) {
        return Err(EncodeError::UnsupportedFormat {
            reason: format!("sample rate {} out of range", block.sample_rate()),
        });
    }

    let len = block.num_samples();
    if block.channels().iter().any(|c| c.len() != len) {
        return Err(EncodeError::UnsupportedFormat {
            reason: "channels differ in length".to_string(),
        });
    }

    Ok(hound::WavSpec {
        channels,
        sample_rate: rate as u32,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    })
}

fn quantize(sample: f32) -> i16 {
    // NaN maps to zero via the saturating cast.
    (sample * I16_SCALE)
        .round()
        .clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

fn io_failure(path: &Path, err: hound::Error) -> EncodeError {
    let source = match err {
        hound::Error::IoError(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    };
    EncodeError::IoFailure {
        path: path.to_path_buf(),
        source,
    }
}

fn unreadable(path: &Path, err: hound::Error) -> DecodeError {
    DecodeError::Unreadable {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STEP: f32 = 1.0 / 32768.0 + 1e-7;

    fn ramp_block(channels: usize, samples: usize) -> AudioBlock {
        let data = (0..channels)
            .map(|ch| {
                (0..samples)
                    .map(|i| ((i as f32 / samples as f32) * 2.0 - 1.0) * (ch as f32 + 1.0) / channels as f32)
                    .collect()
            })
            .collect();
        AudioBlock::from_channels(data, 48000.0).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_order_and_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rt.wav");
        let block = ramp_block(3, 257);

        encode(&block, &path).unwrap();
        let decoded = decode(&path, 3, 257).unwrap();

        assert_eq!(decoded.num_channels(), 3);
        assert_eq!(decoded.num_samples(), 257);
        assert_eq!(decoded.sample_rate(), 48000.0);
        for ch in 0..3 {
            for (a, b) in block.channel(ch).unwrap().iter().zip(decoded.channel(ch).unwrap()) {
                assert!((a - b).abs() <= STEP, "channel {} drifted: {} vs {}", ch, a, b);
            }
        }
        // decode never deletes its source
        assert!(path.exists());
    }

    #[test]
    fn test_encode_saturates_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hot.wav");
        let block = AudioBlock::from_channels(vec![vec![2.0, -2.0, 0.0]], 22050.0).unwrap();

        encode(&block, &path).unwrap();
        let decoded = decode(&path, 1, 3).unwrap();
        let ch = decoded.channel(0).unwrap();
        assert!((ch[0] - 32767.0 / 32768.0).abs() < 1e-6);
        assert_eq!(ch[1], -1.0);
        assert_eq!(ch[2], 0.0);
    }

    #[test]
    fn test_encode_rejects_bad_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.wav");
        let block = AudioBlock::silence(2, 16, 0.0);

        let err = encode(&block, &path).unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedFormat { .. }));
        assert!(!path.exists());

        let block = AudioBlock::silence(2, 16, f64::NAN);
        assert!(matches!(
            encode(&block, &path),
            Err(EncodeError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_encode_missing_directory_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.wav");
        let err = encode(&AudioBlock::silence(1, 4, 44100.0), &path).unwrap_err();
        assert!(matches!(err, EncodeError::IoFailure { .. }));
    }

    #[test]
    fn test_decode_ignores_extreme_hints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.wav");
        let block = AudioBlock::from_channels(vec![vec![0.5, -0.5, 0.25, -0.25]], 8000.0).unwrap();
        encode(&block, &path).unwrap();

        for (channels, samples) in [(usize::MAX / 2, 4), (usize::MAX, usize::MAX), (1, usize::MAX)] {
            let decoded = decode(&path, channels, samples).unwrap();
            assert_eq!(decoded.num_channels(), 1);
            assert_eq!(decoded.num_samples(), 4);
        }
    }

    #[test]
    fn test_decode_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode(&dir.path().join("nope.wav"), 2, 64).unwrap_err();
        assert!(matches!(err, DecodeError::NotFound { .. }));
    }

    #[test]
    fn test_decode_garbage_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();
        let err = decode(&path, 2, 64).unwrap_err();
        assert!(matches!(err, DecodeError::Unreadable { .. }));
    }

    #[test]
    fn test_decode_zero_samples_is_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        encode(&AudioBlock::silence(2, 0, 44100.0), &path).unwrap();
        let err = decode(&path, 2, 0).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyResult { .. }));
    }

    #[test]
    fn test_decode_float_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [0.5f32, -0.5, 0.25, -0.25] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = decode(&path, 1, 1).unwrap();
        assert_eq!(decoded.num_channels(), 2);
        assert_eq!(decoded.channel(0).unwrap(), &[0.5, 0.25]);
        assert_eq!(decoded.channel(1).unwrap(), &[-0.5, -0.25]);
    }
}
