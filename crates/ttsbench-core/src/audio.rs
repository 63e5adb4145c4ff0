use anyhow::Context;
use std::path::Path;

pub const CLIPPING_THRESHOLD: f32 = 0.99;

/// Decoded mono signal in [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq)]
pub struct Audio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Audio {
    pub fn duration_seconds(&self) -> f64 {
        duration_seconds(&self.samples, self.sample_rate)
    }
}

/// Reads a WAV file, averaging channels down to mono.
pub fn read_audio(path: &Path) -> anyhow::Result<Audio> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open audio {}", path.display()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("failed to decode {}", path.display()))?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("failed to decode {}", path.display()))?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(Audio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Writes mono float samples as a 32-bit float WAV, creating parent
/// directories.
pub fn write_audio(path: &Path, samples: &[f32], sample_rate: u32) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create audio {}", path.display()))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

pub fn duration_seconds(samples: &[f32], sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    samples.len() as f64 / sample_rate as f64
}

/// RMS level in dBFS. Negative infinity for silence or an empty signal.
pub fn rms_db(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return f64::NEG_INFINITY;
    }
    let mean_sq =
        samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / samples.len() as f64;
    let rms = mean_sq.sqrt();
    if rms == 0.0 {
        return f64::NEG_INFINITY;
    }
    20.0 * rms.log10()
}

pub fn clipping_percent(samples: &[f32], threshold: f32) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let clipped = samples.iter().filter(|s| s.abs() >= threshold).count();
    clipped as f64 / samples.len() as f64 * 100.0
}

pub fn sine_tone(freq_hz: f32, seconds: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    let n = (seconds * sample_rate as f32) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * std::f32::consts::PI * freq_hz * t).sin()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipping_of_silence_is_zero() {
        assert_eq!(clipping_percent(&[0.0; 64], CLIPPING_THRESHOLD), 0.0);
        assert_eq!(clipping_percent(&[], CLIPPING_THRESHOLD), 0.0);
    }

    #[test]
    fn clipping_half_the_samples() {
        let samples = [1.0, -0.995, 0.2, 0.0, 0.99, -1.0, 0.5, -0.1];
        assert_eq!(clipping_percent(&samples, CLIPPING_THRESHOLD), 50.0);
    }

    #[test]
    fn rms_db_silence_is_negative_infinity() {
        assert_eq!(rms_db(&[0.0; 100]), f64::NEG_INFINITY);
        assert_eq!(rms_db(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn rms_db_of_signal_is_finite() {
        let db = rms_db(&[0.5, -0.5, 0.5, -0.5]);
        assert!(db.is_finite());
        assert!((db - 20.0 * 0.5f64.log10()).abs() < 1e-9);
    }

    #[test]
    fn sine_round_trip_through_wav() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("tone.wav");
        write_audio(&path, &sine_tone(440.0, 1.0, 16000, 0.1), 16000)?;

        let audio = read_audio(&path)?;
        let duration = audio.duration_seconds();
        assert!((0.9..=1.1).contains(&duration), "duration {duration}");
        assert_eq!(clipping_percent(&audio.samples, CLIPPING_THRESHOLD), 0.0);
        Ok(())
    }

    #[test]
    fn stereo_int_pcm_is_mixed_to_mono() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut w = hound::WavWriter::create(&path, spec)?;
        for _ in 0..4 {
            w.write_sample(i16::MAX)?;
            w.write_sample(0i16)?;
        }
        w.finalize()?;

        let audio = read_audio(&path)?;
        assert_eq!(audio.samples.len(), 4);
        assert!(audio.samples.iter().all(|s| (s - 0.5).abs() < 1e-3));
        Ok(())
    }
}
