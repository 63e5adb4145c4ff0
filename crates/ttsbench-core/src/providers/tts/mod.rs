use crate::model::{MetricMap, ModelCapabilities, SynthConfig, SynthResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod coqui;
pub mod piper;
pub mod registry;
pub mod stub;

pub const AUDIO_FILE_NAME: &str = "audio.wav";

#[async_trait]
pub trait TtsModel: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn capabilities(&self) -> ModelCapabilities;

    /// Cheap local check (binary on PATH and similar). Never fails.
    fn is_available(&self) -> bool;
    fn availability_help(&self) -> &'static str;

    /// Synthesizes `text` into `out_dir/audio.wav`, creating `out_dir`.
    async fn synth(
        &self,
        text: &str,
        config: &SynthConfig,
        out_dir: &Path,
    ) -> anyhow::Result<SynthResult>;
}

pub fn output_path(out_dir: &Path) -> PathBuf {
    out_dir.join(AUDIO_FILE_NAME)
}

/// Wall-clock derived timing keys shared by every adapter.
pub fn timing_metrics(elapsed: Duration, audio_duration_s: f64) -> MetricMap {
    let total = elapsed.as_secs_f64();
    let rtf = if audio_duration_s > 0.0 {
        total / audio_duration_s
    } else {
        0.0
    };
    let mut m = MetricMap::new();
    m.insert("time_to_first_audio_ms".into(), total * 1000.0);
    m.insert("total_time_s".into(), total);
    m.insert("rtf".into(), rtf);
    m
}

/// Decodes the file an adapter just wrote and packages the result.
pub(crate) fn finish_synth(
    output_path: PathBuf,
    elapsed: Duration,
) -> anyhow::Result<SynthResult> {
    if !output_path.exists() {
        return Err(crate::errors::BenchError::MissingArtifact(output_path).into());
    }
    let audio = crate::audio::read_audio(&output_path)?;
    Ok(SynthResult {
        timings: timing_metrics(elapsed, audio.duration_seconds()),
        sample_rate: audio.sample_rate,
        audio_path: output_path,
        stats: MetricMap::new(),
    })
}
