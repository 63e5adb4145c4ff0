use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use ttsbench_core::audio::{clipping_percent, read_audio, rms_db, CLIPPING_THRESHOLD};
use ttsbench_core::metrics_api::{CollectContext, Collector, Measurement};
use ttsbench_core::model::MetricMap;
use ttsbench_core::process::run_command_unchecked;

/// Duration, RMS level and clipping from the decoded signal, plus integrated
/// loudness when ffmpeg is installed.
pub struct SignalCollector {
    pub ffmpeg_bin: String,
}

impl SignalCollector {
    pub fn new(ffmpeg_bin: impl Into<String>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
        }
    }

    async fn lufs(&self, path: &Path) -> Option<f64> {
        let args: Vec<String> = [
            "-hide_banner",
            "-nostats",
            "-i",
            &path.display().to_string(),
            "-filter_complex",
            "ebur128=framelog=verbose",
            "-f",
            "null",
            "-",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        match run_command_unchecked(&self.ffmpeg_bin, &args, None).await {
            Ok(out) => parse_integrated_lufs(&String::from_utf8_lossy(&out.stderr)),
            Err(e) => {
                tracing::debug!(
                    event = "ttsbench.lufs.unavailable",
                    error = %e,
                    "Loudness not measured"
                );
                None
            }
        }
    }
}

/// The summary block comes after the per-frame log, so the last `I:` wins.
pub fn parse_integrated_lufs(stderr: &str) -> Option<f64> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE
        .get_or_init(|| Regex::new(r"I:\s*(-?[\d.]+)\s*LUFS").ok())
        .as_ref()?;
    re.captures_iter(stderr)
        .filter_map(|c| c.get(1)?.as_str().parse::<f64>().ok())
        .last()
}

#[async_trait]
impl Collector for SignalCollector {
    fn name(&self) -> &'static str {
        "signal"
    }

    async fn collect(&self, ctx: &CollectContext<'_>) -> anyhow::Result<Measurement> {
        let audio = read_audio(ctx.audio_path)?;
        let mut m = MetricMap::new();
        m.insert("duration_s".into(), audio.duration_seconds());
        m.insert("rms_db".into(), rms_db(&audio.samples));
        m.insert(
            "clipping_pct".into(),
            clipping_percent(&audio.samples, CLIPPING_THRESHOLD),
        );
        if let Some(lufs) = self.lufs(ctx.audio_path).await {
            m.insert("lufs".into(), lufs);
        }
        Ok(Measurement::Computed(m))
    }
}
