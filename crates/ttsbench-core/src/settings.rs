use std::env;
use std::path::PathBuf;

/// Locations of the external tools the collectors shell out to.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolSettings {
    pub ffmpeg_bin: String,
    pub whisper_bin: String,
    pub whisper_model: Option<PathBuf>,
    pub speaker_embed_cmd: Option<String>,
    pub log_level: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            whisper_bin: "whisper-cli".to_string(),
            whisper_model: None,
            speaker_embed_cmd: None,
            log_level: "info".to_string(),
        }
    }
}

impl ToolSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = non_empty(get("TTSBENCH_FFMPEG")) {
            cfg.ffmpeg_bin = v;
        }
        if let Some(v) = non_empty(get("TTSBENCH_WHISPER_BIN")) {
            cfg.whisper_bin = v;
        }
        if let Some(v) = non_empty(get("TTSBENCH_WHISPER_MODEL")) {
            cfg.whisper_model = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty(get("TTSBENCH_SPEAKER_EMBED_CMD")) {
            cfg.speaker_embed_cmd = Some(v);
        }
        if let Some(v) = non_empty(get("TTSBENCH_LOG")) {
            cfg.log_level = v;
        }
        cfg
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
