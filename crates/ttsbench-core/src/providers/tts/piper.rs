use super::{finish_synth, output_path, TtsModel};
use crate::errors::BenchError;
use crate::model::{ModelCapabilities, SynthConfig, SynthResult};
use crate::process::{command_exists, run_command};
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;

const PIPER_BIN: &str = "piper";

/// Piper through its local CLI. Needs a `.onnx` voice in `config.voice`.
pub struct PiperModel;

impl PiperModel {
    pub fn build_args(config: &SynthConfig, voice: &str, out_file: &Path) -> Vec<String> {
        let mut args = vec![
            "--model".to_owned(),
            voice.to_owned(),
            "--output_file".to_owned(),
            out_file.display().to_string(),
        ];
        if let Some(speaker) = config.speaker.as_deref().filter(|s| !s.is_empty()) {
            args.push("--speaker".to_owned());
            args.push(speaker.to_owned());
        }
        args
    }
}

#[async_trait]
impl TtsModel for PiperModel {
    fn name(&self) -> &'static str {
        "piper"
    }

    fn description(&self) -> &'static str {
        "Piper local CLI"
    }

    fn capabilities(&self) -> ModelCapabilities {
        ModelCapabilities {
            languages: vec!["en".into(), "es".into()],
            supports_cloning: false,
            supports_styles: false,
        }
    }

    fn is_available(&self) -> bool {
        command_exists(PIPER_BIN)
    }

    fn availability_help(&self) -> &'static str {
        "Install piper-tts and ensure `piper` is on PATH. Provide a .onnx voice file."
    }

    async fn synth(
        &self,
        text: &str,
        config: &SynthConfig,
        out_dir: &Path,
    ) -> anyhow::Result<SynthResult> {
        let voice = config
            .voice
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| BenchError::MissingConfig {
                model: self.name().into(),
                field: "voice".into(),
            })?;

        tokio::fs::create_dir_all(out_dir)
            .await
            .with_context(|| format!("failed to create {}", out_dir.display()))?;
        let out_file = output_path(out_dir);
        let args = Self::build_args(config, voice, &out_file);

        let start = Instant::now();
        run_command(PIPER_BIN, &args, Some(text)).await?;
        finish_synth(out_file, start.elapsed())
    }
}
