use super::{finish_synth, output_path, TtsModel};
use crate::model::{ModelCapabilities, SynthConfig, SynthResult};
use crate::process::{command_exists, run_command};
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;

const TTS_BIN: &str = "tts";
pub const DEFAULT_XTTS_MODEL: &str = "tts_models/multilingual/multi-dataset/xtts_v2";

/// Coqui XTTS v2 through the `tts` command shipped with the Coqui package.
pub struct CoquiXttsModel;

impl CoquiXttsModel {
    pub fn build_args(text: &str, config: &SynthConfig, out_file: &Path) -> Vec<String> {
        let mut args = vec![
            "--text".to_owned(),
            text.to_owned(),
            "--out_path".to_owned(),
            out_file.display().to_string(),
        ];

        match config.model_path.as_deref().filter(|p| !p.is_empty()) {
            Some(model_path) => {
                args.push("--model_path".to_owned());
                args.push(model_path.to_owned());
                // Fine-tuned checkpoints ship their config alongside.
                let sibling = Path::new(model_path).with_file_name("config.json");
                if sibling.exists() {
                    args.push("--config_path".to_owned());
                    args.push(sibling.display().to_string());
                }
            }
            None => {
                args.push("--model_name".to_owned());
                args.push(
                    config
                        .model_name
                        .clone()
                        .unwrap_or_else(|| DEFAULT_XTTS_MODEL.to_owned()),
                );
            }
        }

        if let Some(wav) = config.speaker_wav.as_deref().filter(|s| !s.is_empty()) {
            args.push("--speaker_wav".to_owned());
            args.push(wav.to_owned());
        }
        args.push("--language_idx".to_owned());
        args.push(config.language.clone().unwrap_or_else(|| "en".to_owned()));
        args
    }
}

#[async_trait]
impl TtsModel for CoquiXttsModel {
    fn name(&self) -> &'static str {
        "coqui_xtts_v2"
    }

    fn description(&self) -> &'static str {
        "Coqui XTTS v2 via TTS library"
    }

    fn capabilities(&self) -> ModelCapabilities {
        ModelCapabilities {
            languages: vec!["en".into(), "es".into()],
            supports_cloning: true,
            supports_styles: true,
        }
    }

    fn is_available(&self) -> bool {
        command_exists(TTS_BIN)
    }

    fn availability_help(&self) -> &'static str {
        "Install Coqui TTS: pip install TTS. \
         Ensure the XTTS v2 model is available locally; pass model_name or model_path."
    }

    async fn synth(
        &self,
        text: &str,
        config: &SynthConfig,
        out_dir: &Path,
    ) -> anyhow::Result<SynthResult> {
        tokio::fs::create_dir_all(out_dir)
            .await
            .with_context(|| format!("failed to create {}", out_dir.display()))?;
        let out_file = output_path(out_dir);
        let args = Self::build_args(text, config, &out_file);

        let start = Instant::now();
        run_command(TTS_BIN, &args, None).await?;
        finish_synth(out_file, start.elapsed())
    }
}
