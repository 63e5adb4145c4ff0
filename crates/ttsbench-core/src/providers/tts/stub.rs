use super::TtsModel;
use crate::errors::BenchError;
use crate::model::{ModelCapabilities, SynthConfig, SynthResult};
use async_trait::async_trait;
use std::path::Path;

pub const STUB_HELP: &str = "This model is a stub. Follow documentation to add the implementation.";

/// Placeholder for a planned backend: listed by the registry, never
/// available, and `synth` always fails.
pub struct StubModel {
    name: &'static str,
    description: &'static str,
    languages: &'static [&'static str],
    supports_cloning: bool,
    supports_styles: bool,
}

impl StubModel {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        languages: &'static [&'static str],
        supports_cloning: bool,
        supports_styles: bool,
    ) -> Self {
        Self {
            name,
            description,
            languages,
            supports_cloning,
            supports_styles,
        }
    }

    pub fn styletts2() -> Self {
        Self::new("styletts2", "StyleTTS2 (stub)", &["en"], true, true)
    }

    pub fn vits() -> Self {
        Self::new("vits", "VITS baseline (stub)", &["en"], true, false)
    }

    pub fn bark() -> Self {
        Self::new("bark", "Bark (stub)", &["en"], false, true)
    }

    pub fn qwen_tts() -> Self {
        Self::new("qwen_tts", "Qwen TTS (stub)", &["en", "zh"], true, true)
    }
}

#[async_trait]
impl TtsModel for StubModel {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn capabilities(&self) -> ModelCapabilities {
        ModelCapabilities {
            languages: self.languages.iter().map(|l| l.to_string()).collect(),
            supports_cloning: self.supports_cloning,
            supports_styles: self.supports_styles,
        }
    }

    fn is_available(&self) -> bool {
        false
    }

    fn availability_help(&self) -> &'static str {
        STUB_HELP
    }

    async fn synth(
        &self,
        _text: &str,
        _config: &SynthConfig,
        _out_dir: &Path,
    ) -> anyhow::Result<SynthResult> {
        Err(BenchError::StubModel {
            name: self.name.into(),
            help: STUB_HELP.into(),
        }
        .into())
    }
}
