use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ttsbench_core::metrics_api::{CollectContext, Collector, Measurement};
use ttsbench_core::model::MetricMap;
use ttsbench_core::process::{command_exists, run_command};

#[async_trait]
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &'static str;
    fn is_available(&self) -> bool;
    async fn transcribe(&self, audio: &Path, language: &str) -> anyhow::Result<String>;
}

/// whisper.cpp command-line front end with JSON output.
pub struct WhisperCpp {
    pub bin: String,
    pub model: PathBuf,
}

impl WhisperCpp {
    pub fn build_args(&self, audio: &Path, language: &str, prefix: &Path) -> Vec<String> {
        vec![
            "-f".into(),
            audio.display().to_string(),
            "-m".into(),
            self.model.display().to_string(),
            "-l".into(),
            language.into(),
            "-oj".into(),
            "-of".into(),
            prefix.display().to_string(),
        ]
    }
}

#[async_trait]
impl Transcriber for WhisperCpp {
    fn name(&self) -> &'static str {
        "whisper.cpp"
    }

    fn is_available(&self) -> bool {
        command_exists(&self.bin) && self.model.is_file()
    }

    async fn transcribe(&self, audio: &Path, language: &str) -> anyhow::Result<String> {
        let work = tempfile::tempdir()?;
        let prefix = work.path().join("transcript");
        run_command(&self.bin, &self.build_args(audio, language, &prefix), None).await?;

        let json_path = prefix.with_extension("json");
        let raw = tokio::fs::read_to_string(&json_path)
            .await
            .with_context(|| format!("missing transcript {}", json_path.display()))?;
        let doc: serde_json::Value = serde_json::from_str(&raw)?;
        transcript_text(&doc).context("transcript JSON has no text")
    }
}

/// Accepts a top-level `text`, or whisper.cpp's `transcription` /
/// `segments` arrays of `{text}` entries.
pub fn transcript_text(doc: &serde_json::Value) -> Option<String> {
    if let Some(t) = doc.get("text").and_then(|v| v.as_str()) {
        return Some(t.trim().to_string());
    }
    let parts = doc
        .get("transcription")
        .or_else(|| doc.get("segments"))?
        .as_array()?;
    Some(
        parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn rate(distance: usize, reference_len: usize, hypothesis_empty: bool) -> f64 {
    if reference_len == 0 {
        return if hypothesis_empty { 0.0 } else { 1.0 };
    }
    distance as f64 / reference_len as f64
}

/// Word error rate: word-level edit distance over reference word count.
pub fn wer(reference: &str, hypothesis: &str) -> f64 {
    let (r, h) = (normalize(reference), normalize(hypothesis));
    let rw: Vec<&str> = r.split_whitespace().collect();
    let hw: Vec<&str> = h.split_whitespace().collect();
    rate(strsim::generic_levenshtein(&rw, &hw), rw.len(), hw.is_empty())
}

/// Character error rate over the normalized strings, spaces included.
pub fn cer(reference: &str, hypothesis: &str) -> f64 {
    let (r, h) = (normalize(reference), normalize(hypothesis));
    rate(strsim::levenshtein(&r, &h), r.chars().count(), h.is_empty())
}

pub struct AsrCollector {
    transcriber: Option<Arc<dyn Transcriber>>,
}

impl AsrCollector {
    pub fn new(transcriber: Option<Arc<dyn Transcriber>>) -> Self {
        Self { transcriber }
    }
}

#[async_trait]
impl Collector for AsrCollector {
    fn name(&self) -> &'static str {
        "asr"
    }

    async fn collect(&self, ctx: &CollectContext<'_>) -> anyhow::Result<Measurement> {
        let Some(t) = self.transcriber.as_ref() else {
            return Ok(Measurement::not_computed("no ASR model configured"));
        };
        if !t.is_available() {
            return Ok(Measurement::not_computed(format!(
                "{} is not available",
                t.name()
            )));
        }

        let hypothesis = match t.transcribe(ctx.audio_path, ctx.language).await {
            Ok(text) => text,
            Err(e) => return Ok(Measurement::not_computed(format!("{:#}", e))),
        };

        let mut m = MetricMap::new();
        m.insert("wer".into(), wer(ctx.reference_text, &hypothesis));
        m.insert("cer".into(), cer(ctx.reference_text, &hypothesis));
        Ok(Measurement::Computed(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wer_counts_word_edits() {
        assert_eq!(wer("Hello world", " hello WORLD "), 0.0);
        assert_eq!(wer("the cat sat", "the cat sat down"), 1.0 / 3.0);
        assert_eq!(wer("a b c d", "a x c"), 0.5);
    }

    #[test]
    fn cer_counts_char_edits() {
        assert_eq!(cer("abcd", "abcf"), 0.25);
        assert_eq!(cer("Hi", "hi"), 0.0);
    }

    #[test]
    fn empty_reference() {
        assert_eq!(wer("", ""), 0.0);
        assert_eq!(wer("  ", "noise"), 1.0);
        assert_eq!(cer("", "x"), 1.0);
    }

    #[test]
    fn transcript_shapes() {
        let cpp = serde_json::json!({
            "transcription": [{"text": " Hello"}, {"text": "world. "}, {"text": ""}]
        });
        assert_eq!(transcript_text(&cpp).as_deref(), Some("Hello world."));
        let flat = serde_json::json!({"text": " hi "});
        assert_eq!(transcript_text(&flat).as_deref(), Some("hi"));
        assert_eq!(transcript_text(&serde_json::json!({"x": 1})), None);
    }

    #[test]
    fn whisper_args() {
        let w = WhisperCpp {
            bin: "whisper-cli".into(),
            model: "ggml-small.bin".into(),
        };
        let args = w.build_args(Path::new("a.wav"), "de", Path::new("/tmp/t"));
        assert_eq!(
            args,
            vec!["-f", "a.wav", "-m", "ggml-small.bin", "-l", "de", "-oj", "-of", "/tmp/t"]
        );
    }

    #[tokio::test]
    async fn missing_transcriber_is_not_computed() {
        let c = AsrCollector::new(None);
        let ctx = CollectContext {
            audio_path: Path::new("a.wav"),
            reference_text: "hi",
            language: "en",
            reference_voice: None,
        };
        assert!(matches!(
            c.collect(&ctx).await.unwrap(),
            Measurement::NotComputed { .. }
        ));
    }
}
