use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use ttsbench_core::metrics_api::{CollectContext, Collector, Measurement};
use ttsbench_core::process::{command_exists, run_command};

pub const SPEAKER_SIMILARITY: &str = "speaker_similarity";

#[async_trait]
pub trait SpeakerEmbedder: Send + Sync {
    fn is_available(&self) -> bool;
    async fn embed(&self, wav: &Path) -> anyhow::Result<Vec<f64>>;
}

/// External program invoked as `<cmd> <wav>` that prints a JSON array of
/// floats on stdout. `cmd` may carry leading arguments.
pub struct CommandEmbedder {
    pub cmd: String,
}

impl CommandEmbedder {
    fn split(&self) -> Option<(&str, Vec<String>)> {
        let mut parts = self.cmd.split_whitespace();
        let program = parts.next()?;
        Some((program, parts.map(String::from).collect()))
    }
}

#[async_trait]
impl SpeakerEmbedder for CommandEmbedder {
    fn is_available(&self) -> bool {
        self.split()
            .map(|(program, _)| command_exists(program))
            .unwrap_or(false)
    }

    async fn embed(&self, wav: &Path) -> anyhow::Result<Vec<f64>> {
        let (program, mut args) = self
            .split()
            .context("speaker embedding command is empty")?;
        args.push(wav.display().to_string());
        let out = run_command(program, &args, None).await?;
        serde_json::from_slice::<Vec<f64>>(&out.stdout)
            .with_context(|| format!("embedding output of `{}` is not a float array", program))
    }
}

/// Cosine of the angle between two embeddings. `None` when either has zero
/// norm or the dimensions differ.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    let denom = na * nb;
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some(dot / denom)
}

pub struct SpeakerCollector {
    embedder: Option<Arc<dyn SpeakerEmbedder>>,
    // The reference voice is the same for every output of a run.
    reference_cache: Mutex<Option<(PathBuf, Vec<f64>)>>,
}

impl SpeakerCollector {
    pub fn new(embedder: Option<Arc<dyn SpeakerEmbedder>>) -> Self {
        Self {
            embedder,
            reference_cache: Mutex::new(None),
        }
    }

    async fn reference_embedding(
        &self,
        embedder: &dyn SpeakerEmbedder,
        path: &Path,
    ) -> anyhow::Result<Vec<f64>> {
        if let Ok(cache) = self.reference_cache.lock() {
            if let Some((cached, emb)) = cache.as_ref() {
                if cached == path {
                    return Ok(emb.clone());
                }
            }
        }
        let emb = embedder.embed(path).await?;
        if let Ok(mut cache) = self.reference_cache.lock() {
            *cache = Some((path.to_path_buf(), emb.clone()));
        }
        Ok(emb)
    }
}

#[async_trait]
impl Collector for SpeakerCollector {
    fn name(&self) -> &'static str {
        "speaker"
    }

    async fn collect(&self, ctx: &CollectContext<'_>) -> anyhow::Result<Measurement> {
        let Some(reference) = ctx.reference_voice else {
            return Ok(Measurement::not_computed("no reference voice"));
        };
        let Some(embedder) = self.embedder.as_deref() else {
            return Ok(Measurement::not_computed("no speaker embedder configured"));
        };
        if !embedder.is_available() {
            return Ok(Measurement::not_computed("speaker embedder not on PATH"));
        }

        let ref_emb = match self.reference_embedding(embedder, reference).await {
            Ok(e) => e,
            Err(e) => return Ok(Measurement::not_computed(format!("reference: {:#}", e))),
        };
        let sample_emb = match embedder.embed(ctx.audio_path).await {
            Ok(e) => e,
            Err(e) => return Ok(Measurement::not_computed(format!("sample: {:#}", e))),
        };

        Ok(match cosine_similarity(&ref_emb, &sample_emb) {
            Some(sim) => Measurement::single(SPEAKER_SIMILARITY, sim),
            None => Measurement::not_computed("degenerate embedding"),
        })
    }
}
