use crate::config::normalize_prompt;
use crate::errors::BenchError;
use crate::metrics_api::{CollectContext, Collector, Measurement};
use crate::model::{
    MetricMap, ModelRow, OutputRecord, PromptRow, PromptSet, RunInfo, RunPayload, RunSummary,
    SynthConfig,
};
use crate::providers::tts::registry::ModelRegistry;
use crate::providers::tts::{output_path, TtsModel};
use crate::report::json::write_json;
use crate::report::write_report;
use crate::storage::store::Store;
use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const RESULTS_DB: &str = "results.sqlite";
pub const RESULTS_JSON: &str = "results.json";
pub const REPORT_MD: &str = "report.md";

pub type Overrides = serde_json::Map<String, serde_json::Value>;

/// One benchmark invocation.
#[derive(Debug, Clone)]
pub struct RunRequest<'a> {
    pub models: &'a [String],
    pub prompts: &'a PromptSet,
    pub run_dir: &'a Path,
    pub run_id: &'a str,
    pub seed: u64,
    pub reference_voice: Option<&'a Path>,
    pub overrides: &'a Overrides,
    pub notes: Option<String>,
}

/// Drives the model × prompt × style matrix strictly in that nesting order,
/// one work item at a time.
pub struct Runner {
    pub registry: ModelRegistry,
    pub collectors: Vec<Arc<dyn Collector>>,
}

/// Directory a work item's audio lands in.
pub fn work_item_dir(run_dir: &Path, model: &str, prompt_id: &str, style: &str) -> PathBuf {
    run_dir.join(model).join(prompt_id).join(style)
}

impl Runner {
    pub fn new(registry: ModelRegistry, collectors: Vec<Arc<dyn Collector>>) -> Self {
        Self {
            registry,
            collectors,
        }
    }

    pub async fn execute(&self, req: &RunRequest<'_>) -> anyhow::Result<RunPayload> {
        std::fs::create_dir_all(req.run_dir)
            .with_context(|| format!("failed to create run dir {}", req.run_dir.display()))?;

        // Unknown names abort before anything is persisted.
        let resolved: Vec<Arc<dyn TtsModel>> = req
            .models
            .iter()
            .map(|name| self.registry.get(name))
            .collect::<Result<_, _>>()?;

        let mut rng = StdRng::seed_from_u64(req.seed);
        let cfg = &req.prompts.config;
        let created_at = chrono::Utc::now();

        let store = Store::open(&req.run_dir.join(RESULTS_DB))?;
        store.init_schema()?;
        store.insert_run(&RunInfo {
            run_id: req.run_id.to_string(),
            created_at,
            prompts_path: req.prompts.path.display().to_string(),
            seed: req.seed,
            notes: req.notes.clone(),
        })?;

        let model_rows: Vec<ModelRow> = resolved
            .iter()
            .map(|m| ModelRow {
                name: m.name().to_string(),
                description: m.description().to_string(),
                available: m.is_available(),
            })
            .collect();
        let model_ids = store.insert_models(req.run_id, &model_rows)?;

        // One row per prompt item; the recorded style is informational and
        // may differ from the style an output was synthesized with.
        let prompt_rows: Vec<PromptRow> = cfg
            .prompts
            .iter()
            .map(|p| PromptRow {
                id: p.id.clone(),
                text: normalize_prompt(&p.text),
                language: p.language.clone(),
                style: p.recorded_style().to_string(),
            })
            .collect();
        let prompt_ids = store.insert_prompts(req.run_id, &prompt_rows)?;

        let mut outputs = Vec::new();
        // A name listed twice keeps its model row but is synthesized once.
        let mut visited = HashSet::new();
        for ((model, row), model_id) in resolved.iter().zip(&model_rows).zip(&model_ids) {
            if !visited.insert(row.name.as_str()) {
                tracing::debug!(
                    event = "ttsbench.model.repeated",
                    model = %row.name,
                    "Model already benchmarked in this run"
                );
                continue;
            }
            if !row.available {
                tracing::warn!(
                    event = "ttsbench.model.unavailable",
                    model = %row.name,
                    help = model.availability_help(),
                    "Skipping unavailable model"
                );
                continue;
            }

            for ((item, prompt_row), prompt_id) in
                cfg.prompts.iter().zip(&prompt_rows).zip(&prompt_ids)
            {
                for style in item.styles(&cfg.styles) {
                    let out_dir = work_item_dir(req.run_dir, &row.name, &item.id, style);
                    let target = output_path(&out_dir);

                    let (audio_path, sample_rate, mut metrics) = if target.exists() {
                        tracing::info!(
                            event = "ttsbench.output.skipped",
                            model = %row.name,
                            prompt_id = %item.id,
                            style,
                            path = %target.display(),
                            "Reusing existing audio"
                        );
                        (target, cfg.sample_rate, MetricMap::new())
                    } else {
                        let mut synth_cfg =
                            SynthConfig::merged(cfg, style, &item.language, req.overrides)?;
                        synth_cfg.seed = Some(rng.random::<u64>());
                        let result = model
                            .synth(&prompt_row.text, &synth_cfg, &out_dir)
                            .await
                            .with_context(|| {
                                format!("{} failed on {}/{}", row.name, item.id, style)
                            })?;
                        tracing::info!(
                            event = "ttsbench.synth.complete",
                            model = %row.name,
                            prompt_id = %item.id,
                            style,
                            rtf = result.timings.get("rtf").copied().unwrap_or(0.0),
                            "Synthesized"
                        );
                        let mut metrics = result.timings;
                        metrics.extend(result.stats);
                        (result.audio_path, result.sample_rate, metrics)
                    };

                    let ctx = CollectContext {
                        audio_path: &audio_path,
                        reference_text: &prompt_row.text,
                        language: &item.language,
                        reference_voice: req.reference_voice,
                    };
                    metrics.extend(self.collect(&ctx).await?);

                    let audio_str = audio_path.display().to_string();
                    store.insert_output(
                        req.run_id,
                        *model_id,
                        *prompt_id,
                        &audio_str,
                        sample_rate,
                        &metrics,
                    )?;
                    outputs.push(OutputRecord {
                        model: row.name.clone(),
                        prompt_id: item.id.clone(),
                        style: style.to_string(),
                        audio_path: audio_str,
                        sample_rate,
                        metrics,
                    });
                }
            }
        }

        let payload = RunPayload {
            run: RunSummary {
                run_id: req.run_id.to_string(),
                created_at: created_at.to_rfc3339(),
                prompts_path: req.prompts.path.display().to_string(),
                prompts_sha256: req.prompts.sha256.clone(),
                seed: req.seed,
                notes: req.notes.clone(),
            },
            models: model_rows,
            prompts: prompt_rows,
            outputs,
        };

        write_json(&payload, &req.run_dir.join(RESULTS_JSON))?;
        write_report(&payload, &req.run_dir.join(REPORT_MD))?;
        tracing::info!(
            event = "ttsbench.run.complete",
            run_id = req.run_id,
            outputs = payload.outputs.len(),
            "Run complete"
        );
        Ok(payload)
    }

    /// Runs every collector in order; later collectors overwrite same-named
    /// keys.
    async fn collect(&self, ctx: &CollectContext<'_>) -> anyhow::Result<MetricMap> {
        let mut merged = MetricMap::new();
        for collector in &self.collectors {
            match collector.collect(ctx).await? {
                Measurement::Computed(m) => merged.extend(m),
                Measurement::NotComputed { reason } => {
                    tracing::debug!(
                        event = "ttsbench.collector.not_computed",
                        collector = collector.name(),
                        reason = %reason,
                        "Metric not computed"
                    );
                }
            }
        }
        Ok(merged)
    }

    /// Synthesis only: same layout and skip policy as [`Runner::execute`],
    /// no store and no metrics. Returns the audio paths in work-item order.
    pub async fn synthesize(
        &self,
        model_name: &str,
        prompts: &PromptSet,
        run_dir: &Path,
        seed: u64,
        overrides: &Overrides,
    ) -> anyhow::Result<Vec<PathBuf>> {
        let model = self.registry.get(model_name)?;
        if !model.is_available() {
            return Err(BenchError::ModelUnavailable {
                name: model_name.to_string(),
                help: model.availability_help().to_string(),
            }
            .into());
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let cfg = &prompts.config;
        let mut paths = Vec::new();
        for item in &cfg.prompts {
            let text = normalize_prompt(&item.text);
            for style in item.styles(&cfg.styles) {
                let out_dir = work_item_dir(run_dir, model_name, &item.id, style);
                let target = output_path(&out_dir);
                if target.exists() {
                    tracing::info!(
                        event = "ttsbench.output.skipped",
                        model = model_name,
                        prompt_id = %item.id,
                        style,
                        "Reusing existing audio"
                    );
                    paths.push(target);
                    continue;
                }
                let mut synth_cfg = SynthConfig::merged(cfg, style, &item.language, overrides)?;
                synth_cfg.seed = Some(rng.random::<u64>());
                let result = model.synth(&text, &synth_cfg, &out_dir).await?;
                paths.push(result.audio_path);
            }
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_items_nest_model_prompt_style() {
        let dir = work_item_dir(Path::new("out/r1"), "piper", "greeting", "fast");
        assert_eq!(dir, Path::new("out/r1/piper/greeting/fast"));
        assert_eq!(
            output_path(&dir),
            Path::new("out/r1/piper/greeting/fast/audio.wav")
        );
    }
}
