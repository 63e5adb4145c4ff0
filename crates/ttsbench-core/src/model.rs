use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const DEFAULT_SAMPLE_RATE: u32 = 24000;
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_PROMPT_STYLE: &str = "neutral";
pub const DEFAULT_STYLES: [&str; 5] = ["neutral", "excited", "whisper", "fast", "slow"];

/// Flat metric map attached to every output. Ordered by name so the JSON dump
/// and the per-model report rows are stable.
pub type MetricMap = BTreeMap<String, f64>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptItem {
    pub id: String,
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl PromptItem {
    /// Styles this prompt expands into: its own style if set, otherwise the
    /// run-level list.
    pub fn styles<'a>(&'a self, run_styles: &'a [String]) -> Vec<&'a str> {
        match &self.style {
            Some(s) => vec![s.as_str()],
            None => run_styles.iter().map(String::as_str).collect(),
        }
    }

    pub fn recorded_style(&self) -> &str {
        self.style.as_deref().unwrap_or(DEFAULT_PROMPT_STYLE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_wav: Option<String>,
    #[serde(default = "default_styles")]
    pub styles: Vec<String>,
    pub prompts: Vec<PromptItem>,
}

/// A loaded prompt file. Immutable once returned by
/// [`crate::config::load_prompts`].
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub path: PathBuf,
    pub sha256: String,
    pub config: PromptConfig,
}

/// Configuration handed to a model adapter for one work item.
///
/// Built from the prompt-file fields, the item's style and language, and any
/// caller overrides. Keys no field knows about are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SynthConfig {
    #[serde(default)]
    pub sample_rate: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub max_duration_s: Option<f64>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default)]
    pub speaker_wav: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SynthConfig {
    /// Merges base fields, then per-item style and language, then `overrides`.
    /// Later layers win.
    pub fn merged(
        base: &PromptConfig,
        style: &str,
        language: &str,
        overrides: &serde_json::Map<String, serde_json::Value>,
    ) -> anyhow::Result<Self> {
        let mut layered = match serde_json::to_value(base)? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        // Run-level lists are not adapter settings.
        layered.remove("prompts");
        layered.remove("styles");
        layered.insert("style".into(), style.into());
        layered.insert("language".into(), language.into());
        for (k, v) in overrides {
            layered.insert(k.clone(), v.clone());
        }
        Ok(serde_json::from_value(serde_json::Value::Object(layered))?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthResult {
    pub audio_path: PathBuf,
    pub sample_rate: u32,
    pub timings: MetricMap,
    pub stats: MetricMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelCapabilities {
    pub languages: Vec<String>,
    pub supports_cloning: bool,
    pub supports_styles: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunInfo {
    pub run_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub prompts_path: String,
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelRow {
    pub name: String,
    pub description: String,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptRow {
    pub id: String,
    pub text: String,
    pub language: String,
    pub style: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputRecord {
    pub model: String,
    pub prompt_id: String,
    pub style: String,
    pub audio_path: String,
    pub sample_rate: u32,
    pub metrics: MetricMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub run_id: String,
    pub created_at: String,
    pub prompts_path: String,
    pub prompts_sha256: String,
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Everything a run produced, as dumped to `results.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunPayload {
    pub run: RunSummary,
    pub models: Vec<ModelRow>,
    pub prompts: Vec<PromptRow>,
    pub outputs: Vec<OutputRecord>,
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

pub fn default_styles() -> Vec<String> {
    DEFAULT_STYLES.iter().map(|s| s.to_string()).collect()
}
