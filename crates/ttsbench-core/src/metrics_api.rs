use crate::model::MetricMap;
use async_trait::async_trait;
use std::path::Path;

/// Inputs shared by every collector for one synthesized output.
#[derive(Debug, Clone, Copy)]
pub struct CollectContext<'a> {
    pub audio_path: &'a Path,
    /// Normalized prompt text the audio was synthesized from.
    pub reference_text: &'a str,
    pub language: &'a str,
    pub reference_voice: Option<&'a Path>,
}

/// Outcome of one collector. `NotComputed` means the capability was missing
/// or its output unusable, which is different from a zero score.
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    Computed(MetricMap),
    NotComputed { reason: String },
}

impl Measurement {
    pub fn not_computed(reason: impl Into<String>) -> Self {
        Measurement::NotComputed {
            reason: reason.into(),
        }
    }

    pub fn single(name: &str, value: f64) -> Self {
        let mut m = MetricMap::new();
        m.insert(name.to_string(), value);
        Measurement::Computed(m)
    }
}

#[async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Err` aborts the run; optional capabilities report `NotComputed`
    /// instead.
    async fn collect(&self, ctx: &CollectContext<'_>) -> anyhow::Result<Measurement>;
}
