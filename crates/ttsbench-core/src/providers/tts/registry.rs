use super::coqui::CoquiXttsModel;
use super::piper::PiperModel;
use super::stub::StubModel;
use super::TtsModel;
use crate::errors::BenchError;
use std::sync::Arc;

/// Name to adapter lookup. Iteration follows registration order.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: Vec<Arc<dyn TtsModel>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every backend this build knows about, stubs included.
    pub fn builtin() -> Self {
        Self::new()
            .with(Arc::new(CoquiXttsModel))
            .with(Arc::new(PiperModel))
            .with(Arc::new(StubModel::styletts2()))
            .with(Arc::new(StubModel::vits()))
            .with(Arc::new(StubModel::bark()))
            .with(Arc::new(StubModel::qwen_tts()))
    }

    /// Registers `model`, replacing any adapter already using its name.
    pub fn with(mut self, model: Arc<dyn TtsModel>) -> Self {
        self.models.retain(|m| m.name() != model.name());
        self.models.push(model);
        self
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn TtsModel>, BenchError> {
        self.models
            .iter()
            .find(|m| m.name() == name)
            .cloned()
            .ok_or_else(|| {
                let mut names = self.names();
                names.sort_unstable();
                BenchError::UnknownModel {
                    name: name.to_string(),
                    available: names.join(", "),
                }
            })
    }

    pub fn list(&self) -> impl Iterator<Item = &Arc<dyn TtsModel>> {
        self.models.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.name()).collect()
    }

    /// Resolves a `--models` argument: `all` or a comma-separated list.
    pub fn select(&self, spec: &str) -> Vec<String> {
        if spec.trim() == "all" {
            return self.names().into_iter().map(String::from).collect();
        }
        spec.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_order_is_stable() {
        assert_eq!(
            ModelRegistry::builtin().names(),
            vec!["coqui_xtts_v2", "piper", "styletts2", "vits", "bark", "qwen_tts"]
        );
    }

    #[test]
    fn unknown_model_lists_sorted_names() {
        let err = ModelRegistry::builtin().get("tacotron").err().unwrap();
        assert_eq!(
            err.to_string(),
            "Unknown model 'tacotron'. Available: bark, coqui_xtts_v2, piper, qwen_tts, styletts2, vits"
        );
    }

    #[test]
    fn select_parses_csv_and_all() {
        let reg = ModelRegistry::builtin();
        assert_eq!(reg.select("all").len(), 6);
        assert_eq!(reg.select(" piper, ,vits "), vec!["piper", "vits"]);
    }

    #[test]
    fn registering_same_name_replaces() {
        let reg = ModelRegistry::new()
            .with(Arc::new(StubModel::bark()))
            .with(Arc::new(StubModel::new("bark", "Bark v2", &["en"], false, false)));
        assert_eq!(reg.names(), vec!["bark"]);
        assert_eq!(reg.get("bark").unwrap().description(), "Bark v2");
    }
}
