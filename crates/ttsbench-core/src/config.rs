use crate::errors::ConfigError;
use crate::fingerprint::sha256_hex_bytes;
use crate::model::{PromptConfig, PromptSet};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Loads and validates a prompt definition file.
///
/// Missing `styles` falls back to [`crate::model::DEFAULT_STYLES`]; unknown
/// keys are logged and ignored.
pub fn load_prompts(path: &Path) -> Result<PromptSet, ConfigError> {
    let raw = std::fs::read(path)
        .map_err(|e| ConfigError(format!("failed to read prompts {}: {}", path.display(), e)))?;
    let text = std::str::from_utf8(&raw)
        .map_err(|e| ConfigError(format!("prompts {} is not UTF-8: {}", path.display(), e)))?;

    let config = parse_prompts(text)
        .map_err(|e| ConfigError(format!("{} (file: {})", e.0, path.display())))?;

    Ok(PromptSet {
        path: path.to_path_buf(),
        sha256: sha256_hex_bytes(&raw),
        config,
    })
}

pub fn parse_prompts(text: &str) -> Result<PromptConfig, ConfigError> {
    let mut ignored_keys = BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(text);
    let cfg: PromptConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse prompts YAML: {}", e)))?;

    if !ignored_keys.is_empty() {
        tracing::warn!(
            event = "ttsbench.prompts.unknown_keys",
            keys = ?ignored_keys,
            "Ignored unknown prompt fields"
        );
    }

    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &PromptConfig) -> Result<(), ConfigError> {
    if cfg.sample_rate == 0 {
        return Err(ConfigError("sample_rate must be positive".into()));
    }

    let mut seen = HashSet::new();
    for p in &cfg.prompts {
        if p.id.trim().is_empty() {
            return Err(ConfigError("prompt with empty id".into()));
        }
        if !seen.insert(p.id.as_str()) {
            return Err(ConfigError(format!("duplicate prompt id '{}'", p.id)));
        }
    }
    Ok(())
}

/// Collapses every whitespace run to one space and trims both ends.
pub fn normalize_prompt(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn write_sample_prompts(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        r#"sample_rate: 24000
styles: [neutral, excited]
prompts:
  - id: greeting
    text: "Hello there, and welcome to the benchmark."
    language: en
  - id: numbers
    text: "The meeting moved from 9:30 to 10:15 on March 3rd."
    language: en
    style: neutral
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample prompts: {}", e)))?;
    Ok(())
}
