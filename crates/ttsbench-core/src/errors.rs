use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or validate a prompt definition file.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ConfigError(pub String);

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Unknown model '{name}'. Available: {available}")]
    UnknownModel { name: String, available: String },

    #[error("model {name} is not available: {help}")]
    ModelUnavailable { name: String, help: String },

    #[error("Model {name} is a stub. {help}")]
    StubModel { name: String, help: String },

    #[error("config error: {model} requires config['{field}']")]
    MissingConfig { model: String, field: String },

    #[error("missing command `{command}` on PATH")]
    CommandMissing { command: String },

    #[error("command failed: `{command}` (status: {status}){stderr_suffix}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr_suffix: String,
    },

    #[error("missing expected artifact at `{0}`")]
    MissingArtifact(PathBuf),

    #[error(
        "run '{run_id}' already exists in the results store{}",
        .prior_seed.map(|s| format!(" (recorded seed {})", s)).unwrap_or_default()
    )]
    DuplicateRun {
        run_id: String,
        prior_seed: Option<u64>,
    },
}

impl BenchError {
    pub fn from_command_failure(command: String, status: i32, stderr: &str) -> Self {
        let trimmed = stderr.trim();
        let stderr_suffix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("; stderr: {trimmed}")
        };
        Self::CommandFailed {
            command,
            status,
            stderr_suffix,
        }
    }
}
