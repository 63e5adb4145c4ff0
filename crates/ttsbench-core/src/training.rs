//! Fine-tuning plans. Nothing here trains a model: a plan is a prepared
//! dataset split plus a shell script the user runs themselves.

use crate::errors::ConfigError;
use anyhow::Context;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const PLAN_JSON: &str = "training_plan.json";
pub const PLAN_SCRIPT: &str = "plan.sh";
pub const TRAIN_LIST: &str = "train.txt";
pub const VAL_LIST: &str = "val.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recipe {
    Xtts,
    Vits,
    Styletts2,
}

impl FromStr for Recipe {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xtts" => Ok(Recipe::Xtts),
            "vits" => Ok(Recipe::Vits),
            "styletts2" => Ok(Recipe::Styletts2),
            other => Err(ConfigError(format!(
                "unknown recipe '{}'. Available: xtts, vits, styletts2",
                other
            ))),
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Recipe::Xtts => "xtts",
            Recipe::Vits => "vits",
            Recipe::Styletts2 => "styletts2",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetInfo {
    pub source_dir: String,
    pub prepared_dir: String,
    pub total_files: usize,
    pub train_files: usize,
    pub val_files: usize,
    pub train_list: String,
    pub val_list: String,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingPlan {
    pub recipe: Recipe,
    pub exp_dir: String,
    pub dataset: DatasetInfo,
    pub output_dir: String,
    pub script: String,
    pub steps: Vec<String>,
}

/// Lists the `*.wav` files directly under `data_dir`, shuffles them with a
/// seeded RNG and writes a 90/10 train/val split into `prepared_dir`.
pub fn prepare_dataset(
    data_dir: &Path,
    prepared_dir: &Path,
    seed: u64,
) -> anyhow::Result<DatasetInfo> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(data_dir)
        .with_context(|| format!("failed to read dataset dir {}", data_dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case("wav"))
                    .unwrap_or(false)
        })
        .collect();
    if files.is_empty() {
        return Err(ConfigError(format!("no .wav files found in {}", data_dir.display())).into());
    }

    // read_dir order is platform dependent.
    files.sort();
    let mut rng = StdRng::seed_from_u64(seed);
    files.shuffle(&mut rng);

    let val_count = validation_size(files.len());
    let (val, train) = files.split_at(val_count);

    std::fs::create_dir_all(prepared_dir)
        .with_context(|| format!("failed to create {}", prepared_dir.display()))?;
    let train_list = prepared_dir.join(TRAIN_LIST);
    let val_list = prepared_dir.join(VAL_LIST);
    write_list(&train_list, train)?;
    write_list(&val_list, val)?;

    tracing::info!(
        event = "ttsbench.train.dataset_prepared",
        total = files.len(),
        train = train.len(),
        val = val.len(),
        "Prepared dataset split"
    );

    Ok(DatasetInfo {
        source_dir: data_dir.display().to_string(),
        prepared_dir: prepared_dir.display().to_string(),
        total_files: files.len(),
        train_files: train.len(),
        val_files: val.len(),
        train_list: train_list.display().to_string(),
        val_list: val_list.display().to_string(),
        seed,
    })
}

/// Ten percent, at least one file once there are two or more.
fn validation_size(total: usize) -> usize {
    if total < 2 {
        return 0;
    }
    (total / 10).max(1)
}

fn write_list(path: &Path, files: &[PathBuf]) -> anyhow::Result<()> {
    let mut body = files
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

/// Builds the plan for `recipe` and writes `plan.sh` into `exp_dir`.
pub fn create_training_plan(
    recipe: Recipe,
    dataset: DatasetInfo,
    exp_dir: &Path,
) -> anyhow::Result<TrainingPlan> {
    let output_dir = exp_dir.join("checkpoints");
    let out = output_dir.display().to_string();
    let steps = match recipe {
        Recipe::Xtts => vec![
            "pip install TTS".to_string(),
            format!(
                "python -m TTS.bin.train_tts --config_path xtts_finetune.json \
                 --coqpit.datasets.0.meta_file_train {} \
                 --coqpit.datasets.0.meta_file_val {} --coqpit.output_path {}",
                dataset.train_list, dataset.val_list, out
            ),
        ],
        Recipe::Vits => vec![
            "pip install TTS".to_string(),
            format!(
                "python -m TTS.bin.train_tts --config_path vits.json \
                 --coqpit.datasets.0.meta_file_train {} \
                 --coqpit.datasets.0.meta_file_val {} --coqpit.output_path {}",
                dataset.train_list, dataset.val_list, out
            ),
        ],
        Recipe::Styletts2 => vec![
            "git clone https://github.com/yl4579/StyleTTS2.git".to_string(),
            format!(
                "python StyleTTS2/train_finetune.py --config_path Configs/config_ft.yml \
                 --train_data {} --val_data {} --log_dir {}",
                dataset.train_list, dataset.val_list, out
            ),
        ],
    };

    let script_path = exp_dir.join(PLAN_SCRIPT);
    let mut script = format!("#!/usr/bin/env bash\nset -euo pipefail\n# recipe: {}\n", recipe);
    for step in &steps {
        script.push_str(step);
        script.push('\n');
    }
    std::fs::write(&script_path, script)
        .with_context(|| format!("failed to write {}", script_path.display()))?;

    Ok(TrainingPlan {
        recipe,
        exp_dir: exp_dir.display().to_string(),
        dataset,
        output_dir: out,
        script: script_path.display().to_string(),
        steps,
    })
}

pub fn write_plan(plan: &TrainingPlan, exp_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = exp_dir.join(PLAN_JSON);
    std::fs::write(&path, serde_json::to_string_pretty(plan)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
