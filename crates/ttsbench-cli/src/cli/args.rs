use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ttsbench",
    version,
    about = "Benchmark harness for text-to-speech models"
)]
pub struct Cli {
    /// Also append JSON log lines to this file
    #[arg(long, global = true)]
    pub log_path: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show every registered model and whether it can run here
    ListModels,
    /// Print setup instructions for a model
    Download(DownloadArgs),
    /// Synthesize prompts with one model, no metrics
    Synth(SynthArgs),
    /// Synthesize, score and report across models
    Benchmark(BenchmarkArgs),
    /// Prepare a fine-tuning dataset split and plan
    Train(TrainArgs),
    /// Benchmark a fine-tuned checkpoint
    EvalTrained(EvalTrainedArgs),
    /// Write a sample prompt file
    Init(InitArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct DownloadArgs {
    pub model: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SynthArgs {
    pub model: String,
    pub prompts: PathBuf,
    pub out: PathBuf,

    #[arg(long)]
    pub run_id: Option<String>,

    #[arg(long, default_value_t = 1337)]
    pub seed: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct BenchmarkArgs {
    /// Comma-separated model names or `all`
    #[arg(long, default_value = "all")]
    pub models: String,

    #[arg(long)]
    pub prompts: PathBuf,

    #[arg(long, default_value = "runs")]
    pub out: PathBuf,

    #[arg(long)]
    pub run_id: Option<String>,

    #[arg(long, default_value_t = 1337)]
    pub seed: u64,

    /// Reference voice for speaker similarity
    #[arg(long)]
    pub reference_voice: Option<PathBuf>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct TrainArgs {
    /// xtts | vits | styletts2
    #[arg(long)]
    pub recipe: String,

    #[arg(long)]
    pub data: PathBuf,

    #[arg(long, default_value = "training")]
    pub out: PathBuf,

    /// Only write the plan
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, default_value_t = 1337)]
    pub seed: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct EvalTrainedArgs {
    #[arg(long)]
    pub checkpoint: PathBuf,

    #[arg(long)]
    pub prompts: PathBuf,

    #[arg(long, default_value = "runs")]
    pub out: PathBuf,

    #[arg(long, default_value = "coqui_xtts_v2")]
    pub model: String,

    #[arg(long)]
    pub reference_voice: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "prompts.yaml")]
    pub out: PathBuf,
}
