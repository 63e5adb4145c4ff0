use crate::cli::args::{BenchmarkArgs, EvalTrainedArgs};
use std::path::PathBuf;
use ttsbench_core::config::load_prompts;
use ttsbench_core::engine::{Overrides, RunRequest, Runner};
use ttsbench_core::fingerprint::new_run_id;
use ttsbench_core::providers::tts::registry::ModelRegistry;
use ttsbench_core::report::console::print_summary;
use ttsbench_core::settings::ToolSettings;
use ttsbench_metrics::default_collectors;

/// Seed used for every checkpoint evaluation so runs are comparable.
const EVAL_TRAINED_SEED: u64 = 1337;

struct BenchmarkPlan {
    models: Vec<String>,
    prompts: PathBuf,
    out: PathBuf,
    run_id: String,
    seed: u64,
    reference_voice: Option<PathBuf>,
    overrides: Overrides,
    notes: Option<String>,
}

pub async fn run(args: BenchmarkArgs, settings: &ToolSettings) -> anyhow::Result<i32> {
    let models = ModelRegistry::builtin().select(&args.models);
    execute(
        BenchmarkPlan {
            models,
            prompts: args.prompts,
            out: args.out,
            run_id: args.run_id.unwrap_or_else(new_run_id),
            seed: args.seed,
            reference_voice: args.reference_voice,
            overrides: Overrides::new(),
            notes: args.notes,
        },
        settings,
    )
    .await
}

pub async fn eval_trained(args: EvalTrainedArgs, settings: &ToolSettings) -> anyhow::Result<i32> {
    let mut overrides = Overrides::new();
    overrides.insert(
        "model_path".into(),
        args.checkpoint.display().to_string().into(),
    );
    if let Some(voice) = &args.reference_voice {
        overrides.insert("speaker_wav".into(), voice.display().to_string().into());
    }

    execute(
        BenchmarkPlan {
            models: vec![args.model],
            prompts: args.prompts,
            out: args.out,
            run_id: new_run_id(),
            seed: EVAL_TRAINED_SEED,
            reference_voice: args.reference_voice,
            overrides,
            notes: Some(format!("checkpoint: {}", args.checkpoint.display())),
        },
        settings,
    )
    .await
}

async fn execute(plan: BenchmarkPlan, settings: &ToolSettings) -> anyhow::Result<i32> {
    let prompts = load_prompts(&plan.prompts)?;
    let run_dir = plan.out.join(&plan.run_id);

    tracing::info!(
        event = "ttsbench.run.start",
        run_id = %plan.run_id,
        models = ?plan.models,
        prompts = %plan.prompts.display(),
        seed = plan.seed,
        "Starting benchmark"
    );

    let runner = Runner::new(ModelRegistry::builtin(), default_collectors(settings));
    let payload = runner
        .execute(&RunRequest {
            models: &plan.models,
            prompts: &prompts,
            run_dir: &run_dir,
            run_id: &plan.run_id,
            seed: plan.seed,
            reference_voice: plan.reference_voice.as_deref(),
            overrides: &plan.overrides,
            notes: plan.notes.clone(),
        })
        .await?;

    print_summary(&payload);
    println!("Run complete: {}", run_dir.display());
    Ok(0)
}
