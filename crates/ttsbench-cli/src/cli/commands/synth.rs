use crate::cli::args::SynthArgs;
use ttsbench_core::config::load_prompts;
use ttsbench_core::engine::{Overrides, Runner};
use ttsbench_core::fingerprint::new_run_id;
use ttsbench_core::providers::tts::registry::ModelRegistry;

pub async fn run(args: SynthArgs) -> anyhow::Result<i32> {
    let prompts = load_prompts(&args.prompts)?;
    let run_id = args.run_id.unwrap_or_else(new_run_id);
    let run_dir = args.out.join(&run_id);
    std::fs::create_dir_all(&run_dir)?;

    let runner = Runner::new(ModelRegistry::builtin(), Vec::new());
    let paths = runner
        .synthesize(&args.model, &prompts, &run_dir, args.seed, &Overrides::new())
        .await?;

    eprintln!("Synthesized {} file(s)", paths.len());
    println!("Run complete: {}", run_dir.display());
    Ok(0)
}
