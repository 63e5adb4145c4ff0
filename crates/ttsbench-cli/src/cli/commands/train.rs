use crate::cli::args::TrainArgs;
use ttsbench_core::fingerprint::new_run_id;
use ttsbench_core::training::{create_training_plan, prepare_dataset, write_plan, Recipe};

pub fn run(args: TrainArgs) -> anyhow::Result<i32> {
    let recipe: Recipe = args.recipe.parse()?;
    let exp_dir = args.out.join(new_run_id());
    std::fs::create_dir_all(&exp_dir)?;

    let dataset = prepare_dataset(&args.data, &exp_dir.join("prepared"), args.seed)?;
    let plan = create_training_plan(recipe, dataset, &exp_dir)?;
    let plan_path = write_plan(&plan, &exp_dir)?;
    eprintln!("wrote file: {}", plan_path.display());

    if args.dry_run {
        println!("Dry-run complete. Review training_plan.json and plan.sh for next steps.");
    } else {
        println!("Training execution is not implemented; run plan.sh yourself.");
    }
    println!("Experiment dir: {}", exp_dir.display());
    Ok(0)
}
