use crate::cli::args::InitArgs;
use ttsbench_core::config::write_sample_prompts;

pub fn run(args: InitArgs) -> anyhow::Result<i32> {
    if args.out.exists() {
        eprintln!("{} already exists, leaving it untouched", args.out.display());
        return Ok(0);
    }
    write_sample_prompts(&args.out)?;
    eprintln!("wrote file: {}", args.out.display());
    Ok(0)
}
