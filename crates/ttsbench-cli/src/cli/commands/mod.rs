use super::args::{Cli, Command};
use super::logging::init_logging;
use ttsbench_core::settings::ToolSettings;

pub mod benchmark;
pub mod init;
pub mod models;
pub mod synth;
pub mod train;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let settings = ToolSettings::from_env();
    init_logging(&settings.log_level, cli.log_path.as_deref())?;

    match cli.cmd {
        Command::ListModels => models::list(),
        Command::Download(args) => models::download(args),
        Command::Synth(args) => synth::run(args).await,
        Command::Benchmark(args) => benchmark::run(args, &settings).await,
        Command::Train(args) => train::run(args),
        Command::EvalTrained(args) => benchmark::eval_trained(args, &settings).await,
        Command::Init(args) => init::run(args),
    }
}
