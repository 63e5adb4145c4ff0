use crate::cli::args::DownloadArgs;
use ttsbench_core::providers::tts::registry::ModelRegistry;

pub fn list() -> anyhow::Result<i32> {
    let registry = ModelRegistry::builtin();
    println!(
        "{:<16} {:<10} {:<10} {:<8} {:<10} Description",
        "Name", "Available", "Languages", "Cloning", "Styles"
    );
    for m in registry.list() {
        let caps = m.capabilities();
        println!(
            "{:<16} {:<10} {:<10} {:<8} {:<10} {}",
            m.name(),
            yes_no(m.is_available()),
            caps.languages.join(","),
            yes_no(caps.supports_cloning),
            yes_no(caps.supports_styles),
            m.description()
        );
    }
    Ok(0)
}

pub fn download(args: DownloadArgs) -> anyhow::Result<i32> {
    let model = ModelRegistry::builtin().get(&args.model)?;
    if model.is_available() {
        println!("{} is already available locally.", args.model);
    } else {
        println!("{}", model.availability_help());
    }
    Ok(0)
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}
