use std::path::Path;

use anyhow::Context;
use log::info;

use softmax_classifier::config::RunConfig;
use softmax_classifier::pipeline;

const CONFIG_FILE: &str = "softmax.json";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RunConfig::load_or_default(Path::new(CONFIG_FILE))
        .with_context(|| format!("reading {}", CONFIG_FILE))?;

    let outcome = pipeline::run(&config).context("training run failed")?;

    println!("{}", outcome.report.render());
    info!("done, results in {}", config.output_dir.display());
    Ok(())
}
