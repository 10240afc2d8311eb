//! `ntx generate`: the full regeneration pass.

use std::path::PathBuf;

use clap::Args;
use console::style;

use ntx_core::config::{ConfigStore, DEFAULT_CONFIG_FILE};
use ntx_core::generate::generate_all;
use ntx_core::sdk::NotionClient;

use crate::{run_cli_async, spinner};

/// Arguments of `ntx generate`.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Path of the config file. Defaults to ./ntx.toml
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

/// Entry point.
pub async fn run(args: GenerateArgs) -> i32 {
    run_cli_async(|| run_inner(args)).await
}

async fn run_inner(args: GenerateArgs) -> Result<(), String> {
    let path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut store = ConfigStore::new(&path);
    let config = store.load().map_err(|err| err.to_string())?.clone();
    let token = config.resolve_token().map_err(|err| err.to_string())?;
    let sdk = NotionClient::new(token).map_err(|err| err.to_string())?;

    let progress = spinner(&format!(
        "Generating {} database(s) into {}...",
        config.databases.len(),
        config.output_dir().display()
    ));
    let outcome = generate_all(&config, &sdk).await;
    progress.finish_and_clear();

    let outcome = outcome.map_err(|err| err.to_string())?;

    println!(
        "{} Generated {} entity module(s) in {}",
        style("✔").green(),
        outcome.generated.len(),
        config.output_dir().display()
    );
    for meta in &outcome.generated {
        println!("  {} ({})", meta.class_name, meta.id);
    }
    for failure in &outcome.failed {
        println!(
            "{} {}: {}",
            style("✘").red(),
            failure.id,
            failure.error
        );
    }
    if !outcome.failed.is_empty() {
        println!(
            "{}",
            style("Some databases failed; the generated set excludes them.").yellow()
        );
    }
    Ok(())
}
