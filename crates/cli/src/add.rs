//! `ntx add`: patch the config and generate one database incrementally.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use ntx_core::config::patch::{PatchOutcome, append_database};
use ntx_core::config::{ConfigStore, DEFAULT_CONFIG_FILE};
use ntx_core::generate::{build_entity, install_entity};
use ntx_core::sdk::NotionClient;

use crate::{run_cli_async, spinner};

/// Arguments of `ntx add`.
#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Identifier of the database to add
    #[arg(value_name = "DATABASE_ID")]
    pub database_id: String,
    /// Path of the config file. Defaults to ./ntx.toml
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

/// Entry point.
pub async fn run(args: AddArgs) -> i32 {
    run_cli_async(|| run_inner(args)).await
}

async fn run_inner(args: AddArgs) -> Result<(), String> {
    let path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut store = ConfigStore::new(&path);
    let config = store.load().map_err(|err| err.to_string())?;
    let token = config.resolve_token().map_err(|err| err.to_string())?;
    let sdk = NotionClient::new(token).map_err(|err| err.to_string())?;

    // Fetch and synthesize first: the schema gives the display name the
    // config comment and the error messages want.
    let progress = spinner(&format!("Fetching schema for {}...", args.database_id));
    let entity = build_entity(&sdk, &args.database_id).await;
    progress.finish_and_clear();
    let entity = entity.map_err(|err| err.to_string())?;

    let source = fs::read_to_string(&path)
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    match append_database(&source, &args.database_id, Some(&entity.meta.display_name))
        .map_err(|err| err.to_string())?
    {
        PatchOutcome::Modified(patched) => {
            fs::write(&path, patched)
                .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
            println!(
                "{} Added {} to {}",
                style("✔").green(),
                args.database_id,
                path.display()
            );
        }
        PatchOutcome::Unchanged => {
            println!(
                "{} {} already configured; config not modified",
                style("•").dim(),
                args.database_id
            );
        }
    }

    let config = store.reload().map_err(|err| err.to_string())?.clone();
    let meta = install_entity(&config, &entity).map_err(|err| err.to_string())?;
    println!(
        "{} Generated {} into {}",
        style("✔").green(),
        meta.class_name,
        config.output_dir().display()
    );
    Ok(())
}
