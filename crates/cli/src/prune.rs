//! `ntx prune`: drop configured databases that no longer resolve remotely.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use ntx_core::cache;
use ntx_core::codegen::{Printer, module_name_of};
use ntx_core::config::patch::{PatchOutcome, replace_databases};
use ntx_core::config::{ConfigStore, DEFAULT_CONFIG_FILE};
use ntx_core::sdk::{NotionClient, SdkError};

use crate::{run_cli_async, spinner};

/// Arguments of `ntx prune`.
#[derive(Args, Debug, Clone)]
pub struct PruneArgs {
    /// Path of the config file. Defaults to ./ntx.toml
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

/// Entry point.
pub async fn run(args: PruneArgs) -> i32 {
    run_cli_async(|| run_inner(args)).await
}

async fn run_inner(args: PruneArgs) -> Result<(), String> {
    let path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut store = ConfigStore::new(&path);
    let config = store.load().map_err(|err| err.to_string())?.clone();
    let token = config.resolve_token().map_err(|err| err.to_string())?;
    let sdk = NotionClient::new(token).map_err(|err| err.to_string())?;

    let progress = spinner("Probing configured databases...");
    let mut keep = Vec::new();
    let mut dropped = Vec::new();
    for id in &config.databases {
        match sdk.retrieve_database(id).await {
            Ok(_) => keep.push(id.clone()),
            // Only a definitive remote "not found" drops an id; transport
            // failures abort rather than prune on bad evidence.
            Err(SdkError::Api { status, .. }) if status == 404 || status == 400 => {
                dropped.push(id.clone());
            }
            Err(err) => {
                progress.finish_and_clear();
                return Err(format!("Failed to probe {id}: {err}"));
            }
        }
    }
    progress.finish_and_clear();

    if dropped.is_empty() {
        println!(
            "{} All {} configured database(s) still exist; nothing to prune",
            style("✔").green(),
            keep.len()
        );
        return Ok(());
    }

    let source = fs::read_to_string(&path)
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    if let PatchOutcome::Modified(patched) =
        replace_databases(&source, &keep).map_err(|err| err.to_string())?
    {
        fs::write(&path, patched)
            .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
    }

    // Drop pruned entities from the cache, their files, and the registry.
    let printer = Printer::new(config.output_dir());
    let cached = cache::read_cache(&printer.cache_path());
    let (pruned, remaining): (Vec<_>, Vec<_>) = cached
        .into_iter()
        .partition(|entry| dropped.contains(&entry.id));
    for entry in &pruned {
        let module = module_name_of(entry);
        let _ = fs::remove_file(printer.out_dir().join(format!("{module}.rs")));
        let _ = fs::remove_file(printer.out_dir().join(format!("{module}.schema.json")));
    }
    if printer.out_dir().exists() {
        cache::write_cache(&printer.cache_path(), &remaining)
            .map_err(|err| err.to_string())?;
        printer
            .write_registry(&remaining)
            .map_err(|err| err.to_string())?;
    }

    println!(
        "{} Pruned {} database(s): {}",
        style("✔").green(),
        dropped.len(),
        dropped.join(", ")
    );
    Ok(())
}
