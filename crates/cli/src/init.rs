//! `ntx init`: write a starter config file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use dialoguer::Input;

use ntx_core::config::{DEFAULT_CONFIG_FILE, DEFAULT_OUTPUT_DIR, TOKEN_ENV_VAR};

use crate::run_cli_async;

/// Arguments of `ntx init`.
#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Path of the config file to create. Defaults to ./ntx.toml
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
    /// Auth token to write into the config. Will prompt if not provided
    #[arg(long, short = 't')]
    pub token: Option<String>,
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Entry point.
pub async fn run(args: InitArgs) -> i32 {
    run_cli_async(|| async move { run_inner(args) }).await
}

fn run_inner(mut args: InitArgs) -> Result<(), String> {
    let path = args
        .config
        .take()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if path.exists() && !args.force {
        return Err(format!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        ));
    }

    let token = match args.token.take() {
        Some(token) => token,
        None => Input::<String>::new()
            .with_prompt(format!(
                "Integration token (leave empty to use {TOKEN_ENV_VAR})"
            ))
            .allow_empty(true)
            .interact_text()
            .map_err(|err| format!("Failed to read token: {err}"))?,
    };

    let token_line = if token.trim().is_empty() {
        format!("# token is read from the {TOKEN_ENV_VAR} environment variable\n")
    } else {
        format!("token = \"{}\"\n", token.trim())
    };

    let contents = format!(
        "# ntx configuration\n{token_line}\n# Database identifiers to generate clients for.\ndatabases = []\n\n# Where generated modules are written.\noutput = \"{DEFAULT_OUTPUT_DIR}\"\n"
    );
    fs::write(&path, contents)
        .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;

    println!("{} Wrote {}", style("✔").green(), path.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Share your databases with the integration and run {}",
        style("ntx add <database-id>").cyan()
    );
    println!(
        "  2. Regenerate everything at any time with {}",
        style("ntx generate").cyan()
    );
    Ok(())
}
