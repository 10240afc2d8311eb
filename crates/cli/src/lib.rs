//! Command-line front end for ntx.
//!
//! Thin on purpose: argument parsing, prompts, spinners, and remediation
//! text live here; everything with behavior lives in `ntx-core`. Commands
//! return process exit codes through [`run_cli_async`], which is also where
//! fatal errors get printed.

use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub mod add;
pub mod generate;
pub mod init;
pub mod prune;

#[derive(Parser)]
#[command(
    name = "ntx",
    version,
    about = "Generate typed Rust clients for Notion databases"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter ntx.toml
    Init(init::InitArgs),
    /// Regenerate every configured database (full pass)
    Generate(generate::GenerateArgs),
    /// Add one database to the config and generate it incrementally
    Add(add::AddArgs),
    /// Drop configured databases that no longer exist remotely
    Prune(prune::PruneArgs),
}

/// Parse arguments and dispatch. Returns the process exit code.
pub async fn run(args: Vec<String>) -> i32 {
    init_tracing();
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Init(args)) => init::run(args).await,
            Some(Commands::Generate(args)) => generate::run(args).await,
            Some(Commands::Add(args)) => add::run(args).await,
            Some(Commands::Prune(args)) => prune::run(args).await,
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Run a command body, printing its error to stderr and mapping to an exit
/// code.
pub async fn run_cli_async<F, Fut>(f: F) -> i32
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    match f().await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

/// `NTX_LOG` controls the log level: a plain level (`debug`) or a full
/// tracing filter spec (`ntx_core=debug`).
fn init_tracing() {
    let filter = match std::env::var("NTX_LOG") {
        Ok(level) if is_plain_level(&level) => format!("ntx={level},ntx_core={level}"),
        Ok(spec) => spec,
        Err(_) => "ntx=info,ntx_core=info".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Spinner for long-running remote work.
fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());
    spinner
}
