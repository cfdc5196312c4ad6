//! AutoQA CLI - Main Entry Point

use std::path::PathBuf;

use anyhow::Context;
use autoqa_cli::commands::{check, export};
use autoqa_cli::config::AutoqaConfig;
use autoqa_cli::output::{self, print_error};
use autoqa_common::paths::normalize_path;
use clap::{Parser, Subcommand};

/// AutoQA - export recorded agent runs as Playwright tests
#[derive(Parser)]
#[command(name = "autoqa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root
    #[arg(long, default_value = ".", global = true)]
    cwd: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export Playwright tests from a recorded run
    Export(export::ExportArgs),

    /// Check whether specs can be exported, without writing
    Check(check::CheckArgs),

    /// Show version information
    Version,
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cwd = if cli.cwd.is_absolute() {
        cli.cwd
    } else {
        std::env::current_dir()
            .context("Failed to resolve working directory")?
            .join(cli.cwd)
    };
    let cwd = normalize_path(&cwd);

    match cli.command {
        Commands::Export(args) => {
            let config = AutoqaConfig::load(&cwd)?;
            export::execute(args, &cwd, &config, cli.format)
        }
        Commands::Check(args) => check::execute(args, &cwd, cli.format),
        Commands::Version => {
            println!("AutoQA CLI v{}", autoqa_common::VERSION);
            println!("Trace format: {}", autoqa_common::trace::TRACE_FILE_NAME);
            Ok(true)
        }
    }
}
