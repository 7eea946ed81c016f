use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

mod commands;
mod config;
mod input;

use commands::{
    bootstrap::BootstrapCommand, check::CheckCommand, import_map::ImportMapCommand,
    render::RenderCommand, share::ShareCommand,
};

#[derive(Parser)]
#[command(name = "mirage", version, about = "Preview generated UI artifacts")]
struct Cli {
    /// Config file (defaults to the nearest mirage.toml or .miragerc.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log resolution and evaluation details
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an artifact and print its HTML
    Render(RenderCommand),
    /// Report where each import resolves
    Check(CheckCommand),
    /// Build an import map from a package manifest
    ImportMap(ImportMapCommand),
    /// Build the browser document for a Vue target
    Bootstrap(BootstrapCommand),
    /// Encode or decode share tokens
    Share(ShareCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render(cmd) => cmd.run(&config),
        Commands::Check(cmd) => cmd.run(&config),
        Commands::ImportMap(cmd) => cmd.run(&config),
        Commands::Bootstrap(cmd) => cmd.run(&config),
        Commands::Share(cmd) => cmd.run(&config),
    }
}
