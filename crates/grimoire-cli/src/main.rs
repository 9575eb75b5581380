//! Grimoire CLI
//!
//! Command-line access to overlays, diffs and rule preparation over JSON
//! documents on disk.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use grimoire_core::logging_facility;
use grimoire_core::CoreConfig;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "grimoire")]
#[command(about = "Grimoire - Layered document overlays and rule elements", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the patch turning one document into another
    Diff(commands::diff::DiffArgs),
    /// List or pick the variants of a document
    Variants(commands::variants::VariantsArgs),
    /// Overlay operations
    Overlay(commands::overlay::OverlayArgs),
    /// Run one rule-element preparation cycle for an actor
    Prepare(commands::prepare::PrepareArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(CoreConfig::from_path).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    logging_facility::init(config.logging.profile);

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(args).await,
        Commands::Variants(args) => commands::variants::execute(args, &config).await,
        Commands::Overlay(args) => commands::overlay::execute(args, &config).await,
        Commands::Prepare(args) => commands::prepare::execute(args, &config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
