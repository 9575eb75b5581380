//! Diff command
//!
//! Usage: grimoire diff <ORIGIN> <VARIANT> [--apply]

use std::path::PathBuf;

use clap::Args;
use grimoire_core::diff::{apply_patch, diff};
use serde_json::Value;

use super::{print_json, read_json, CommandResult};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Original document (JSON file)
    pub origin: PathBuf,

    /// Changed document (JSON file)
    pub variant: PathBuf,

    /// Print the origin with the patch applied instead of the patch
    #[arg(long)]
    pub apply: bool,
}

pub async fn execute(args: DiffArgs) -> CommandResult {
    let origin = read_json(&args.origin).await?;
    let variant = read_json(&args.variant).await?;
    let patch = diff(&origin, &variant);

    if args.apply {
        print_json(&apply_patch(&origin, &patch))
    } else {
        print_json(&Value::Object(patch))
    }
}
