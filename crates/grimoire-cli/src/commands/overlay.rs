//! Overlay command
//!
//! Usage:
//!   grimoire overlay create <DOCUMENT> [--kind override] [--render]
//!   grimoire overlay delete <DOCUMENT> <OVERLAY_ID>
//!   grimoire overlay update <DOCUMENT> <OVERLAY_ID> <EDITS>
//!   grimoire overlay kind <DOCUMENT> <OVERLAY_ID>

use std::path::PathBuf;

use clap::{Args, Subcommand};
use grimoire_core::core_types::OverlayId;
use grimoire_core::overlay::{CreateOptions, OverlayType};
use grimoire_core::ports::UpdateOptions;
use grimoire_core::CoreConfig;

use super::{json_arg, open_store, print_json, CommandResult};

#[derive(Debug, Args)]
pub struct OverlayArgs {
    #[command(subcommand)]
    pub command: OverlayCommand,
}

#[derive(Debug, Subcommand)]
pub enum OverlayCommand {
    /// Create an empty overlay and print its id
    Create(CreateArgs),
    /// Delete an overlay
    Delete(TargetArgs),
    /// Apply edits to an override variant and save the diff
    Update(UpdateArgs),
    /// Print the kind of an overlay
    Kind(TargetArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Base document (JSON file)
    pub document: PathBuf,

    /// Overlay kind
    #[arg(long, default_value = "override")]
    pub kind: String,

    /// Open the new variant's sheet
    #[arg(long)]
    pub render: bool,
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Base document (JSON file)
    pub document: PathBuf,

    /// Overlay id
    pub overlay_id: String,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Base document (JSON file)
    pub document: PathBuf,

    /// Override overlay id
    pub overlay_id: String,

    /// Edits as a JSON object, or `@file.json`
    pub edits: String,
}

pub async fn execute(args: OverlayArgs, config: &CoreConfig) -> CommandResult {
    match args.command {
        OverlayCommand::Create(create) => execute_create(create, config).await,
        OverlayCommand::Delete(target) => execute_delete(target, config).await,
        OverlayCommand::Update(update) => execute_update(update, config).await,
        OverlayCommand::Kind(target) => execute_kind(target, config).await,
    }
}

async fn execute_create(args: CreateArgs, config: &CoreConfig) -> CommandResult {
    let kind = OverlayType::from(args.kind.as_str());
    let mut store = open_store(&args.document, config).await?;
    let id = store
        .create(
            kind,
            CreateOptions {
                render_sheet: args.render,
            },
        )
        .await?;
    println!("{}", id);
    Ok(())
}

async fn execute_delete(args: TargetArgs, config: &CoreConfig) -> CommandResult {
    let mut store = open_store(&args.document, config).await?;
    store.delete_overlay(&args.overlay_id).await?;
    println!("✓ Deleted {}", args.overlay_id);
    Ok(())
}

async fn execute_update(args: UpdateArgs, config: &CoreConfig) -> CommandResult {
    let edits = json_arg(&args.edits).await?;
    let edits = edits
        .as_object()
        .cloned()
        .ok_or("edits must be a JSON object")?;

    let mut store = open_store(&args.document, config).await?;
    let id = OverlayId::from(args.overlay_id.as_str());
    let variant = store
        .load_variant(std::slice::from_ref(&id))
        .ok_or_else(|| format!("overlay {} does not materialize", id))?;
    let updated = store
        .update_override(&variant, &edits, UpdateOptions::default())
        .await?;
    print_json(&updated.source)
}

async fn execute_kind(args: TargetArgs, config: &CoreConfig) -> CommandResult {
    let store = open_store(&args.document, config).await?;
    println!("{}", store.get_type(&args.overlay_id)?);
    Ok(())
}
