//! Variants command: the selection-prompt adapter
//!
//! Usage: grimoire variants <DOCUMENT> [--pick <N>]
//!
//! Lists the base document followed by one choice per override overlay.
//! `--pick` prints the materialized source of the chosen entry.

use std::path::PathBuf;

use clap::Args;
use grimoire_core::core_types::OverlayId;
use grimoire_core::overlay::OverlayStore;
use grimoire_core::CoreConfig;
use serde::Serialize;

use super::{open_store, print_json, CommandResult};

#[derive(Debug, Args)]
pub struct VariantsArgs {
    /// Base document (JSON file)
    pub document: PathBuf,

    /// Print the source of the choice at this position
    #[arg(long)]
    pub pick: Option<usize>,

    /// Print the choices as JSON
    #[arg(long)]
    pub json: bool,
}

/// One entry of the selection prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantChoice {
    /// `None` selects the base document
    pub overlay_id: Option<OverlayId>,
    pub label: String,
}

/// Base first, then each override variant in store order
pub fn choices(store: &OverlayStore) -> Vec<VariantChoice> {
    let base = VariantChoice {
        overlay_id: None,
        label: format!("{} (base)", store.base().name),
    };
    std::iter::once(base)
        .chain(store.override_variants().into_iter().map(|variant| VariantChoice {
            overlay_id: variant.override_id().cloned(),
            label: variant.name().to_string(),
        }))
        .collect()
}

pub async fn execute(args: VariantsArgs, config: &CoreConfig) -> CommandResult {
    let store = open_store(&args.document, config).await?;
    let entries = choices(&store);

    if let Some(index) = args.pick {
        let choice = entries
            .get(index)
            .ok_or_else(|| format!("no choice at position {} ({} available)", index, entries.len()))?;
        let ids: Vec<OverlayId> = choice.overlay_id.iter().cloned().collect();
        let variant = store
            .load_variant(&ids)
            .ok_or_else(|| format!("choice {} does not materialize", index))?;
        return print_json(&variant.source);
    }

    if args.json {
        return print_json(&entries);
    }
    for (index, choice) in entries.iter().enumerate() {
        match &choice.overlay_id {
            Some(id) => println!("[{}] {} ({})", index, choice.label, id),
            None => println!("[{}] {}", index, choice.label),
        }
    }
    Ok(())
}
