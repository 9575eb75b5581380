//! Subcommands and the helpers they share.

pub mod diff;
pub mod overlay;
pub mod prepare;
pub mod variants;

use std::path::Path;
use std::sync::Arc;

use grimoire_core::model::{AnySchema, EntitySchema, SpellSchema};
use grimoire_core::overlay::{OverlayStore, StoreContext, VariantEntity};
use grimoire_core::ports::{FilePersistence, Presenter};
use grimoire_core::CoreConfig;
use serde_json::Value;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Announces sheets on stderr; a CLI run never keeps one open
struct StderrPresenter;

impl Presenter for StderrPresenter {
    fn render(&self, variant: &VariantEntity) {
        eprintln!("Opened sheet {} ({})", variant.sheet_key(), variant.name());
    }

    fn refresh(&self, variant: &VariantEntity) {
        eprintln!("Refreshed sheet {}", variant.sheet_key());
    }

    fn is_rendered(&self, _variant: &VariantEntity) -> bool {
        false
    }
}

/// Read a JSON document from disk
pub async fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Parse inline JSON, or read it from a file when prefixed with `@`
pub async fn json_arg(raw: &str) -> Result<Value, Box<dyn std::error::Error>> {
    match raw.strip_prefix('@') {
        Some(path) => read_json(Path::new(path)).await,
        None => Ok(serde_json::from_str(raw)?),
    }
}

/// Open the overlay store of the document stored at `path`
pub async fn open_store(
    path: &Path,
    config: &CoreConfig,
) -> Result<OverlayStore, Box<dyn std::error::Error>> {
    let source = read_json(path).await?;
    let document_id = source
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| format!("{} has no string `_id`", path.display()))?
        .to_string();
    let schema: Arc<dyn EntitySchema> = match source.get("type").and_then(Value::as_str) {
        Some("spell") => Arc::new(SpellSchema),
        _ => Arc::new(AnySchema),
    };

    let ctx = StoreContext::new(Arc::new(FilePersistence::new(path)))
        .with_schema(schema)
        .with_presenter(Arc::new(StderrPresenter))
        .with_overlays_path(config.overlays.path.clone());
    Ok(OverlayStore::open(&document_id, ctx).await?)
}

/// Print a value as pretty JSON on stdout
pub fn print_json(value: &impl serde::Serialize) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
