//! Collaborator interfaces consumed by the core.
//!
//! - [`DocumentPersistence`]: the host's asynchronous pathed update API
//! - [`Presenter`]: fire-and-forget sheet rendering
//! - [`ValueResolver`]: opaque resolution of rule-element values
//!
//! Reference implementations live in the submodules.

pub mod file;
pub mod memory;
pub mod presenter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diff::PathedUpdate;
use crate::errors::Result;
use crate::overlay::VariantEntity;

pub use file::FilePersistence;
pub use memory::{MemoryPersistence, RecordedUpdate};
pub use presenter::{NoopPresenter, PresenterCall, RecordingPresenter};

/// Options forwarded with a persistence update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOptions {
    /// Whether the host should refresh any open UI as a side effect
    pub render: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self { render: true }
    }
}

impl UpdateOptions {
    /// Options that suppress the host-side refresh
    pub fn silent() -> Self {
        Self { render: false }
    }
}

/// Host persistence API
///
/// Keys of a [`PathedUpdate`] are dotted paths into the document; a last
/// segment of `-=<key>` removes that key. Implementations own any retry
/// policy; the core never retries.
#[async_trait]
pub trait DocumentPersistence: Send + Sync {
    /// Apply a pathed partial update to a document
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the document cannot be updated.
    async fn update(
        &self,
        document_id: &str,
        changes: PathedUpdate,
        options: UpdateOptions,
    ) -> Result<()>;

    /// Read the current persisted source of a document
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the document cannot be read.
    async fn fetch(&self, document_id: &str) -> Result<Value>;
}

/// UI collaborator presenting variant sheets
pub trait Presenter: Send + Sync {
    /// Open a sheet for the variant
    fn render(&self, variant: &VariantEntity);

    /// Refresh an open sheet for the variant
    fn refresh(&self, variant: &VariantEntity);

    /// Whether a sheet for the variant is currently visible
    fn is_rendered(&self, variant: &VariantEntity) -> bool;
}

/// Context a value is resolved in
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Data of the owning actor
    pub actor_data: &'a Value,
    /// Id of the item carrying the rule element
    pub item_id: &'a str,
}

/// Value/formula resolution collaborator
///
/// Returns a number when `raw` resolves to one, otherwise `raw` unchanged.
pub trait ValueResolver: Send + Sync {
    fn resolve_value(&self, raw: &Value, ctx: ResolveContext<'_>) -> Value;
}
