//! Overlay store: the keyed overlay collection of one base entity.
//!
//! ## Persistence contract
//!
//! Every write goes through [`DocumentPersistence`] first. Only after it
//! succeeds is the same pathed update mirrored onto the in-memory base
//! snapshot and the index. A failure between the two calls of
//! `update_override` therefore leaves the local state equal to what was
//! persisted; call [`OverlayStore::reload`] to re-derive from the host if
//! in doubt.
//!
//! ## Logging Ownership
//!
//! The async operations own `log_op_start!` / `log_op_end!` /
//! `log_op_error!`. Helpers log with `tracing::debug!` only.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use grimoire_core_types::OverlayId;
use serde_json::Value;

use super::map::OverlayMap;
use super::materializer::{materialize, VariantEntity};
use super::record::{OverlayRecord, OverlayType};
use crate::config::DEFAULT_OVERLAYS_PATH;
use crate::diff::path::{join, single};
use crate::diff::{apply_patch, apply_pathed_update, diff, Patch, PathedUpdate, DELETION_PREFIX};
use crate::errors::{GrimoireError, Result};
use crate::model::{AnySchema, BaseEntity, EntitySchema};
use crate::ports::{DocumentPersistence, NoopPresenter, Presenter, UpdateOptions};
use crate::{log_op_end, log_op_error, log_op_start};

/// Options for [`OverlayStore::create`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Open the new variant's sheet once the record is persisted
    pub render_sheet: bool,
}

/// Collaborators and layout an [`OverlayStore`] works with
#[derive(Clone)]
pub struct StoreContext {
    pub persistence: Arc<dyn DocumentPersistence>,
    pub presenter: Arc<dyn Presenter>,
    pub schema: Arc<dyn EntitySchema>,
    /// Dotted path of the overlay map inside the base document
    pub overlays_path: String,
}

impl StoreContext {
    /// Context with no presenter, a permissive schema and the default path
    pub fn new(persistence: Arc<dyn DocumentPersistence>) -> Self {
        Self {
            persistence,
            presenter: Arc::new(NoopPresenter),
            schema: Arc::new(AnySchema),
            overlays_path: DEFAULT_OVERLAYS_PATH.to_string(),
        }
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }

    pub fn with_schema(mut self, schema: Arc<dyn EntitySchema>) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_overlays_path(mut self, path: impl Into<String>) -> Self {
        self.overlays_path = path.into();
        self
    }
}

/// Ordered overlay collection attached to one base entity
pub struct OverlayStore {
    base: BaseEntity,
    overlays: OverlayMap,
    retired: HashSet<OverlayId>,
    ctx: StoreContext,
}

impl OverlayStore {
    /// Index the overlays of an already loaded base entity
    ///
    /// Malformed records are skipped; records of other kinds are indexed.
    pub fn load(base: BaseEntity, ctx: StoreContext) -> Self {
        let overlays = OverlayMap::from_stored(base.overlay_source(&ctx.overlays_path));
        tracing::debug!(entity_id = %base.id, overlays = overlays.len(), "overlay index loaded");
        Self {
            base,
            overlays,
            retired: HashSet::new(),
            ctx,
        }
    }

    /// Fetch a base entity from persistence and index its overlays
    ///
    /// # Errors
    ///
    /// Propagates `Persistence` from the fetch and `Serialization` for a
    /// malformed document.
    pub async fn open(document_id: &str, ctx: StoreContext) -> Result<Self> {
        let source = ctx.persistence.fetch(document_id).await?;
        Ok(Self::load(BaseEntity::from_source(source)?, ctx))
    }

    /// The current base snapshot
    pub fn base(&self) -> &BaseEntity {
        &self.base
    }

    /// The overlay index
    pub fn overlays(&self) -> &OverlayMap {
        &self.overlays
    }

    /// Materialize a variant from the given overlays, in order
    pub fn load_variant(&self, overlay_ids: &[OverlayId]) -> Option<VariantEntity> {
        materialize(
            &self.base,
            &self.overlays,
            &self.ctx.overlays_path,
            overlay_ids,
            self.ctx.schema.as_ref(),
        )
    }

    /// One variant per override record, in index order
    ///
    /// Records that fail to materialize are skipped.
    pub fn override_variants(&self) -> Vec<VariantEntity> {
        self.overlays
            .iter()
            .filter(|record| record.overlay_type == OverlayType::Override)
            .filter_map(|record| self.load_variant(std::slice::from_ref(&record.id)))
            .collect()
    }

    /// Kind of the overlay stored under `overlay_id`
    ///
    /// # Errors
    ///
    /// Returns `OverlayNotFound` if there is no such overlay.
    pub fn get_type(&self, overlay_id: &str) -> Result<OverlayType> {
        let id = OverlayId::from(overlay_id);
        self.overlays
            .get(&id)
            .map(|record| record.overlay_type.clone())
            .ok_or_else(|| self.not_found(&id))
    }

    /// Create an empty overlay of `kind` and return its id
    ///
    /// Override records get `sort` = existing override count + 1.
    ///
    /// # Errors
    ///
    /// - `UnsupportedOverlayKind` (without any persistence call) for a kind
    ///   other than `override`
    /// - `Persistence`; the index is untouched on failure
    pub async fn create(&mut self, kind: OverlayType, options: CreateOptions) -> Result<OverlayId> {
        log_op_start!("overlay_create", entity_id = %self.base.id, kind = %kind);
        let start = Instant::now();

        let result = self.create_impl(kind, options).await;
        self.log_outcome("overlay_create", start, &result);
        let id = result?;

        log_op_end!(
            "overlay_create",
            duration_ms = start.elapsed().as_millis() as u64,
            overlay_id = %id
        );
        Ok(id)
    }

    async fn create_impl(&mut self, kind: OverlayType, options: CreateOptions) -> Result<OverlayId> {
        let record = match kind {
            OverlayType::Override => {
                let sort = self.overlays.count_of(&OverlayType::Override) + 1;
                OverlayRecord::new(
                    self.allocate_id(),
                    sort as u32,
                    OverlayType::Override,
                    Patch::new(),
                )
            }
            OverlayType::Other(kind) => {
                return Err(GrimoireError::UnsupportedOverlayKind { kind });
            }
        };
        let id = record.id.clone();

        let changes = single(self.record_path(&id), record.to_stored());
        self.persist(changes, UpdateOptions::default()).await?;
        self.overlays.insert(record);

        if options.render_sheet {
            if let Some(variant) = self.load_variant(std::slice::from_ref(&id)) {
                self.ctx.presenter.render(&variant);
            }
        }
        Ok(id)
    }

    /// Apply `edits` to `variant` and persist the result as a diff
    ///
    /// Returns the edited variant. When it equals the base the diff is
    /// empty and nothing is persisted. Otherwise the old record is removed
    /// and the new diff written under the same id, always carrying
    /// `overlayType: "override"`.
    ///
    /// # Errors
    ///
    /// - `VariantWithoutOverride` if no override overlay is applied to `variant`
    /// - `OverlayNotFound` if that override no longer exists
    /// - `Persistence` from either write
    pub async fn update_override(
        &mut self,
        variant: &VariantEntity,
        edits: &Patch,
        options: UpdateOptions,
    ) -> Result<VariantEntity> {
        log_op_start!("overlay_update_override", entity_id = %self.base.id);
        let start = Instant::now();

        let result = self.update_override_impl(variant, edits, options).await;
        self.log_outcome("overlay_update_override", start, &result);
        let updated = result?;

        log_op_end!(
            "overlay_update_override",
            duration_ms = start.elapsed().as_millis() as u64
        );
        Ok(updated)
    }

    async fn update_override_impl(
        &mut self,
        variant: &VariantEntity,
        edits: &Patch,
        options: UpdateOptions,
    ) -> Result<VariantEntity> {
        let id = variant
            .override_id()
            .cloned()
            .ok_or_else(|| GrimoireError::VariantWithoutOverride {
                entity_id: self.base.id.clone(),
            })?;
        let sort = self
            .overlays
            .get(&id)
            .map(|record| record.sort)
            .ok_or_else(|| self.not_found(&id))?;

        let mut updated = variant.clone();
        updated.source = apply_patch(&variant.source, edits);

        let origin = self.base.resolved_source(&self.ctx.overlays_path);
        let difference = diff(&origin, &updated.source);
        if difference.is_empty() {
            tracing::debug!(overlay_id = %id, "variant equals base; nothing saved");
            return Ok(updated);
        }
        let record = OverlayRecord::new(id.clone(), sort, OverlayType::Override, difference);
        tracing::debug!(overlay_id = %id, patch_len = record.body.len(), "saving override diff");

        let record_path = self.record_path(&id);
        let delete_path = self.delete_path(&id);
        self.persist(single(delete_path, Value::Null), UpdateOptions::silent())
            .await?;
        let position = self.overlays.remove(&id).map(|(position, _)| position);

        if let Err(e) = self.persist(single(record_path, record.to_stored()), options).await {
            self.retired.insert(id);
            return Err(e);
        }
        match position {
            Some(position) => self.overlays.insert_at(position, record),
            None => self.overlays.insert(record),
        }

        if self.ctx.presenter.is_rendered(variant) {
            self.ctx.presenter.refresh(&updated);
        }
        Ok(updated)
    }

    /// Delete an overlay
    ///
    /// The id is retired and never handed out again by this store.
    ///
    /// # Errors
    ///
    /// - `OverlayNotFound` (without any persistence call) if the id is unknown
    /// - `Persistence` if the deletion cannot be persisted
    pub async fn delete_overlay(&mut self, overlay_id: &str) -> Result<()> {
        log_op_start!("overlay_delete", entity_id = %self.base.id, overlay_id = overlay_id);
        let start = Instant::now();

        let result = self.delete_overlay_impl(overlay_id).await;
        self.log_outcome("overlay_delete", start, &result);
        result?;

        log_op_end!(
            "overlay_delete",
            duration_ms = start.elapsed().as_millis() as u64
        );
        Ok(())
    }

    async fn delete_overlay_impl(&mut self, overlay_id: &str) -> Result<()> {
        let id = OverlayId::from(overlay_id);
        if !self.overlays.contains(&id) {
            return Err(self.not_found(&id));
        }

        let delete_path = self.delete_path(&id);
        self.persist(single(delete_path, Value::Null), UpdateOptions::default())
            .await?;
        self.overlays.remove(&id);
        self.retired.insert(id);
        Ok(())
    }

    /// Replace the base snapshot and index with a freshly read source
    ///
    /// Ids that disappear are retired.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for a malformed source; the current state is
    /// kept in that case.
    pub fn reconcile(&mut self, source: Value) -> Result<()> {
        let base = BaseEntity::from_source(source)?;
        let overlays = OverlayMap::from_stored(base.overlay_source(&self.ctx.overlays_path));

        for id in self.overlays.ids() {
            if !overlays.contains(id) {
                self.retired.insert(id.clone());
            }
        }
        self.base = base;
        self.overlays = overlays;
        Ok(())
    }

    /// Re-read the base entity from persistence and reconcile
    ///
    /// # Errors
    ///
    /// Propagates `Persistence` from the fetch and any `reconcile` error.
    pub async fn reload(&mut self) -> Result<()> {
        log_op_start!("overlay_reload", entity_id = %self.base.id);
        let start = Instant::now();

        let fetched = self.ctx.persistence.fetch(&self.base.id).await;
        let result = fetched.and_then(|source| self.reconcile(source));
        self.log_outcome("overlay_reload", start, &result);
        result?;

        log_op_end!(
            "overlay_reload",
            duration_ms = start.elapsed().as_millis() as u64,
            overlays = self.overlays.len()
        );
        Ok(())
    }

    /// Persist one update, then mirror it onto the local base snapshot
    async fn persist(&mut self, changes: PathedUpdate, options: UpdateOptions) -> Result<()> {
        self.ctx
            .persistence
            .update(&self.base.id, changes.clone(), options)
            .await?;
        apply_pathed_update(&mut self.base.source, &changes)
    }

    fn allocate_id(&self) -> OverlayId {
        loop {
            let id = OverlayId::generate();
            if !self.overlays.contains(&id) && !self.retired.contains(&id) {
                return id;
            }
        }
    }

    fn record_path(&self, id: &OverlayId) -> String {
        join(&self.ctx.overlays_path, id.as_str())
    }

    fn delete_path(&self, id: &OverlayId) -> String {
        join(
            &self.ctx.overlays_path,
            &format!("{}{}", DELETION_PREFIX, id.as_str()),
        )
    }

    fn not_found(&self, id: &OverlayId) -> GrimoireError {
        GrimoireError::OverlayNotFound {
            entity_id: self.base.id.clone(),
            overlay_id: id.to_string(),
        }
    }

    fn log_outcome<T>(&self, op: &str, start: Instant, result: &Result<T>) {
        if let Err(e) = result {
            log_op_error!(
                op,
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
        }
    }
}

impl std::fmt::Debug for OverlayStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayStore")
            .field("base", &self.base.id)
            .field("overlays", &self.overlays.ids())
            .field("overlays_path", &self.ctx.overlays_path)
            .finish()
    }
}
