//! Source deduction pipeline (application-level orchestration).
//!
//! This module orchestrates a full deduction request against the
//! collaborator boundaries:
//!
//! ```text
//! SourceDeductionRequest
//!   ↓
//! 1. Resolve the stock for the request's sales channel (once per request)
//!   ↓
//! 2. Per item: fetch configuration, fetch source item, apply policy
//!   ↓
//! 3. Persist the accumulated decrement batch (one atomic call)
//!   ↓
//! 4. Invalidate product caches for items that went out of stock
//! ```
//!
//! Per-item policy, in request order:
//! - `manage_stock` disabled → the item is skipped entirely (no validation,
//!   no batch entry, no error).
//! - Order canceled against a balance that would stay negative → the item is
//!   reconciled through the repository's plain save path and never enters
//!   the decrement batch. The decrement call carries its own upstream side
//!   effects; cancellations of already-negative balances must not trigger
//!   them.
//! - Quantity available → deduct and add to the batch.
//! - Quantity unavailable → the whole request fails with `InsufficientStock`
//!   and nothing is persisted (the batch commit is the only durable write,
//!   and it only runs after every item succeeded).
//!
//! The pipeline holds no locks and performs no retries; serialization of
//! concurrent writes to the same (source_code, sku) is the store's job.

use thiserror::Error;
use tracing::instrument;

use stockflow_core::{ProductId, StockId};
use stockflow_inventory::{SourceDeductionRequest, SourceItemStatus};
use stockflow_sales::SalesEventType;

use crate::cache_invalidation::{
    CLEAN_CACHE_BY_TAGS, CacheContext, CacheInvalidator, InvalidationError, PRODUCT_CACHE_TAG,
};
use crate::product_cache::ProductIdResolver;
use crate::source_store::{
    BatchPersister, DeductionBatchEntry, SourceItemRepository, SourceStoreError,
};
use crate::stock::{StockConfigurationProvider, StockResolver};

/// Deduction pipeline error.
#[derive(Debug, Error)]
pub enum DeductionError {
    /// The sales channel has no assigned stock; nothing was processed.
    #[error("no stock is mapped to sales channel '{0}'")]
    UnknownStockMapping(String),

    /// No stock item configuration exists for the sku/stock combination.
    #[error("no stock item configuration for sku '{sku}' on stock {stock_id}")]
    UnknownConfiguration { sku: String, stock_id: StockId },

    /// No source item exists for the source/sku combination.
    #[error("no source item for source '{source_code}' and sku '{sku}'")]
    UnknownSourceItem { source_code: String, sku: String },

    /// A line item would drive the source quantity negative (user-facing).
    #[error(
        "not all of the requested products are available in the requested quantity \
         (source '{source_code}', sku '{sku}')"
    )]
    InsufficientStock { source_code: String, sku: String },

    /// Persisting the decrement batch (or a cancellation reconciliation)
    /// failed.
    #[error("source item persistence failed: {0}")]
    Persistence(SourceStoreError),

    /// Cache invalidation failed after a successful persist. The deduction
    /// itself is durable; caches may be stale.
    #[error("cache invalidation failed after deduction: {0}")]
    Invalidation(#[from] InvalidationError),
}

impl From<SourceStoreError> for DeductionError {
    fn from(value: SourceStoreError) -> Self {
        match value {
            SourceStoreError::NotFound { source_code, sku } => {
                DeductionError::UnknownSourceItem { source_code, sku }
            }
            other => DeductionError::Persistence(other),
        }
    }
}

/// Deducts requested quantities from a source and keeps downstream caches
/// honest.
///
/// Generic over its collaborator boundaries so tests run against in-memory
/// stores and production wires in persistent ones:
///
/// - `R`: sales channel → stock resolution
/// - `C`: per-(sku, stock) configuration lookup
/// - `S`: source item repository (fetch + plain save)
/// - `P`: atomic decrement batch persister
/// - `L`: sku → product id lookup (read-through cached)
/// - `I`: cache invalidator (register + broadcast)
#[derive(Debug)]
pub struct SourceDeductionService<R, C, S, P, L, I> {
    stock_resolver: R,
    configurations: C,
    source_items: S,
    batch_persister: P,
    product_ids: L,
    cache_invalidator: I,
}

impl<R, C, S, P, L, I> SourceDeductionService<R, C, S, P, L, I> {
    pub fn new(
        stock_resolver: R,
        configurations: C,
        source_items: S,
        batch_persister: P,
        product_ids: L,
        cache_invalidator: I,
    ) -> Self {
        Self {
            stock_resolver,
            configurations,
            source_items,
            batch_persister,
            product_ids,
            cache_invalidator,
        }
    }
}

impl<R, C, S, P, L, I> SourceDeductionService<R, C, S, P, L, I>
where
    R: StockResolver,
    C: StockConfigurationProvider,
    S: SourceItemRepository,
    P: BatchPersister,
    L: ProductIdResolver,
    I: CacheInvalidator,
{
    /// Process one deduction request end to end.
    ///
    /// Consumes the request; re-running an identical request deducts again —
    /// this is a mutating operation, not an idempotent one.
    #[instrument(
        skip(self, request),
        fields(
            source_code = request.source_code(),
            sales_event = %request.sales_event().event_type(),
            item_count = request.items().len(),
        ),
        err
    )]
    pub fn execute(&self, request: SourceDeductionRequest) -> Result<(), DeductionError> {
        let stock_id = self
            .stock_resolver
            .resolve(request.sales_channel())
            .ok_or_else(|| {
                DeductionError::UnknownStockMapping(request.sales_channel().to_string())
            })?;

        let mut batch: Vec<DeductionBatchEntry> = Vec::new();

        for item in request.items() {
            let config = self.configurations.get(item.sku(), stock_id).ok_or_else(|| {
                DeductionError::UnknownConfiguration {
                    sku: item.sku().to_string(),
                    stock_id,
                }
            })?;

            if !config.manage_stock() {
                tracing::debug!(sku = item.sku(), "stock not managed; skipping deduction");
                continue;
            }

            let mut source_item = self.source_items.get(request.source_code(), item.sku())?;

            // A cancellation against an already-negative balance still
            // reconciles the visible quantity/status, but through the plain
            // item update — never through the decrement batch.
            if request.sales_event().event_type() == SalesEventType::OrderCanceled
                && source_item.quantity() - item.qty() < 0.0
            {
                source_item.deduct(item.qty(), &config);
                self.source_items.save(&source_item)?;
                tracing::debug!(
                    sku = item.sku(),
                    quantity = source_item.quantity(),
                    "reconciled negative balance on cancellation"
                );
                continue;
            }

            if source_item.quantity() - item.qty() >= 0.0 {
                source_item.deduct(item.qty(), &config);
                batch.push(DeductionBatchEntry {
                    source_item,
                    qty_to_decrement: item.qty(),
                });
            } else {
                return Err(DeductionError::InsufficientStock {
                    source_code: request.source_code().to_string(),
                    sku: item.sku().to_string(),
                });
            }
        }

        if batch.is_empty() {
            return Ok(());
        }

        self.batch_persister
            .persist(&batch)
            .map_err(DeductionError::Persistence)?;

        let product_ids = self.products_to_invalidate(&batch);
        if !product_ids.is_empty() {
            self.cache_invalidator
                .invalidate(PRODUCT_CACHE_TAG, &product_ids)?;

            let mut context = CacheContext::new();
            context.register_entities(PRODUCT_CACHE_TAG, &product_ids);
            self.cache_invalidator
                .notify(CLEAN_CACHE_BY_TAGS, &context)?;
        }

        Ok(())
    }

    /// Products whose source stock just hit zero availability.
    ///
    /// Only persisted entries count, and only those that ended out of stock.
    /// Entries without a resolvable sku or product binding are skipped
    /// silently; duplicates collapse in first-seen order.
    fn products_to_invalidate(&self, batch: &[DeductionBatchEntry]) -> Vec<ProductId> {
        let mut product_ids: Vec<ProductId> = Vec::new();

        for entry in batch {
            if entry.source_item.status() != SourceItemStatus::OutOfStock {
                continue;
            }

            let sku = entry.source_item.sku();
            if sku.is_empty() {
                continue;
            }

            let Some(product_id) = self.product_ids.product_id_for_sku(sku) else {
                continue;
            };

            if !product_ids.contains(&product_id) {
                product_ids.push(product_id);
            }
        }

        product_ids
    }
}
