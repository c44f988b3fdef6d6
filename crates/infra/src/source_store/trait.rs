use std::sync::Arc;

use thiserror::Error;

use stockflow_inventory::SourceItem;

/// One entry of a pending deduction batch: the already-mutated source item
/// plus the delta that produced it.
///
/// Built up during request processing and discarded after persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct DeductionBatchEntry {
    pub source_item: SourceItem,
    pub qty_to_decrement: f64,
}

/// Source item store operation error.
#[derive(Debug, Error)]
pub enum SourceStoreError {
    #[error("no source item for source '{source_code}' and sku '{sku}'")]
    NotFound { source_code: String, sku: String },

    /// The stored quantity no longer matches what the caller observed at
    /// fetch time (lost-update detection).
    #[error("concurrent source item update detected: {0}")]
    Concurrency(String),

    #[error("source item storage failed: {0}")]
    Storage(String),
}

/// Read/write access to individual source items.
///
/// `save` is the plain quantity-update path: it persists the item's current
/// quantity and status as-is, with none of the decrement bookkeeping the
/// batch path carries.
pub trait SourceItemRepository: Send + Sync {
    fn get(&self, source_code: &str, sku: &str) -> Result<SourceItem, SourceStoreError>;

    fn save(&self, item: &SourceItem) -> Result<(), SourceStoreError>;
}

/// All-or-nothing persistence of a decrement batch.
///
/// Implementations must commit every entry or none of them; a partially
/// applied batch is never observable.
pub trait BatchPersister: Send + Sync {
    fn persist(&self, entries: &[DeductionBatchEntry]) -> Result<(), SourceStoreError>;
}

impl<S> SourceItemRepository for Arc<S>
where
    S: SourceItemRepository + ?Sized,
{
    fn get(&self, source_code: &str, sku: &str) -> Result<SourceItem, SourceStoreError> {
        (**self).get(source_code, sku)
    }

    fn save(&self, item: &SourceItem) -> Result<(), SourceStoreError> {
        (**self).save(item)
    }
}

impl<P> BatchPersister for Arc<P>
where
    P: BatchPersister + ?Sized,
{
    fn persist(&self, entries: &[DeductionBatchEntry]) -> Result<(), SourceStoreError> {
        (**self).persist(entries)
    }
}
