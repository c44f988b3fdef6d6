use std::collections::HashMap;
use std::sync::RwLock;

use stockflow_inventory::SourceItem;

use super::r#trait::{BatchPersister, DeductionBatchEntry, SourceItemRepository, SourceStoreError};

/// In-memory source item store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemorySourceItemStore {
    items: RwLock<HashMap<(String, String), SourceItem>>,
}

impl InMemorySourceItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace an item.
    pub fn insert(&self, item: SourceItem) {
        if let Ok(mut map) = self.items.write() {
            map.insert(
                (item.source_code().to_string(), item.sku().to_string()),
                item,
            );
        }
    }
}

impl SourceItemRepository for InMemorySourceItemStore {
    fn get(&self, source_code: &str, sku: &str) -> Result<SourceItem, SourceStoreError> {
        let map = self
            .items
            .read()
            .map_err(|_| SourceStoreError::Storage("source item lock poisoned".to_string()))?;

        map.get(&(source_code.to_string(), sku.to_string()))
            .cloned()
            .ok_or_else(|| SourceStoreError::NotFound {
                source_code: source_code.to_string(),
                sku: sku.to_string(),
            })
    }

    fn save(&self, item: &SourceItem) -> Result<(), SourceStoreError> {
        let mut map = self
            .items
            .write()
            .map_err(|_| SourceStoreError::Storage("source item lock poisoned".to_string()))?;

        map.insert(
            (item.source_code().to_string(), item.sku().to_string()),
            item.clone(),
        );
        Ok(())
    }
}

impl BatchPersister for InMemorySourceItemStore {
    fn persist(&self, entries: &[DeductionBatchEntry]) -> Result<(), SourceStoreError> {
        if entries.is_empty() {
            return Ok(());
        }

        // Validate the whole batch before touching the map: one source per
        // batch, positive decrements only.
        let source_code = entries[0].source_item.source_code();
        for (idx, entry) in entries.iter().enumerate() {
            if entry.source_item.source_code() != source_code {
                return Err(SourceStoreError::Storage(format!(
                    "batch contains multiple source codes (index {idx})"
                )));
            }
            if !entry.qty_to_decrement.is_finite() || entry.qty_to_decrement <= 0.0 {
                return Err(SourceStoreError::Storage(format!(
                    "batch contains a non-positive decrement (index {idx})"
                )));
            }
        }

        // Single write lock: the batch lands in full or not at all.
        let mut map = self
            .items
            .write()
            .map_err(|_| SourceStoreError::Storage("source item lock poisoned".to_string()))?;

        for entry in entries {
            map.insert(
                (
                    entry.source_item.source_code().to_string(),
                    entry.source_item.sku().to_string(),
                ),
                entry.source_item.clone(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockflow_inventory::SourceItemStatus;

    fn item(source_code: &str, sku: &str, quantity: f64) -> SourceItem {
        SourceItem::new(source_code, sku, quantity, SourceItemStatus::InStock).unwrap()
    }

    #[test]
    fn get_returns_not_found_for_missing_items() {
        let store = InMemorySourceItemStore::new();
        let err = store.get("warehouse_a", "SKU-1").unwrap_err();
        assert!(matches!(err, SourceStoreError::NotFound { .. }));
    }

    #[test]
    fn save_overwrites_the_stored_item() {
        let store = InMemorySourceItemStore::new();
        store.insert(item("warehouse_a", "SKU-1", 10.0));

        store.save(&item("warehouse_a", "SKU-1", 4.0)).unwrap();

        assert_eq!(store.get("warehouse_a", "SKU-1").unwrap().quantity(), 4.0);
    }

    #[test]
    fn persist_applies_every_entry() {
        let store = InMemorySourceItemStore::new();
        store.insert(item("warehouse_a", "SKU-1", 10.0));
        store.insert(item("warehouse_a", "SKU-2", 8.0));

        let entries = vec![
            DeductionBatchEntry {
                source_item: item("warehouse_a", "SKU-1", 7.0),
                qty_to_decrement: 3.0,
            },
            DeductionBatchEntry {
                source_item: item("warehouse_a", "SKU-2", 6.0),
                qty_to_decrement: 2.0,
            },
        ];
        store.persist(&entries).unwrap();

        assert_eq!(store.get("warehouse_a", "SKU-1").unwrap().quantity(), 7.0);
        assert_eq!(store.get("warehouse_a", "SKU-2").unwrap().quantity(), 6.0);
    }

    #[test]
    fn persist_rejects_cross_source_batches_without_applying_anything() {
        let store = InMemorySourceItemStore::new();
        store.insert(item("warehouse_a", "SKU-1", 10.0));

        let entries = vec![
            DeductionBatchEntry {
                source_item: item("warehouse_a", "SKU-1", 7.0),
                qty_to_decrement: 3.0,
            },
            DeductionBatchEntry {
                source_item: item("warehouse_b", "SKU-1", 1.0),
                qty_to_decrement: 1.0,
            },
        ];
        let err = store.persist(&entries).unwrap_err();

        assert!(matches!(err, SourceStoreError::Storage(_)));
        assert_eq!(store.get("warehouse_a", "SKU-1").unwrap().quantity(), 10.0);
    }

    #[test]
    fn persist_rejects_non_positive_decrements() {
        let store = InMemorySourceItemStore::new();
        let entries = vec![DeductionBatchEntry {
            source_item: item("warehouse_a", "SKU-1", 10.0),
            qty_to_decrement: 0.0,
        }];

        let err = store.persist(&entries).unwrap_err();
        assert!(matches!(err, SourceStoreError::Storage(_)));
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let store = InMemorySourceItemStore::new();
        store.persist(&[]).unwrap();
    }
}
