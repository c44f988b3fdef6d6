//! Postgres-backed source item store.
//!
//! Persists source items in a `source_items` table keyed by
//! `(source_code, sku)`, with `quantity double precision` and
//! `status smallint` columns.
//!
//! ## Concurrency
//!
//! The decrement batch runs in one transaction. Each entry is applied with a
//! conditional `UPDATE ... WHERE quantity = new_quantity + qty_to_decrement`,
//! so the write only lands if the stored quantity still matches what the
//! caller observed at fetch time. A concurrent deduction of the same
//! (source_code, sku) therefore surfaces as `SourceStoreError::Concurrency`
//! and rolls the whole batch back instead of losing an update.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `SourceStoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | SourceStoreError |
//! |------------|----------------------|------------------|
//! | Database (unique violation) | `23505` | `Concurrency` |
//! | Database (other) | Any other | `Storage` |
//! | PoolClosed / network / other | N/A | `Storage` |

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use stockflow_inventory::{SourceItem, SourceItemStatus};

use super::query::{Pagination, SourceItemPage, SourceItemQuery};
use super::r#trait::{BatchPersister, DeductionBatchEntry, SourceItemRepository, SourceStoreError};

/// Build a connection pool from the `DATABASE_URL` environment variable.
pub async fn pool_from_env() -> anyhow::Result<PgPool> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    PgPool::connect(&url)
        .await
        .context("failed to connect to postgres")
}

/// Postgres-backed source item store.
///
/// Uses the SQLx connection pool (thread-safe, `Send + Sync`); every batch
/// write runs inside a transaction.
#[derive(Debug, Clone)]
pub struct PostgresSourceItemStore {
    pool: Arc<PgPool>,
}

impl PostgresSourceItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Load one source item.
    #[instrument(skip(self), err)]
    pub async fn fetch_item(
        &self,
        source_code: &str,
        sku: &str,
    ) -> Result<SourceItem, SourceStoreError> {
        let row = sqlx::query(
            r#"
            SELECT source_code, sku, quantity, status
            FROM source_items
            WHERE source_code = $1 AND sku = $2
            "#,
        )
        .bind(source_code)
        .bind(sku)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_item", e))?;

        match row {
            Some(row) => {
                let stored = SourceItemRow::from_row(&row).map_err(|e| {
                    SourceStoreError::Storage(format!(
                        "failed to deserialize source item row: {e}"
                    ))
                })?;
                stored.try_into()
            }
            None => Err(SourceStoreError::NotFound {
                source_code: source_code.to_string(),
                sku: sku.to_string(),
            }),
        }
    }

    /// Upsert one source item (the plain quantity-update path).
    #[instrument(
        skip(self, item),
        fields(source_code = item.source_code(), sku = item.sku()),
        err
    )]
    pub async fn save_item(&self, item: &SourceItem) -> Result<(), SourceStoreError> {
        sqlx::query(
            r#"
            INSERT INTO source_items (source_code, sku, quantity, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (source_code, sku)
            DO UPDATE SET
                quantity = EXCLUDED.quantity,
                status = EXCLUDED.status,
                updated_at = NOW()
            "#,
        )
        .bind(item.source_code())
        .bind(item.sku())
        .bind(item.quantity())
        .bind(item.status().as_i16())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_item", e))?;

        Ok(())
    }

    /// Apply a decrement batch in one transaction.
    #[instrument(skip(self, entries), fields(entry_count = entries.len()), err)]
    pub async fn apply_batch(
        &self,
        entries: &[DeductionBatchEntry],
    ) -> Result<(), SourceStoreError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for entry in entries {
            let item = &entry.source_item;

            // The item carries the post-deduction quantity; the update lands
            // only if the stored quantity still equals the pre-deduction one.
            let result = sqlx::query(
                r#"
                UPDATE source_items
                SET quantity = $3, status = $4, updated_at = NOW()
                WHERE source_code = $1 AND sku = $2 AND quantity = $3 + $5
                "#,
            )
            .bind(item.source_code())
            .bind(item.sku())
            .bind(item.quantity())
            .bind(item.status().as_i16())
            .bind(entry.qty_to_decrement)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("decrement_source_item", e))?;

            if result.rows_affected() == 0 {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(SourceStoreError::Concurrency(format!(
                    "source item {}/{} changed since it was read",
                    item.source_code(),
                    item.sku()
                )));
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(())
    }
}

// The repository/persister traits are synchronous, but Postgres operations
// require async. As with other sync-over-async adapters in this workspace,
// callers must already be inside a tokio runtime context.

fn runtime_handle() -> Result<tokio::runtime::Handle, SourceStoreError> {
    tokio::runtime::Handle::try_current().map_err(|_| {
        SourceStoreError::Storage(
            "PostgresSourceItemStore requires an async runtime (tokio); \
             call from within a tokio runtime context"
                .to_string(),
        )
    })
}

impl SourceItemRepository for PostgresSourceItemStore {
    fn get(&self, source_code: &str, sku: &str) -> Result<SourceItem, SourceStoreError> {
        let handle = runtime_handle()?;
        handle.block_on(self.fetch_item(source_code, sku))
    }

    fn save(&self, item: &SourceItem) -> Result<(), SourceStoreError> {
        let handle = runtime_handle()?;
        handle.block_on(self.save_item(item))
    }
}

impl BatchPersister for PostgresSourceItemStore {
    fn persist(&self, entries: &[DeductionBatchEntry]) -> Result<(), SourceStoreError> {
        let handle = runtime_handle()?;
        handle.block_on(self.apply_batch(entries))
    }
}

#[async_trait]
impl SourceItemQuery for PostgresSourceItemStore {
    async fn list_by_source(
        &self,
        source_code: &str,
        pagination: Option<Pagination>,
    ) -> Result<SourceItemPage, SourceStoreError> {
        let pagination = pagination.unwrap_or_default();

        let count_row =
            sqlx::query("SELECT COUNT(*) as total FROM source_items WHERE source_code = $1")
                .bind(source_code)
                .fetch_one(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("count_source_items", e))?;

        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| SourceStoreError::Storage(format!("failed to read count: {e}")))?;

        let rows = sqlx::query(
            r#"
            SELECT source_code, sku, quantity, status
            FROM source_items
            WHERE source_code = $1
            ORDER BY sku ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(source_code)
        .bind(pagination.limit as i64)
        .bind(pagination.offset as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_source_items", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let stored = SourceItemRow::from_row(&row).map_err(|e| {
                SourceStoreError::Storage(format!("failed to deserialize source item row: {e}"))
            })?;
            items.push(stored.try_into()?);
        }

        let has_more = total > (pagination.offset + pagination.limit) as i64;

        Ok(SourceItemPage {
            items,
            total: total as u64,
            pagination,
            has_more,
        })
    }
}

/// Map SQLx errors to SourceStoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> SourceStoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // Unique violation: concurrent insert for the same key.
                Some("23505") => SourceStoreError::Concurrency(msg),
                _ => SourceStoreError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            SourceStoreError::Storage(format!("connection pool closed in {operation}"))
        }
        _ => SourceStoreError::Storage(format!("sqlx error in {operation}: {err}")),
    }
}

#[derive(Debug)]
struct SourceItemRow {
    source_code: String,
    sku: String,
    quantity: f64,
    status: i16,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for SourceItemRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(SourceItemRow {
            source_code: row.try_get("source_code")?,
            sku: row.try_get("sku")?,
            quantity: row.try_get("quantity")?,
            status: row.try_get("status")?,
        })
    }
}

impl TryFrom<SourceItemRow> for SourceItem {
    type Error = SourceStoreError;

    fn try_from(row: SourceItemRow) -> Result<Self, Self::Error> {
        let status = SourceItemStatus::from_i16(row.status)
            .map_err(|e| SourceStoreError::Storage(format!("invalid source item row: {e}")))?;

        SourceItem::new(row.source_code, row.sku, row.quantity, status)
            .map_err(|e| SourceStoreError::Storage(format!("invalid source item row: {e}")))
    }
}
