//! Source item persistence boundary.
//!
//! This module defines the infrastructure-facing abstractions for reading and
//! writing source items without making storage assumptions: the plain
//! per-item update path, the all-or-nothing decrement batch, and a paginated
//! read side.

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod r#trait;

pub use in_memory::InMemorySourceItemStore;
pub use postgres::PostgresSourceItemStore;
pub use query::{Pagination, SourceItemPage, SourceItemQuery};
pub use r#trait::{BatchPersister, DeductionBatchEntry, SourceItemRepository, SourceStoreError};
