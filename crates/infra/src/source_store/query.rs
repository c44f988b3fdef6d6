use async_trait::async_trait;

use stockflow_inventory::SourceItem;

use super::r#trait::SourceStoreError;

/// Pagination window for source item listings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

/// One page of source items plus paging metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceItemPage {
    pub items: Vec<SourceItem>,
    pub total: u64,
    pub pagination: Pagination,
    pub has_more: bool,
}

/// Read side: paginated listings of source items per source.
///
/// This is the reporting/admin surface; the deduction pipeline never reads
/// through it.
#[async_trait]
pub trait SourceItemQuery: Send + Sync {
    async fn list_by_source(
        &self,
        source_code: &str,
        pagination: Option<Pagination>,
    ) -> Result<SourceItemPage, SourceStoreError>;
}
