use serde::{Deserialize, Serialize};

use stockflow_core::{DomainError, DomainResult};

use crate::configuration::StockItemConfiguration;
use crate::stock_status::source_stock_status;

/// Stock status of a (source, sku) pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceItemStatus {
    OutOfStock = 0,
    InStock = 1,
}

impl SourceItemStatus {
    /// Numeric form used by persistence backends (0 = out of stock, 1 = in stock).
    pub fn as_i16(&self) -> i16 {
        match self {
            SourceItemStatus::OutOfStock => 0,
            SourceItemStatus::InStock => 1,
        }
    }

    pub fn from_i16(value: i16) -> DomainResult<Self> {
        match value {
            0 => Ok(SourceItemStatus::OutOfStock),
            1 => Ok(SourceItemStatus::InStock),
            other => Err(DomainError::validation(format!(
                "invalid source item status value: {other}"
            ))),
        }
    }
}

/// Quantity and status of one SKU at one source.
///
/// Mutable entity, identified by (source_code, sku). The status is never set
/// independently of a quantity change: [`SourceItem::deduct`] is the only
/// mutating operation and re-derives the status from configuration each time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    source_code: String,
    sku: String,
    quantity: f64,
    status: SourceItemStatus,
}

impl SourceItem {
    /// Create a source item.
    ///
    /// The sku may be empty — legacy records without a resolvable SKU exist
    /// and are tolerated downstream (they are skipped during cache
    /// invalidation, not rejected).
    pub fn new(
        source_code: impl Into<String>,
        sku: impl Into<String>,
        quantity: f64,
        status: SourceItemStatus,
    ) -> DomainResult<Self> {
        let source_code = source_code.into();
        if source_code.trim().is_empty() {
            return Err(DomainError::validation("source code cannot be empty"));
        }
        if !quantity.is_finite() {
            return Err(DomainError::validation("source item quantity must be finite"));
        }

        Ok(Self {
            source_code,
            sku: sku.into(),
            quantity,
            status,
        })
    }

    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn status(&self) -> SourceItemStatus {
        self.status
    }

    /// Deduct `qty` from the item and re-derive its stock status.
    ///
    /// The quantity may go negative; whether that is acceptable is the
    /// caller's policy decision, not the entity's.
    pub fn deduct(&mut self, qty: f64, config: &StockItemConfiguration) {
        self.quantity -= qty;
        self.status = source_stock_status(config, self);
    }
}
