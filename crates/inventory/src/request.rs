use serde::{Deserialize, Serialize};

use stockflow_core::{DomainError, DomainResult};
use stockflow_sales::{SalesChannel, SalesEvent};

/// One SKU/quantity pair of a deduction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemToDeduct {
    sku: String,
    qty: f64,
}

impl ItemToDeduct {
    pub fn new(sku: impl Into<String>, qty: f64) -> DomainResult<Self> {
        let sku = sku.into();
        if sku.trim().is_empty() {
            return Err(DomainError::validation("item sku cannot be empty"));
        }
        if !qty.is_finite() || qty <= 0.0 {
            return Err(DomainError::validation(format!(
                "item qty must be a positive finite number, got {qty}"
            )));
        }

        Ok(Self { sku, qty })
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn qty(&self) -> f64 {
        self.qty
    }
}

/// A request to deduct quantities from one source.
///
/// Immutable input to the deduction pipeline; built by the caller, consumed
/// once. Items are processed in the order given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDeductionRequest {
    source_code: String,
    sales_channel: SalesChannel,
    sales_event: SalesEvent,
    items: Vec<ItemToDeduct>,
}

impl SourceDeductionRequest {
    pub fn new(
        source_code: impl Into<String>,
        sales_channel: SalesChannel,
        sales_event: SalesEvent,
        items: Vec<ItemToDeduct>,
    ) -> DomainResult<Self> {
        let source_code = source_code.into();
        if source_code.trim().is_empty() {
            return Err(DomainError::validation("source code cannot be empty"));
        }

        Ok(Self {
            source_code,
            sales_channel,
            sales_event,
            items,
        })
    }

    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    pub fn sales_channel(&self) -> &SalesChannel {
        &self.sales_channel
    }

    pub fn sales_event(&self) -> &SalesEvent {
        &self.sales_event
    }

    pub fn items(&self) -> &[ItemToDeduct] {
        &self.items
    }
}
