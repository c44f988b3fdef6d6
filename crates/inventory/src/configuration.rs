use serde::{Deserialize, Serialize};

use stockflow_core::ValueObject;

/// Per-(sku, stock) stock item configuration.
///
/// - `manage_stock`: whether inventory is tracked for the SKU at all; when
///   false the SKU is never validated or deducted.
/// - `min_qty`: the quantity at which the source is considered depleted.
/// - `backorders`: whether selling below the minimum is allowed.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItemConfiguration {
    manage_stock: bool,
    min_qty: f64,
    backorders: bool,
}

impl StockItemConfiguration {
    pub fn new(manage_stock: bool, min_qty: f64, backorders: bool) -> Self {
        Self {
            manage_stock,
            min_qty,
            backorders,
        }
    }

    /// Managed, min_qty 0, no backorders — the common storefront default.
    pub fn managed() -> Self {
        Self::new(true, 0.0, false)
    }

    /// Untracked SKU; deduction skips these entirely.
    pub fn unmanaged() -> Self {
        Self::new(false, 0.0, false)
    }

    pub fn manage_stock(&self) -> bool {
        self.manage_stock
    }

    pub fn min_qty(&self) -> f64 {
        self.min_qty
    }

    pub fn backorders(&self) -> bool {
        self.backorders
    }
}

impl ValueObject for StockItemConfiguration {}
