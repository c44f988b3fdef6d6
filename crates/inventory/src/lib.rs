//! `stockflow-inventory` — inventory domain types for source deduction.
//!
//! A *source* is a physical location stock ships from; a *source item* is the
//! quantity of one SKU at one source. Deduction requests describe which SKUs
//! a sales event consumed; the policy for applying them lives in the
//! deduction pipeline (infra), the data model lives here.

pub mod configuration;
pub mod request;
pub mod source_item;
pub mod stock_status;

pub use configuration::StockItemConfiguration;
pub use request::{ItemToDeduct, SourceDeductionRequest};
pub use source_item::{SourceItem, SourceItemStatus};
pub use stock_status::source_stock_status;
