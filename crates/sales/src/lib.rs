//! `stockflow-sales` — sales-side value objects consumed at the deduction
//! boundary.
//!
//! Deduction requests originate from sales activity: an order was placed,
//! canceled, shipped, or refunded through some sales channel. This crate
//! models that boundary; it does not model orders themselves.

pub mod channel;
pub mod event;

pub use channel::SalesChannel;
pub use event::{SalesEvent, SalesEventType};
