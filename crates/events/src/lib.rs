//! `stockflow-events` — notification transport (pub/sub mechanics only).
//!
//! This crate carries no domain knowledge. It provides the bus abstraction the
//! deduction pipeline uses to broadcast cache-clear notifications, plus an
//! in-memory implementation for tests/dev.

pub mod bus;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
