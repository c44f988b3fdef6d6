//! Stock resolution and stock item configuration lookups.
//!
//! Both concerns are lookup tables from the engine's point of view: which
//! stock a sales channel sells from, and how one SKU behaves on that stock.
//! How the tables are populated (admin UI, import, sync) is outside this
//! crate; the in-memory variants below back tests and dev setups.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stockflow_core::StockId;
use stockflow_inventory::StockItemConfiguration;
use stockflow_sales::SalesChannel;

/// Maps a sales channel to the stock it sells from.
pub trait StockResolver: Send + Sync {
    /// `None` when the channel has no assigned stock.
    fn resolve(&self, channel: &SalesChannel) -> Option<StockId>;
}

/// Per-(sku, stock) configuration lookup.
pub trait StockConfigurationProvider: Send + Sync {
    /// `None` when the sku/stock combination is unknown.
    fn get(&self, sku: &str, stock_id: StockId) -> Option<StockItemConfiguration>;
}

impl<R> StockResolver for Arc<R>
where
    R: StockResolver + ?Sized,
{
    fn resolve(&self, channel: &SalesChannel) -> Option<StockId> {
        (**self).resolve(channel)
    }
}

impl<C> StockConfigurationProvider for Arc<C>
where
    C: StockConfigurationProvider + ?Sized,
{
    fn get(&self, sku: &str, stock_id: StockId) -> Option<StockItemConfiguration> {
        (**self).get(sku, stock_id)
    }
}

/// In-memory channel→stock mapping for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStockResolver {
    channels: RwLock<HashMap<SalesChannel, StockId>>,
}

impl InMemoryStockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&self, channel: SalesChannel, stock_id: StockId) {
        if let Ok(mut map) = self.channels.write() {
            map.insert(channel, stock_id);
        }
    }
}

impl StockResolver for InMemoryStockResolver {
    fn resolve(&self, channel: &SalesChannel) -> Option<StockId> {
        let map = self.channels.read().ok()?;
        map.get(channel).copied()
    }
}

/// In-memory (sku, stock)→configuration table for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStockConfigurationProvider {
    configs: RwLock<HashMap<(String, StockId), StockItemConfiguration>>,
}

impl InMemoryStockConfigurationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(
        &self,
        sku: impl Into<String>,
        stock_id: StockId,
        config: StockItemConfiguration,
    ) {
        if let Ok(mut map) = self.configs.write() {
            map.insert((sku.into(), stock_id), config);
        }
    }
}

impl StockConfigurationProvider for InMemoryStockConfigurationProvider {
    fn get(&self, sku: &str, stock_id: StockId) -> Option<StockItemConfiguration> {
        let map = self.configs.read().ok()?;
        map.get(&(sku.to_string(), stock_id)).copied()
    }
}
