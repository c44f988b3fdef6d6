//! SKU → product identifier lookup with read-through caching.
//!
//! After a deduction drives a source item out of stock, the affected
//! product's cached representations must be invalidated. The lookup that
//! binds a SKU to its product runs once per sku per process: the
//! read-through cache below has no eviction and lives for the process
//! lifetime, and it caches misses as well as hits so unknown skus stay
//! cheap on repeat.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stockflow_core::ProductId;

/// SKU → product identifier lookup (side-effect free).
pub trait ProductIdResolver: Send + Sync {
    /// `None` when no product is bound to the sku.
    fn product_id_for_sku(&self, sku: &str) -> Option<ProductId>;
}

impl<R> ProductIdResolver for Arc<R>
where
    R: ProductIdResolver + ?Sized,
{
    fn product_id_for_sku(&self, sku: &str) -> Option<ProductId> {
        (**self).product_id_for_sku(sku)
    }
}

/// In-memory sku→product table for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductIndex {
    products: RwLock<HashMap<String, ProductId>>,
}

impl InMemoryProductIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, sku: impl Into<String>, product_id: ProductId) {
        if let Ok(mut map) = self.products.write() {
            map.insert(sku.into(), product_id);
        }
    }
}

impl ProductIdResolver for InMemoryProductIndex {
    fn product_id_for_sku(&self, sku: &str) -> Option<ProductId> {
        let map = self.products.read().ok()?;
        map.get(sku).copied()
    }
}

/// Read-through cache over another resolver.
///
/// Process-lifetime, no eviction. Both outcomes are cached: a sku that
/// resolved to nothing keeps resolving to nothing without consulting the
/// inner resolver again.
#[derive(Debug)]
pub struct CachingProductIdResolver<R> {
    inner: R,
    cache: RwLock<HashMap<String, Option<ProductId>>>,
}

impl<R> CachingProductIdResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

impl<R> ProductIdResolver for CachingProductIdResolver<R>
where
    R: ProductIdResolver,
{
    fn product_id_for_sku(&self, sku: &str) -> Option<ProductId> {
        if let Ok(cache) = self.cache.read() {
            if let Some(cached) = cache.get(sku) {
                return *cached;
            }
        }

        let resolved = self.inner.product_id_for_sku(sku);

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(sku.to_string(), resolved);
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often the inner lookup actually runs.
    #[derive(Debug, Default)]
    struct CountingResolver {
        index: InMemoryProductIndex,
        lookups: AtomicUsize,
    }

    impl ProductIdResolver for CountingResolver {
        fn product_id_for_sku(&self, sku: &str) -> Option<ProductId> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.index.product_id_for_sku(sku)
        }
    }

    #[test]
    fn repeated_lookups_hit_the_inner_resolver_once() {
        let counting = CountingResolver::default();
        let product_id = ProductId::new();
        counting.index.insert("SKU-1", product_id);
        let cached = CachingProductIdResolver::new(counting);

        for _ in 0..5 {
            assert_eq!(cached.product_id_for_sku("SKU-1"), Some(product_id));
        }

        assert_eq!(cached.inner.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn misses_are_cached_too() {
        let counting = CountingResolver::default();
        let cached = CachingProductIdResolver::new(counting);

        assert_eq!(cached.product_id_for_sku("UNKNOWN"), None);
        assert_eq!(cached.product_id_for_sku("UNKNOWN"), None);

        assert_eq!(cached.inner.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn distinct_skus_resolve_independently() {
        let counting = CountingResolver::default();
        let a = ProductId::new();
        counting.index.insert("SKU-A", a);
        let cached = CachingProductIdResolver::new(counting);

        assert_eq!(cached.product_id_for_sku("SKU-A"), Some(a));
        assert_eq!(cached.product_id_for_sku("SKU-B"), None);
        assert_eq!(cached.inner.lookups.load(Ordering::SeqCst), 2);
    }
}
