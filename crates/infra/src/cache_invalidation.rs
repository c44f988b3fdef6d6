//! Cache invalidation: entity registrations and cache-clear notifications.
//!
//! When a deduction flips a source item to out of stock, the affected
//! products' cached representations are stale. The engine registers those
//! products under the `product` entity tag and broadcasts a generic
//! cache-clear notification; whoever maintains the caches subscribes and
//! reacts. Invalidation failures propagate — a deduction that persisted but
//! could not notify must be visible to operators.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockflow_core::ProductId;
use stockflow_events::EventBus;

/// Cache entity tag for product records.
pub const PRODUCT_CACHE_TAG: &str = "product";

/// Event name broadcast when cached entities must be cleared.
pub const CLEAN_CACHE_BY_TAGS: &str = "clean_cache_by_tags";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cache invalidation failed: {0}")]
pub struct InvalidationError(pub String);

/// Accumulated entity registrations for one invalidation round.
///
/// Identities are `tag_id` strings, ordered by tag and registration order
/// within a tag; duplicate ids per tag collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheContext {
    entities: BTreeMap<String, Vec<ProductId>>,
}

impl CacheContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_entities(&mut self, entity_tag: impl Into<String>, ids: &[ProductId]) {
        let registered = self.entities.entry(entity_tag.into()).or_default();
        for id in ids {
            if !registered.contains(id) {
                registered.push(*id);
            }
        }
    }

    pub fn identities(&self) -> Vec<String> {
        self.entities
            .iter()
            .flat_map(|(tag, ids)| ids.iter().map(move |id| format!("{tag}_{id}")))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.values().all(|ids| ids.is_empty())
    }
}

/// Marks cached entities stale and broadcasts cache-clear notifications.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, entity_tag: &str, ids: &[ProductId]) -> Result<(), InvalidationError>;

    fn notify(&self, event_name: &str, context: &CacheContext) -> Result<(), InvalidationError>;
}

impl<I> CacheInvalidator for std::sync::Arc<I>
where
    I: CacheInvalidator + ?Sized,
{
    fn invalidate(&self, entity_tag: &str, ids: &[ProductId]) -> Result<(), InvalidationError> {
        (**self).invalidate(entity_tag, ids)
    }

    fn notify(&self, event_name: &str, context: &CacheContext) -> Result<(), InvalidationError> {
        (**self).notify(event_name, context)
    }
}

/// Notification broadcast on the event bus when cached entities must be
/// cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheCleanNotification {
    pub event_name: String,
    pub identities: Vec<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Bus-backed invalidator.
///
/// `invalidate` registers entities into a process-wide context (queryable by
/// operators); `notify` publishes a snapshot of the passed context on the
/// bus.
#[derive(Debug)]
pub struct BusCacheInvalidator<B> {
    bus: B,
    registered: RwLock<CacheContext>,
}

impl<B> BusCacheInvalidator<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            registered: RwLock::new(CacheContext::new()),
        }
    }

    /// Everything registered since process start.
    pub fn registered(&self) -> CacheContext {
        self.registered
            .read()
            .map(|ctx| ctx.clone())
            .unwrap_or_default()
    }
}

impl<B> CacheInvalidator for BusCacheInvalidator<B>
where
    B: EventBus<CacheCleanNotification>,
{
    fn invalidate(&self, entity_tag: &str, ids: &[ProductId]) -> Result<(), InvalidationError> {
        let mut registered = self
            .registered
            .write()
            .map_err(|_| InvalidationError("cache context lock poisoned".to_string()))?;

        registered.register_entities(entity_tag, ids);
        Ok(())
    }

    fn notify(&self, event_name: &str, context: &CacheContext) -> Result<(), InvalidationError> {
        let notification = CacheCleanNotification {
            event_name: event_name.to_string(),
            identities: context.identities(),
            occurred_at: Utc::now(),
        };

        self.bus
            .publish(notification)
            .map_err(|e| InvalidationError(format!("notification publish failed: {e:?}")))
    }
}
