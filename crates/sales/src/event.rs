use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockflow_core::ValueObject;

/// Kind of sales activity that triggers an inventory movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesEventType {
    OrderPlaced,
    OrderCanceled,
    ShipmentCreated,
    CreditmemoCreated,
}

impl SalesEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalesEventType::OrderPlaced => "order_placed",
            SalesEventType::OrderCanceled => "order_canceled",
            SalesEventType::ShipmentCreated => "shipment_created",
            SalesEventType::CreditmemoCreated => "creditmemo_created",
        }
    }
}

impl core::fmt::Display for SalesEventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sales event together with the object that raised it.
///
/// `object_type`/`object_id` reference the sales document (order, shipment,
/// credit memo) the event belongs to; the deduction pipeline treats them as
/// opaque context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesEvent {
    event_type: SalesEventType,
    object_type: String,
    object_id: Uuid,
}

impl SalesEvent {
    /// Object type for sales orders.
    pub const OBJECT_TYPE_ORDER: &'static str = "order";

    pub fn new(
        event_type: SalesEventType,
        object_type: impl Into<String>,
        object_id: Uuid,
    ) -> Self {
        Self {
            event_type,
            object_type: object_type.into(),
            object_id,
        }
    }

    /// Convenience constructor for order-scoped events.
    pub fn for_order(event_type: SalesEventType, order_id: Uuid) -> Self {
        Self::new(event_type, Self::OBJECT_TYPE_ORDER, order_id)
    }

    pub fn event_type(&self) -> SalesEventType {
        self.event_type
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn object_id(&self) -> Uuid {
        self.object_id
    }
}

impl ValueObject for SalesEvent {}
