//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; they
/// carry no identity of their own. A stock item configuration or a sales
/// channel is a value object — a source item, which keeps its identity across
/// quantity changes, is not.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
