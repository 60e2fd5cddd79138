//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**: they are defined entirely by their
//! attribute values. An equivalence pair stored twice is still the same pair,
//! which is what lets lookups deduplicate by value.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Price { cents: i64 }
///
/// impl ValueObject for Price {}
///
/// assert_eq!(Price { cents: 100 }, Price { cents: 100 });
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
