//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: a catalog entry
/// for a work is fully described by its attributes. To "modify" one, build a
/// new value.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Isbn(String);
///
/// impl ValueObject for Isbn {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
