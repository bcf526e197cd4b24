//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; two
/// with the same values are the same value. Identifiers like `ProductCode`
/// and quantities like `PurchasePrice` are value objects, while `Sale` or
/// `Transfer` are entities with identity.
///
/// To "modify" a value object, build a new one. The trait only requires what
/// value semantics need: `Clone`, `PartialEq`, `Debug`.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
