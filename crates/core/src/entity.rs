//! Entity trait: identity that survives state changes.

/// Marker interface for domain records with a stable identity.
///
/// A `Sale` keeps its serial for its whole life, a `Transfer` keeps its id
/// across status transitions; equality of attributes does not make two
/// entities the same record.
pub trait Entity {
    /// Strongly-typed identifier (`SerialNumber`, `TransferId`, `Alias`).
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
