//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Two entities with the same identifier are the same entity, even when their
/// state differs (a borrowed copy is still the same copy).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Identity comparison, independent of the rest of the state.
    fn same_identity_as(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
