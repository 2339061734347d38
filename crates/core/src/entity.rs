//! Entity traits: identity + ownership.

use crate::id::UserId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// An entity that belongs to exactly one user (the tenancy boundary).
pub trait Owned: Entity {
    fn owner_id(&self) -> UserId;
}
