//! # Entity Handles
//!
//! Entities are lightweight identifiers consisting of:
//! - An index shared by every component pool and the signature table
//! - A generation counter for detecting handles that outlived a commit

use std::cmp::Ordering;
use std::fmt;

/// Handle to an entity owned by a [`Registry`](super::Registry).
///
/// The handle is split into two parts:
/// - Lower 32 bits: the entity id, reused after the entity is destroyed
/// - Upper 32 bits: generation counter, bumped every time the id is freed
///
/// Entities carry no data of their own; every query goes through the registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Creates a handle from an id and generation.
    #[inline]
    #[must_use]
    pub const fn new(id: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (id as u64))
    }

    /// Returns the numeric entity id.
    ///
    /// Ids are reused: a later entity may be issued the same id with a
    /// newer generation.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the handle.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the id as a table index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.id() as usize
    }

    /// Packed representation, stable for a given handle.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }
}

impl Ord for Entity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id()
            .cmp(&other.id())
            .then_with(|| self.generation().cmp(&other.generation()))
    }
}

impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.id(), self.generation())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_roundtrip() {
        let entity = Entity::new(12345, 67890);
        assert_eq!(entity.id(), 12345);
        assert_eq!(entity.generation(), 67890);
        assert_eq!(entity.index(), 12345);
    }

    #[test]
    fn test_ordering_by_id_first() {
        let low_new = Entity::new(3, 9);
        let high_old = Entity::new(7, 0);
        assert!(low_new < high_old);
        assert!(Entity::new(3, 0) < Entity::new(3, 1));
    }

    #[test]
    fn test_reissued_id_is_distinct() {
        assert_ne!(Entity::new(4, 0), Entity::new(4, 1));
        assert_eq!(Entity::new(4, 1), Entity::new(4, 1));
    }
}
