//! Entity identity and allocation.
//!
//! An [`Entity`] is a lightweight `u64` token with no inherent data. Identities
//! are allocated monotonically and never reused, so a view container holding an
//! identity across ticks can rely on it naming the same entity for as long as
//! the container tracks it.

use serde::{Deserialize, Serialize};

/// An opaque, comparable, hashable entity identity.
///
/// Entities carry no data of their own; components attached in the data source
/// give them meaning. Two live entities never share an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(u64);

impl Entity {
    /// Create an entity from a raw `u64` identifier.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Allocates monotonically increasing entity identities.
///
/// IDs are never recycled: an identity stays unambiguous for the whole time any
/// subscription or view container still refers to it.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates a new allocator. The first allocated identity is `1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh entity identity.
    pub fn allocate(&mut self) -> Entity {
        self.next_id += 1;
        Entity(self.next_id)
    }

    /// Returns the number of identities handed out so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_produces_unique_ids() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();
        let e2 = alloc.allocate();
        assert_ne!(e1, e2);
        assert_eq!(alloc.count(), 2);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut alloc = EntityAllocator::new();
        let seen: Vec<Entity> = (0..100).map(|_| alloc.allocate()).collect();
        let next = alloc.allocate();
        assert!(!seen.contains(&next));
    }

    #[test]
    fn test_display() {
        assert_eq!(Entity::from_raw(7).to_string(), "entity#7");
    }
}
