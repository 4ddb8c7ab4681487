//! The entity data source boundary.
//!
//! A view container consumes a data source exclusively through [`EntityStore`]:
//! it opens a subscription, refreshes it on demand, and reads the added /
//! removed / changed entity sets the refresh computed. The store decides *which*
//! entities match a descriptor; the container never evaluates membership itself.

use simview_entity::{Entity, EntityRecord, Filter, SubscriptionDescriptor};

use crate::error::StoreError;

/// A handle naming one open subscription within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "subscription#{}", self.0)
    }
}

/// A store of entities and components that can evaluate subscriptions into
/// live, refreshable membership.
///
/// Access is exclusive and serialized: one logical caller drives a given
/// subscription's `refresh` and reads its diff sets. For a single refresh the
/// added, removed, and changed sets are pairwise disjoint.
pub trait EntityStore {
    /// Open a subscription for the given descriptor. Membership is empty until
    /// the first [`EntityStore::refresh`].
    fn open(&mut self, descriptor: SubscriptionDescriptor) -> SubscriptionId;

    /// Re-evaluate the subscription against current store state, recomputing
    /// the added / removed / changed sets relative to the previous refresh.
    ///
    /// Returns `true` if any of the three sets is non-empty.
    fn refresh(&mut self, sub: SubscriptionId) -> Result<bool, StoreError>;

    /// Entities that started matching at the last refresh.
    fn added(&self, sub: SubscriptionId) -> Result<Vec<Entity>, StoreError>;

    /// Entities that stopped matching at the last refresh.
    fn removed(&self, sub: SubscriptionId) -> Result<Vec<Entity>, StoreError>;

    /// Entities that kept matching but had a tracked component written since
    /// the previous refresh.
    fn changed(&self, sub: SubscriptionId) -> Result<Vec<Entity>, StoreError>;

    /// The full current matching set, as of the last refresh.
    fn members(&self, sub: SubscriptionId) -> Result<Vec<Entity>, StoreError>;

    /// The live member count, as of the last refresh.
    fn member_count(&self, sub: SubscriptionId) -> Result<usize, StoreError>;

    /// Replace the subscription's filter. Takes effect at the next refresh;
    /// the store must not report the filter change itself as a diff.
    fn set_filter(&mut self, sub: SubscriptionId, filter: Option<Filter>)
        -> Result<(), StoreError>;

    /// Release the subscription and any bookkeeping held on its behalf.
    fn release(&mut self, sub: SubscriptionId) -> Result<(), StoreError>;

    /// Materialize the full current component data for an entity.
    fn fetch(&self, entity: Entity) -> Option<EntityRecord>;

    /// Request destruction of an entity. Returns `true` if it existed.
    ///
    /// Open subscriptions observe the destruction as a removal at their next
    /// refresh.
    fn destroy(&mut self, entity: Entity) -> bool;
}
