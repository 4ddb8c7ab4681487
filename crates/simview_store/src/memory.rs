//! In-memory reference data source.
//!
//! [`MemoryStore`] keeps entities as maps of dynamically typed component
//! values, with a per-write monotone mark so each open subscription can compute
//! its own added / removed / changed sets on refresh, relative to its own
//! previous refresh. It is the store used by the tests, the decay example, and
//! the demo binary.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use simview_entity::{
    Component, ComponentTypeId, Entity, EntityAllocator, EntityRecord, Filter,
    SubscriptionDescriptor,
};

use crate::error::StoreError;
use crate::store::{EntityStore, SubscriptionId};

/// One entity's component values plus the store clock at which each component
/// was last written.
#[derive(Debug, Clone, Default)]
struct EntityData {
    components: HashMap<ComponentTypeId, Value>,
    modified: HashMap<ComponentTypeId, u64>,
}

/// Per-subscription bookkeeping: the descriptor, the membership observed at the
/// last refresh, and the diff sets that refresh produced.
struct SubscriptionState {
    descriptor: SubscriptionDescriptor,
    members: HashSet<Entity>,
    added: Vec<Entity>,
    removed: Vec<Entity>,
    changed: Vec<Entity>,
    /// Store clock at the last refresh; writes after this mark count as changes.
    last_mark: u64,
}

/// An in-memory entity store with refreshable subscriptions.
#[derive(Default)]
pub struct MemoryStore {
    allocator: EntityAllocator,
    entities: HashMap<Entity, EntityData>,
    subscriptions: HashMap<SubscriptionId, SubscriptionState>,
    next_subscription: u64,
    /// Monotone write clock, bumped on every component write.
    clock: u64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a new entity with no components.
    pub fn spawn(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.entities.insert(entity, EntityData::default());
        entity
    }

    /// Write a typed component onto an entity, creating or replacing it.
    pub fn set_component<C: Component>(
        &mut self,
        entity: Entity,
        value: &C,
    ) -> Result<(), StoreError> {
        let encoded = serde_json::to_value(value)?;
        self.set_raw(entity, C::type_id(), encoded)
    }

    /// Write a dynamic component value onto an entity.
    pub fn set_raw(
        &mut self,
        entity: Entity,
        type_id: ComponentTypeId,
        value: Value,
    ) -> Result<(), StoreError> {
        let data = self
            .entities
            .get_mut(&entity)
            .ok_or(StoreError::EntityNotFound(entity))?;
        self.clock += 1;
        data.components.insert(type_id, value);
        data.modified.insert(type_id, self.clock);
        Ok(())
    }

    /// Remove a component from an entity. Subscriptions requiring it observe
    /// the entity as removed at their next refresh.
    pub fn remove_component(
        &mut self,
        entity: Entity,
        type_id: ComponentTypeId,
    ) -> Result<(), StoreError> {
        let data = self
            .entities
            .get_mut(&entity)
            .ok_or(StoreError::EntityNotFound(entity))?;
        data.components.remove(&type_id);
        data.modified.remove(&type_id);
        Ok(())
    }

    /// Returns `true` if the entity exists.
    #[must_use]
    pub fn exists(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    /// The number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn state(&self, sub: SubscriptionId) -> Result<&SubscriptionState, StoreError> {
        self.subscriptions
            .get(&sub)
            .ok_or(StoreError::UnknownSubscription(sub))
    }

    /// Whether an entity's data currently satisfies a descriptor.
    fn matches(entity: Entity, data: &EntityData, descriptor: &SubscriptionDescriptor) -> bool {
        if !descriptor
            .required()
            .iter()
            .all(|ty| data.components.contains_key(ty))
        {
            return false;
        }
        // Only materialize a record when a value-level filter needs one.
        if descriptor.filter().is_some() {
            let record = EntityRecord::new(entity, data.components.clone());
            return descriptor.matches(&record);
        }
        true
    }

    /// Whether any tracked component of `data` was written after `mark`.
    fn dirty_since(data: &EntityData, descriptor: &SubscriptionDescriptor, mark: u64) -> bool {
        if descriptor.required().is_empty() {
            return data.modified.values().any(|&m| m > mark);
        }
        descriptor
            .required()
            .iter()
            .any(|ty| data.modified.get(ty).is_some_and(|&m| m > mark))
    }
}

impl EntityStore for MemoryStore {
    fn open(&mut self, descriptor: SubscriptionDescriptor) -> SubscriptionId {
        self.next_subscription += 1;
        let sub = SubscriptionId(self.next_subscription);
        self.subscriptions.insert(
            sub,
            SubscriptionState {
                descriptor,
                members: HashSet::new(),
                added: Vec::new(),
                removed: Vec::new(),
                changed: Vec::new(),
                last_mark: 0,
            },
        );
        debug!(%sub, "subscription opened");
        sub
    }

    fn refresh(&mut self, sub: SubscriptionId) -> Result<bool, StoreError> {
        let state = self.state(sub)?;
        let descriptor = state.descriptor.clone();
        let last_mark = state.last_mark;
        let old_members = state.members.clone();

        let current: HashSet<Entity> = self
            .entities
            .iter()
            .filter(|&(&entity, data)| Self::matches(entity, data, &descriptor))
            .map(|(&entity, _)| entity)
            .collect();

        let mut added: Vec<Entity> = current.difference(&old_members).copied().collect();
        let mut removed: Vec<Entity> = old_members.difference(&current).copied().collect();
        let mut changed: Vec<Entity> = current
            .intersection(&old_members)
            .copied()
            .filter(|entity| {
                self.entities
                    .get(entity)
                    .is_some_and(|data| Self::dirty_since(data, &descriptor, last_mark))
            })
            .collect();

        added.sort_unstable();
        removed.sort_unstable();
        changed.sort_unstable();

        let any = !(added.is_empty() && removed.is_empty() && changed.is_empty());
        let mark = self.clock;

        let state = self
            .subscriptions
            .get_mut(&sub)
            .ok_or(StoreError::UnknownSubscription(sub))?;
        state.members = current;
        state.added = added;
        state.removed = removed;
        state.changed = changed;
        state.last_mark = mark;

        debug!(
            %sub,
            members = state.members.len(),
            added = state.added.len(),
            removed = state.removed.len(),
            changed = state.changed.len(),
            "subscription refreshed"
        );
        Ok(any)
    }

    fn added(&self, sub: SubscriptionId) -> Result<Vec<Entity>, StoreError> {
        Ok(self.state(sub)?.added.clone())
    }

    fn removed(&self, sub: SubscriptionId) -> Result<Vec<Entity>, StoreError> {
        Ok(self.state(sub)?.removed.clone())
    }

    fn changed(&self, sub: SubscriptionId) -> Result<Vec<Entity>, StoreError> {
        Ok(self.state(sub)?.changed.clone())
    }

    fn members(&self, sub: SubscriptionId) -> Result<Vec<Entity>, StoreError> {
        Ok(self.state(sub)?.members.iter().copied().collect())
    }

    fn member_count(&self, sub: SubscriptionId) -> Result<usize, StoreError> {
        Ok(self.state(sub)?.members.len())
    }

    fn set_filter(
        &mut self,
        sub: SubscriptionId,
        filter: Option<Filter>,
    ) -> Result<(), StoreError> {
        let state = self
            .subscriptions
            .get_mut(&sub)
            .ok_or(StoreError::UnknownSubscription(sub))?;
        state.descriptor.set_filter(filter);
        Ok(())
    }

    fn release(&mut self, sub: SubscriptionId) -> Result<(), StoreError> {
        self.subscriptions
            .remove(&sub)
            .ok_or(StoreError::UnknownSubscription(sub))?;
        debug!(%sub, "subscription released");
        Ok(())
    }

    fn fetch(&self, entity: Entity) -> Option<EntityRecord> {
        self.entities
            .get(&entity)
            .map(|data| EntityRecord::new(entity, data.components.clone()))
    }

    fn destroy(&mut self, entity: Entity) -> bool {
        self.entities.remove(&entity).is_some()
    }
}
