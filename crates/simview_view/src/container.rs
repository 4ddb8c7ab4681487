//! The reconciliation container.
//!
//! A [`ViewContainer`] owns one subscription against an entity data source and
//! keeps a caller-defined view object alive for every entity the subscription
//! currently matches. Each `update` asks the store to refresh the subscription
//! and, when anything moved, applies the diff in a fixed order: removals, then
//! additions, then in-place updates. A flat snapshot of all current views is
//! cached between membership changes for cheap repeated iteration.
//!
//! Containers are single-threaded: `start`, `update`, `stop`, and snapshot
//! reads all happen from one driver loop, with the store passed in mutably on
//! each call.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use simview_entity::{ComponentTypeId, Entity, Filter, SubscriptionDescriptor};
use simview_store::{EntityStore, SubscriptionId};

use crate::error::ViewError;
use crate::handler::ViewHandler;
use crate::snapshot::SnapshotCache;

/// Lifecycle of a container. Containers are not restartable: once stopped they
/// only report misuse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerState {
    /// Configured but not yet subscribed; the shape may still be extended.
    Configured,
    /// Subscribed and tracking.
    Started(SubscriptionId),
    /// Torn down; the subscription has been released.
    Stopped,
}

/// Keeps per-entity views synchronized with a subscription's membership.
///
/// The mapping invariant: an entity is a key in the container iff the
/// subscription added it and has not yet removed it, and its value is exactly
/// what [`ViewHandler::create_view`] returned for it.
pub struct ViewContainer<H: ViewHandler> {
    descriptor: SubscriptionDescriptor,
    handler: H,
    state: ContainerState,
    managed: HashMap<Entity, H::View>,
    snapshot: SnapshotCache<H::View>,
    /// Diff entries that could not be applied (removal or change reported for
    /// an entity the container does not manage). Warned and skipped, never
    /// fatal.
    inconsistencies: u64,
}

impl<H: ViewHandler> ViewContainer<H> {
    /// Create a container for the given subscription shape. Nothing is
    /// subscribed until [`ViewContainer::start`].
    #[must_use]
    pub fn new(descriptor: SubscriptionDescriptor, handler: H) -> Self {
        Self {
            descriptor,
            handler,
            state: ContainerState::Configured,
            managed: HashMap::new(),
            snapshot: SnapshotCache::Stale,
            inconsistencies: 0,
        }
    }

    /// Access the handler, e.g. to read state it accumulated across callbacks.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Extend the subscription's required component types.
    ///
    /// Only allowed before [`ViewContainer::start`]; afterwards the shape is
    /// frozen and this fails with [`ViewError::SubscriptionFrozen`].
    pub fn require_component(&mut self, type_id: ComponentTypeId) -> Result<(), ViewError> {
        if self.state != ContainerState::Configured {
            return Err(ViewError::SubscriptionFrozen);
        }
        self.descriptor.insert_required(type_id);
        Ok(())
    }

    /// Replace the subscription's filter.
    ///
    /// Allowed at any point. After `start` the change propagates to the data
    /// source; any resulting membership diff is picked up by the next
    /// [`ViewContainer::update`] like any other change.
    pub fn set_filter<S: EntityStore>(
        &mut self,
        store: &mut S,
        filter: Option<Filter>,
    ) -> Result<(), ViewError> {
        self.descriptor.set_filter(filter.clone());
        if let ContainerState::Started(sub) = self.state {
            store.set_filter(sub, filter)?;
        }
        Ok(())
    }

    /// Activate the subscription and build views for every initially matching
    /// entity.
    ///
    /// Fails with [`ViewError::AlreadyStarted`] on a second call, including
    /// after `stop`.
    pub fn start<S: EntityStore>(&mut self, store: &mut S) -> Result<(), ViewError> {
        if self.state != ContainerState::Configured {
            return Err(ViewError::AlreadyStarted);
        }

        let sub = store.open(self.descriptor.clone());
        self.state = ContainerState::Started(sub);
        self.snapshot.invalidate();

        // Force a refresh so the initial matching set is fully populated, then
        // treat all of it as additions.
        store.refresh(sub)?;
        let members = store.members(sub)?;
        info!(%sub, initial = members.len(), "view container started");

        for entity in members {
            let Some(record) = store.fetch(entity) else {
                self.note_inconsistency(entity, "initial addition");
                continue;
            };
            let view = self
                .handler
                .create_view(&record)
                .map_err(|source| ViewError::Callback { entity, source })?;
            self.managed.insert(entity, view);
        }
        Ok(())
    }

    /// Reconcile against the subscription's current membership.
    ///
    /// Returns `Ok(false)` — with no callbacks and no cache invalidation — when
    /// the store reports nothing new. Otherwise applies removals, then
    /// additions, then in-place updates, and returns `Ok(true)`.
    ///
    /// The snapshot is invalidated only when removals or additions occurred;
    /// updates alone leave a previously fetched snapshot valid. Callback
    /// failures propagate immediately and may leave the batch partially
    /// applied; no rollback is attempted.
    pub fn update<S: EntityStore>(&mut self, store: &mut S) -> Result<bool, ViewError> {
        let sub = self.subscription()?;
        if !store.refresh(sub)? {
            return Ok(false);
        }

        let removed = store.removed(sub)?;
        let added = store.added(sub)?;
        let changed = store.changed(sub)?;
        debug!(
            %sub,
            removed = removed.len(),
            added = added.len(),
            changed = changed.len(),
            "applying subscription diff"
        );

        // Invalidate up front on membership change so a failing callback
        // cannot leave a valid-looking snapshot that no longer matches the
        // mapping.
        if !removed.is_empty() || !added.is_empty() {
            self.snapshot.invalidate();
        }

        for &entity in &removed {
            match self.managed.remove(&entity) {
                Some(view) => self
                    .handler
                    .destroy_view(view, entity)
                    .map_err(|source| ViewError::Callback { entity, source })?,
                None => self.note_inconsistency(entity, "removal"),
            }
        }

        for &entity in &added {
            let Some(record) = store.fetch(entity) else {
                self.note_inconsistency(entity, "addition");
                continue;
            };
            let view = self
                .handler
                .create_view(&record)
                .map_err(|source| ViewError::Callback { entity, source })?;
            self.managed.insert(entity, view);
        }

        for &entity in &changed {
            let Some(record) = store.fetch(entity) else {
                self.note_inconsistency(entity, "change");
                continue;
            };
            match self.managed.get_mut(&entity) {
                Some(view) => self
                    .handler
                    .update_view(view, &record)
                    .map_err(|source| ViewError::Callback { entity, source })?,
                None => self.note_inconsistency(entity, "change"),
            }
        }

        Ok(true)
    }

    /// Tear down every currently managed view and release the subscription.
    ///
    /// Teardown uses the container's current state — no fresh refresh — and
    /// destroys each view exactly once, in unspecified order. After `stop` the
    /// container holds no views and cannot be restarted.
    pub fn stop<S: EntityStore>(&mut self, store: &mut S) -> Result<(), ViewError> {
        let sub = self.subscription()?;
        self.state = ContainerState::Stopped;
        self.snapshot.invalidate();

        let views: Vec<(Entity, H::View)> = self.managed.drain().collect();
        info!(%sub, torn_down = views.len(), "view container stopping");
        for (entity, view) in views {
            self.handler
                .destroy_view(view, entity)
                .map_err(|source| ViewError::Callback { entity, source })?;
        }

        store.release(sub)?;
        Ok(())
    }

    /// The cached flat snapshot of all current views.
    ///
    /// Rebuilt lazily after a membership change (O(n) copy of the mapping's
    /// values); repeated reads in between return the same backing allocation.
    /// Element order is unspecified and may differ between rebuilds.
    ///
    /// Elements are clones of the mapped views. Callers that need update-view
    /// mutations to show through an already-fetched snapshot should use a
    /// shared handle (e.g. `Rc<RefCell<_>>`) as their view type.
    pub fn snapshot(&mut self) -> Result<&[H::View], ViewError>
    where
        H::View: Clone,
    {
        self.subscription()?;
        let managed = &self.managed;
        Ok(self
            .snapshot
            .get_or_rebuild(|| managed.values().cloned().collect()))
    }

    /// The subscription's live member count as reported by the data source.
    ///
    /// Deliberately *not* the mapping size: if the two ever disagree, the
    /// desynchronization should stay observable rather than be masked.
    pub fn member_count<S: EntityStore>(&self, store: &S) -> Result<usize, ViewError> {
        Ok(store.member_count(self.subscription()?)?)
    }

    /// The number of entities currently managed (the mapping size).
    #[must_use]
    pub fn managed_count(&self) -> usize {
        self.managed.len()
    }

    /// The view for an entity, if currently managed.
    #[must_use]
    pub fn view(&self, entity: Entity) -> Option<&H::View> {
        self.managed.get(&entity)
    }

    /// Returns `true` if the entity is currently managed.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.managed.contains_key(&entity)
    }

    /// How many diff entries were warned about and skipped so far.
    #[must_use]
    pub fn inconsistencies(&self) -> u64 {
        self.inconsistencies
    }

    fn subscription(&self) -> Result<SubscriptionId, ViewError> {
        match self.state {
            ContainerState::Started(sub) => Ok(sub),
            _ => Err(ViewError::NotStarted),
        }
    }

    fn note_inconsistency(&mut self, entity: Entity, phase: &'static str) {
        self.inconsistencies += 1;
        warn!(%entity, phase, "diff entry could not be applied, skipping");
    }
}
