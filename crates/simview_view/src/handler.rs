//! View lifecycle hooks.

use anyhow::Result;

use simview_entity::{Entity, EntityRecord};

/// The three lifecycle operations a view container drives on its caller's view
/// type.
///
/// Implementations must treat each call as scoped to the single entity/view
/// pair passed in: invocation order within a batch of additions is unspecified,
/// and the container's snapshot must not be read from inside a hook (it may be
/// mid-invalidation while a batch is applied).
pub trait ViewHandler {
    /// The derived per-entity object this handler maintains.
    type View;

    /// Build the view for an entity that started matching the subscription.
    fn create_view(&mut self, record: &EntityRecord) -> Result<Self::View>;

    /// Refresh an existing view from the entity's current component values.
    ///
    /// The default does nothing, for view types that need no per-change work.
    fn update_view(&mut self, view: &mut Self::View, record: &EntityRecord) -> Result<()> {
        let _ = (view, record);
        Ok(())
    }

    /// Release a view for an entity that stopped matching. The view is passed
    /// by value: it is destroyed exactly once and never touched again.
    ///
    /// The entity may already be gone from the store, so only its identity is
    /// available here.
    fn destroy_view(&mut self, view: Self::View, entity: Entity) -> Result<()> {
        let _ = (view, entity);
        Ok(())
    }
}
