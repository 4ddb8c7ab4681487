//! Container-layer error types.

use simview_entity::Entity;
use simview_store::StoreError;

/// Errors surfaced by a view container.
///
/// Misuse variants (`AlreadyStarted`, `NotStarted`, `SubscriptionFrozen`) fail
/// fast at the call site: they indicate a programming error in the consumer.
/// Consistency violations in the data source's diff bookkeeping are *not*
/// errors — the container warns and skips those (see
/// [`ViewContainer::inconsistencies`](crate::ViewContainer::inconsistencies)).
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// `start` was called on a container that has already been started. The
    /// container is not restartable after `stop`.
    #[error("container already started")]
    AlreadyStarted,

    /// `update`, `stop`, or a snapshot read was called before `start`, or after
    /// `stop`.
    #[error("container not started")]
    NotStarted,

    /// The subscription's component-type set cannot be extended after `start`.
    #[error("subscription shape is frozen after start")]
    SubscriptionFrozen,

    /// The data source failed while refreshing or releasing the subscription.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A create / update / destroy callback failed. The batch being processed
    /// is left partially applied; no rollback is attempted.
    #[error("view callback failed for {entity}")]
    Callback {
        entity: Entity,
        #[source]
        source: anyhow::Error,
    },
}
