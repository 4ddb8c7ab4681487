//! Store-layer error types.

use simview_entity::Entity;

use crate::store::SubscriptionId;

/// Errors that can occur at the data-source boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The subscription handle does not name an open subscription.
    #[error("unknown subscription: {0}")]
    UnknownSubscription(SubscriptionId),

    /// The entity does not exist in the store.
    #[error("{0} not found")]
    EntityNotFound(Entity),

    /// A typed component value failed to encode into its dynamic form.
    #[error("failed to encode component value: {0}")]
    Encode(#[from] serde_json::Error),
}
