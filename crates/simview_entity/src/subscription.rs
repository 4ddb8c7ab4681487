//! Subscription descriptors.
//!
//! A [`SubscriptionDescriptor`] declares which entities a consumer wants to
//! track: a set of required component types plus an optional value-level
//! filter. The data source evaluates descriptors into live, refreshable
//! membership; the view container owns one descriptor per subscription.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::component::ComponentTypeId;
use crate::record::EntityRecord;

/// A predicate over a materialized entity, applied after the required-types
/// check. Shared between the descriptor's owner and the data source.
pub type Filter = Arc<dyn Fn(&EntityRecord) -> bool + Send + Sync>;

/// Declares the shape of a subscription: required component types and an
/// optional filter.
///
/// Built in the builder style:
///
/// ```rust
/// use simview_entity::{ComponentTypeId, SubscriptionDescriptor};
///
/// let descriptor = SubscriptionDescriptor::new()
///     .require(ComponentTypeId::from_name("Decay"))
///     .require(ComponentTypeId::from_name("Transform"));
/// assert_eq!(descriptor.required().len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct SubscriptionDescriptor {
    required: BTreeSet<ComponentTypeId>,
    filter: Option<Filter>,
}

impl SubscriptionDescriptor {
    /// Create a descriptor with no required types and no filter. Such a
    /// descriptor matches every entity in the store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required component type.
    #[must_use]
    pub fn require(mut self, type_id: ComponentTypeId) -> Self {
        self.required.insert(type_id);
        self
    }

    /// Set the value-level filter.
    #[must_use]
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&EntityRecord) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Add a required component type in place. Used by containers that extend
    /// their shape before activation.
    pub fn insert_required(&mut self, type_id: ComponentTypeId) {
        self.required.insert(type_id);
    }

    /// Replace the filter in place.
    pub fn set_filter(&mut self, filter: Option<Filter>) {
        self.filter = filter;
    }

    /// The sorted set of required component types.
    #[must_use]
    pub fn required(&self) -> &BTreeSet<ComponentTypeId> {
        &self.required
    }

    /// The current filter, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Returns `true` if the record carries every required type and passes the
    /// filter.
    #[must_use]
    pub fn matches(&self, record: &EntityRecord) -> bool {
        if !self.required.iter().all(|&ty| record.has(ty)) {
            return false;
        }
        match &self.filter {
            Some(filter) => filter(record),
            None => true,
        }
    }
}

impl std::fmt::Debug for SubscriptionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionDescriptor")
            .field("required", &self.required)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::component::Component;
    use crate::entity::Entity;

    use super::*;

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    struct Tag {
        label: String,
    }

    impl Component for Tag {
        fn type_name() -> &'static str {
            "Tag"
        }
    }

    fn make_record(label: &str) -> EntityRecord {
        let mut components = HashMap::new();
        components.insert(Tag::type_id(), serde_json::json!({"label": label}));
        EntityRecord::new(Entity::from_raw(1), components)
    }

    #[test]
    fn test_empty_descriptor_matches_anything() {
        let descriptor = SubscriptionDescriptor::new();
        assert!(descriptor.matches(&make_record("x")));
    }

    #[test]
    fn test_required_type_must_be_present() {
        let descriptor =
            SubscriptionDescriptor::new().require(ComponentTypeId::from_name("Missing"));
        assert!(!descriptor.matches(&make_record("x")));

        let descriptor = SubscriptionDescriptor::new().require(Tag::type_id());
        assert!(descriptor.matches(&make_record("x")));
    }

    #[test]
    fn test_filter_narrows_membership() {
        let descriptor = SubscriptionDescriptor::new()
            .require(Tag::type_id())
            .with_filter(|record| {
                record
                    .get::<Tag>()
                    .is_some_and(|tag| tag.label == "keep")
            });

        assert!(descriptor.matches(&make_record("keep")));
        assert!(!descriptor.matches(&make_record("drop")));
    }

    #[test]
    fn test_replacing_filter_in_place() {
        let mut descriptor = SubscriptionDescriptor::new().with_filter(|_| false);
        assert!(!descriptor.matches(&make_record("x")));

        descriptor.set_filter(None);
        assert!(descriptor.matches(&make_record("x")));
    }
}
