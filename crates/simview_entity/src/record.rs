//! Materialized entity handles.
//!
//! An [`EntityRecord`] is what a data source hands to view callbacks: the
//! entity identity plus a copy of its current component values. Records are
//! snapshots — mutating the store after a fetch does not change an already
//! materialized record.

use std::collections::HashMap;

use serde_json::Value;

use crate::component::{Component, ComponentTypeId};
use crate::entity::Entity;

/// An entity identity together with its current component values.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    entity: Entity,
    components: HashMap<ComponentTypeId, Value>,
}

impl EntityRecord {
    /// Build a record from an identity and its component values.
    #[must_use]
    pub fn new(entity: Entity, components: HashMap<ComponentTypeId, Value>) -> Self {
        Self { entity, components }
    }

    /// The entity this record describes.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Returns `true` if the record carries a value for the given type.
    #[must_use]
    pub fn has(&self, type_id: ComponentTypeId) -> bool {
        self.components.contains_key(&type_id)
    }

    /// Decode the component of type `C`, if present and well-formed.
    ///
    /// Returns `None` when the component is absent or its stored value does not
    /// deserialize into `C`.
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<C> {
        let value = self.components.get(&C::type_id())?;
        serde_json::from_value(value.clone()).ok()
    }

    /// The raw dynamic value for a component type, if present.
    #[must_use]
    pub fn raw(&self, type_id: ComponentTypeId) -> Option<&Value> {
        self.components.get(&type_id)
    }

    /// Iterate over the component types carried by this record.
    pub fn component_types(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.components.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Position {
        x: f64,
        y: f64,
    }

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    fn make_record() -> EntityRecord {
        let mut components = HashMap::new();
        components.insert(
            Position::type_id(),
            serde_json::json!({"x": 1.0, "y": 2.0}),
        );
        EntityRecord::new(Entity::from_raw(5), components)
    }

    #[test]
    fn test_typed_get() {
        let record = make_record();
        let pos: Position = record.get().unwrap();
        assert_eq!(pos, Position { x: 1.0, y: 2.0 });
    }

    #[test]
    fn test_get_absent_component() {
        #[derive(Debug, serde::Serialize, serde::Deserialize)]
        struct Velocity {
            x: f64,
        }
        impl Component for Velocity {
            fn type_name() -> &'static str {
                "Velocity"
            }
        }

        let record = make_record();
        assert!(record.get::<Velocity>().is_none());
        assert!(!record.has(Velocity::type_id()));
    }

    #[test]
    fn test_get_malformed_value() {
        let mut components = HashMap::new();
        components.insert(Position::type_id(), serde_json::json!("not an object"));
        let record = EntityRecord::new(Entity::from_raw(1), components);
        assert!(record.get::<Position>().is_none());
    }
}
