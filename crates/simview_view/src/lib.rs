//! # simview_view
//!
//! The reconciliation core of simview: a generic container that keeps
//! caller-defined per-entity view objects synchronized with a subscription's
//! membership, driving create / update / destroy hooks as entities enter,
//! change, and leave, and caching a flat snapshot of all current views between
//! membership changes.
//!
//! ## Usage
//!
//! ```rust
//! use simview_entity::{Component, EntityRecord, SubscriptionDescriptor};
//! use simview_store::MemoryStore;
//! use simview_view::{ViewContainer, ViewHandler};
//!
//! #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
//! struct Label { text: String }
//! impl Component for Label {
//!     fn type_name() -> &'static str { "Label" }
//! }
//!
//! /// Views are uppercased copies of the label text.
//! struct LabelViews;
//! impl ViewHandler for LabelViews {
//!     type View = String;
//!     fn create_view(&mut self, record: &EntityRecord) -> anyhow::Result<String> {
//!         Ok(record.get::<Label>().map_or_else(String::new, |l| l.text.to_uppercase()))
//!     }
//! }
//!
//! let mut store = MemoryStore::new();
//! let entity = store.spawn();
//! store.set_component(entity, &Label { text: "hello".into() }).unwrap();
//!
//! let mut container = ViewContainer::new(
//!     SubscriptionDescriptor::new().require(Label::type_id()),
//!     LabelViews,
//! );
//! container.start(&mut store).unwrap();
//! assert_eq!(container.snapshot().unwrap(), ["HELLO".to_string()]);
//! ```

pub mod container;
pub mod error;
pub mod handler;
pub mod snapshot;

pub use container::ViewContainer;
pub use error::ViewError;
pub use handler::ViewHandler;
pub use snapshot::SnapshotCache;
