//! # simview_entity
//!
//! Identity and typing vocabulary shared by the simview crates.
//!
//! This crate provides:
//!
//! - [`Entity`] — lightweight `u64` entity identities, never reused.
//! - [`EntityAllocator`] — monotonically increasing identity allocator.
//! - [`Component`] / [`ComponentTypeId`] — typed component handles over
//!   dynamically stored values.
//! - [`EntityRecord`] — a materialized entity: identity plus component values.
//! - [`SubscriptionDescriptor`] — required component types plus an optional
//!   filter, defining a trackable entity set.

pub mod component;
pub mod entity;
pub mod record;
pub mod subscription;

pub use component::{Component, ComponentTypeId};
pub use entity::{Entity, EntityAllocator};
pub use record::EntityRecord;
pub use subscription::{Filter, SubscriptionDescriptor};
