//! # simview_store
//!
//! The entity data source boundary for simview.
//!
//! This crate provides:
//!
//! - [`EntityStore`] — the trait a data source implements so view containers
//!   can open, refresh, and diff subscriptions against it.
//! - [`SubscriptionId`] — opaque handle for one open subscription.
//! - [`MemoryStore`] — an in-memory reference implementation used by tests and
//!   demos.
//! - [`StoreError`] — store-layer error types.

pub mod error;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::{EntityStore, SubscriptionId};
