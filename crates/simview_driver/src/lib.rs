//! # simview_driver
//!
//! Background update mode for view containers.
//!
//! A container has no internal synchronization; the [`UpdateWorker`] preserves
//! the single-writer contract by moving a container (and its store) onto a
//! dedicated thread that becomes their sole caller, driven by explicit tick
//! commands over a channel.

pub mod worker;

pub use worker::UpdateWorker;
