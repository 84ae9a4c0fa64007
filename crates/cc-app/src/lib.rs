//! # cc-app
//!
//! The synchronization coordinator: merges the local and cloud tiers for
//! presentation, fans writes out to both, queues remote-directed mutations
//! made while offline, and drives the tag derivation pipeline. All
//! collaborators are injected as ports; this crate performs no I/O of its
//! own beyond what those ports expose.

pub mod cache;
pub mod coordinator;
pub mod deps;
pub mod envelope;

pub use coordinator::SyncCoordinator;
pub use deps::CoordinatorDeps;
