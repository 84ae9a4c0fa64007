//! # cc-remote
//!
//! Authenticated HTTP client for the account-scoped remote service.
//!
//! Owns the token state and protects it against concurrent expiry: a 401 is
//! the sole refresh trigger, at most one refresh call is ever in flight
//! (single-flight), and each request is retried at most once after a
//! refresh. Remote payloads are normalized into the local item shape before
//! leaving this crate.

pub mod client;
pub mod session;
pub mod transform;

pub use client::{CloudClient, RemoteConfig};
