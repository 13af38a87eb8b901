//! Networking modules for the store HTTP API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles REST calls and defines the `StoreApi` seam, and `types`
//! defines the wire schema shared by every view.

pub mod api;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;
