//! Per-view local state.
//!
//! DESIGN
//! ======
//! Each view owns plain state with pure transitions; the async work of
//! talking to the service lives in `pages`. Nothing here is shared across
//! views beyond what is re-fetched from the server.

pub mod nav;
pub mod notice;
pub mod products;
pub mod registration;
pub mod reports;
