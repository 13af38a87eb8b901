//! View controllers.
//!
//! DESIGN
//! ======
//! A page owns its view state plus a shared [`StoreApi`](crate::net::api::StoreApi)
//! handle. Pages perform the async calls and feed results into the pure state
//! transitions in `state`; rendering writes plain text to any `io::Write`.

pub mod products;
pub mod register;
pub mod reports;
