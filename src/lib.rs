//! Terminal front-end for the ClaudStore inventory and point-of-sale service.
//!
//! Layers, bottom up: `net` (wire types and the HTTP client), `state` (pure
//! per-view state), `pages` (async controllers), `components` (text
//! rendering), and `shell` (the interactive loop).

pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod shell;
pub mod state;
pub mod util;
