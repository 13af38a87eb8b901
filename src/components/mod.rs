//! Text rendering primitives and the confirmation seam used by the pages.

pub mod banner;
pub mod chart;
pub mod confirm;
pub mod navbar;
pub mod table;
