//! Small helpers shared by views and components.

pub mod image;
pub mod money;
