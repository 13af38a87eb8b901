//! Navigation shell state: which section is active.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use std::fmt;
use std::str::FromStr;

/// Top-level sections of the app.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Section {
    #[default]
    Products,
    Register,
    Reports,
}

impl Section {
    pub const ALL: [Self; 3] = [Self::Products, Self::Register, Self::Reports];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Products => "Products",
            Self::Register => "Register",
            Self::Reports => "Reports",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "products" | "productos" => Ok(Self::Products),
            "register" | "registrar" => Ok(Self::Register),
            "reports" | "reportes" => Ok(Self::Reports),
            other => Err(format!("unknown section '{other}'")),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct NavState {
    pub active: Section,
}

impl NavState {
    /// Switch sections. Returns the newly entered section, or `None` when
    /// `to` was already active.
    pub fn navigate(&mut self, to: Section) -> Option<Section> {
        if self.active == to {
            return None;
        }
        tracing::debug!(from = %self.active, to = %to, "navigating");
        self.active = to;
        Some(to)
    }
}
