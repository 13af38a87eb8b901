//! Header line with the section tabs.

use crate::state::nav::Section;

pub const BRAND: &str = "ClaudStore";

/// `ClaudStore | [Products]  Register  Reports` with the active tab bracketed.
#[must_use]
pub fn render_navbar(active: Section) -> String {
    let tabs: Vec<String> = Section::ALL
        .iter()
        .map(|section| {
            if *section == active {
                format!("[{section}]")
            } else {
                section.to_string()
            }
        })
        .collect();
    format!("{BRAND} | {}", tabs.join("  "))
}
