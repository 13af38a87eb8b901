//! One-line rendering of notices.

use crate::state::notice::Notice;

#[must_use]
pub fn render_notice(notice: &Notice) -> String {
    format!("[{}] {}", notice.kind.label(), notice.text)
}
