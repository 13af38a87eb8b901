//! Inline banners and alert lines shown by the views.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
}

impl NoticeKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
        }
    }
}

/// A user-facing message with the instant it was raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub shown_at: Instant,
}

impl Notice {
    #[must_use]
    pub fn success(text: impl Into<String>, now: Instant) -> Self {
        Self { kind: NoticeKind::Success, text: text.into(), shown_at: now }
    }

    #[must_use]
    pub fn error(text: impl Into<String>, now: Instant) -> Self {
        Self { kind: NoticeKind::Error, text: text.into(), shown_at: now }
    }

    #[must_use]
    pub fn warning(text: impl Into<String>, now: Instant) -> Self {
        Self { kind: NoticeKind::Warning, text: text.into(), shown_at: now }
    }

    /// Whether the notice is still within `ttl` of being shown.
    #[must_use]
    pub fn is_visible(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.shown_at) < ttl
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}
