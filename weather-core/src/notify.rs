//! Transient user notices ("toasts").

use std::{collections::VecDeque, fmt, time::Duration};
use tokio::time::Instant;

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Fire-and-forget destination for notices.
pub trait NotificationSink {
    fn notify(&mut self, notice: Notice);
}

/// Notices that are still on screen, oldest first.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    entries: VecDeque<(Instant, Notice)>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_at(&mut self, notice: Notice, now: Instant) {
        match notice.level {
            NoticeLevel::Success => tracing::info!("{}", notice.message),
            NoticeLevel::Warning => tracing::warn!("{}", notice.message),
            NoticeLevel::Error => tracing::error!("{}", notice.message),
        }
        self.entries.push_back((now, notice));
    }

    /// Drops notices older than [`NOTICE_TTL`]. Returns true if anything was removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(posted, _)| now.saturating_duration_since(*posted) < NOTICE_TTL);
        self.entries.len() != before
    }

    pub fn live(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter().map(|(_, notice)| notice)
    }

    /// When the oldest visible notice should disappear.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.entries.front().map(|(posted, _)| *posted + NOTICE_TTL)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NotificationSink for NoticeBoard {
    fn notify(&mut self, notice: Notice) {
        self.post_at(notice, Instant::now());
    }
}
