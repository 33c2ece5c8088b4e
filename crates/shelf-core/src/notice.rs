//! User-facing notifications
//!
//! Operations never raise past the session boundary; failures and fallbacks
//! are collected here for the front end to display, and mirrored to
//! `tracing` under the `shelf_notice` target.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Pending notices for one session.
#[derive(Debug, Default)]
pub struct Notices {
    pending: Vec<Notice>,
}

impl Notices {
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Warning, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message.into());
    }

    pub fn pending(&self) -> &[Notice] {
        &self.pending
    }

    pub fn take(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }

    fn push(&mut self, level: NoticeLevel, message: String) {
        match level {
            NoticeLevel::Info => tracing::info!(target: "shelf_notice", "{message}"),
            NoticeLevel::Warning => tracing::warn!(target: "shelf_notice", "{message}"),
            NoticeLevel::Error => tracing::error!(target: "shelf_notice", "{message}"),
        }
        self.pending.push(Notice { level, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_drains() {
        let mut notices = Notices::default();
        notices.error("boom");
        notices.info("ok");
        assert_eq!(notices.pending().len(), 2);

        let taken = notices.take();
        assert_eq!(taken[0].level, NoticeLevel::Error);
        assert_eq!(taken[1].message, "ok");
        assert!(notices.pending().is_empty());
    }
}
