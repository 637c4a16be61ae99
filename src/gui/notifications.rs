//! Transaction banner and notification history.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Entries kept in the history popup
pub const MAX_NOTIFICATIONS: usize = 50;

pub const SUCCESS_DISMISS_AFTER: Duration = Duration::from_secs(2);
pub const ERROR_DISMISS_AFTER: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct NotificationEntry {
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl NotificationEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: chrono::Local::now(),
        }
    }

    pub fn time_ago(&self) -> String {
        let elapsed = chrono::Local::now().signed_duration_since(self.timestamp);
        if elapsed.num_seconds() < 60 {
            "just now".to_string()
        } else if elapsed.num_minutes() < 60 {
            format!("{}m ago", elapsed.num_minutes())
        } else if elapsed.num_hours() < 24 {
            format!("{}h ago", elapsed.num_hours())
        } else {
            self.timestamp.format("%m/%d %H:%M").to_string()
        }
    }
}

/// Push to the history, dropping the oldest beyond [`MAX_NOTIFICATIONS`]
pub fn push_notification(history: &mut VecDeque<NotificationEntry>, message: impl Into<String>) {
    history.push_back(NotificationEntry::new(message));
    while history.len() > MAX_NOTIFICATIONS {
        history.pop_front();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerStatus {
    Pending,
    Success,
    Error,
}

impl BannerStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            BannerStatus::Pending => "…",
            BannerStatus::Success => "✓",
            BannerStatus::Error => "✗",
        }
    }
}

/// Overlay shown while a write is in flight and briefly after it ends
#[derive(Clone, Debug, Default)]
pub struct TransactionBanner {
    current: Option<(BannerStatus, String)>,
    hide_at: Option<Instant>,
}

impl TransactionBanner {
    /// Pending stays up until replaced
    pub fn pending(&mut self, message: impl Into<String>) {
        self.current = Some((BannerStatus::Pending, message.into()));
        self.hide_at = None;
    }

    pub fn success(&mut self, message: impl Into<String>, now: Instant) {
        self.current = Some((BannerStatus::Success, message.into()));
        self.hide_at = Some(now + SUCCESS_DISMISS_AFTER);
    }

    pub fn error(&mut self, message: impl Into<String>, now: Instant) {
        self.current = Some((BannerStatus::Error, message.into()));
        self.hide_at = Some(now + ERROR_DISMISS_AFTER);
    }

    /// Hide the banner once its timer has run out
    pub fn tick(&mut self, now: Instant) {
        if matches!(self.hide_at, Some(at) if now >= at) {
            self.current = None;
            self.hide_at = None;
        }
    }

    pub fn visible(&self) -> Option<(BannerStatus, &str)> {
        self.current
            .as_ref()
            .map(|(status, message)| (*status, message.as_str()))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.current, Some((BannerStatus::Pending, _)))
    }
}
