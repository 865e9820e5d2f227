//! Host notifications from a terminal session.
//!
//! The session drives the line buffer; the host renders it. Every change to
//! the buffer, the theme or the session status is reported through
//! [`TerminalCallback`].

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::types::{Line, TerminalTheme};

/// Coarse session status, for enabling and disabling the input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Booting,
    Ready,
    Animating,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Booting => write!(f, "booting"),
            SessionStatus::Ready => write!(f, "ready"),
            SessionStatus::Animating => write!(f, "animating"),
        }
    }
}

#[async_trait]
pub trait TerminalCallback: Send + Sync {
    /// A new line was appended.
    async fn on_line_appended(&self, line: &Line);

    /// The last line's text changed (typing effect frame).
    async fn on_line_updated(&self, line: &Line);

    /// Every line was removed.
    async fn on_cleared(&self);

    async fn on_theme_changed(&self, theme: TerminalTheme);

    async fn on_status_change(&self, status: SessionStatus);

    /// The input box should take focus.
    async fn on_focus_input(&self) {}
}

/// A callback that ignores everything.
pub struct NoOpCallback;

#[async_trait]
impl TerminalCallback for NoOpCallback {
    async fn on_line_appended(&self, _line: &Line) {}
    async fn on_line_updated(&self, _line: &Line) {}
    async fn on_cleared(&self) {}
    async fn on_theme_changed(&self, _theme: TerminalTheme) {}
    async fn on_status_change(&self, _status: SessionStatus) {}
}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    Appended(String),
    Updated(String),
    Cleared,
    Theme(TerminalTheme),
    Status(SessionStatus),
    Focus,
}

/// A callback that records every notification, for tests.
pub struct RecordingCallback {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub async fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().await.clone()
    }

    /// Text of every appended or updated frame, in order.
    pub async fn frames(&self) -> Vec<String> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Appended(t) | RecordedEvent::Updated(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn statuses(&self) -> Vec<SessionStatus> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Status(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub async fn focus_count(&self) -> usize {
        self.events
            .lock()
            .await
            .iter()
            .filter(|e| matches!(e, RecordedEvent::Focus))
            .count()
    }

    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }
}

impl Default for RecordingCallback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TerminalCallback for RecordingCallback {
    async fn on_line_appended(&self, line: &Line) {
        self.events
            .lock()
            .await
            .push(RecordedEvent::Appended(line.text.clone()));
    }
    async fn on_line_updated(&self, line: &Line) {
        self.events
            .lock()
            .await
            .push(RecordedEvent::Updated(line.text.clone()));
    }
    async fn on_cleared(&self) {
        self.events.lock().await.push(RecordedEvent::Cleared);
    }
    async fn on_theme_changed(&self, theme: TerminalTheme) {
        self.events.lock().await.push(RecordedEvent::Theme(theme));
    }
    async fn on_status_change(&self, status: SessionStatus) {
        self.events.lock().await.push(RecordedEvent::Status(status));
    }
    async fn on_focus_input(&self) {
        self.events.lock().await.push(RecordedEvent::Focus);
    }
}
