//! Deferred navigation and window actions.
//!
//! Commands that leave the page never act synchronously: they schedule the
//! action after a short delay and return an acknowledgement line. Each
//! scheduled action is a cancellable [`ScheduledTask`]; the scheduler can
//! cancel everything still pending when the terminal unmounts.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::window::WindowControl;

/// Host hooks for leaving the terminal.
pub trait Navigator: Send + Sync {
    /// Route to a site path such as `/blogs/my-post`.
    fn navigate(&self, path: &str);

    /// Open an external URL in a new tab.
    fn open_external(&self, url: &str);
}

/// An action performed after the acknowledgement delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredAction {
    Navigate(String),
    OpenExternal(String),
    CloseWindow,
}

/// Handle to a pending deferred action.
pub struct ScheduledTask {
    token: CancellationToken,
    handle: JoinHandle<bool>,
}

impl ScheduledTask {
    /// Cancel the action if it has not run yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task. Returns `true` if the action ran, `false` if it was cancelled.
    pub async fn join(self) -> bool {
        self.handle.await.unwrap_or(false)
    }
}

/// Runs deferred actions against the host navigator and the window.
pub struct NavigationScheduler {
    navigator: Arc<dyn Navigator>,
    window: Option<Arc<dyn WindowControl>>,
    root: Mutex<CancellationToken>,
    pending: Mutex<Vec<ScheduledTask>>,
}

impl NavigationScheduler {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            navigator,
            window: None,
            root: Mutex::new(CancellationToken::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Attach the floating window so `CloseWindow` can act on it.
    pub fn with_window(mut self, window: Arc<dyn WindowControl>) -> Self {
        self.window = Some(window);
        self
    }

    /// Schedule `action` after `delay`. Must be called within a tokio runtime.
    pub fn schedule(&self, action: DeferredAction, delay: Duration) -> ScheduledTask {
        let token = self
            .root
            .lock()
            .map(|root| root.child_token())
            .unwrap_or_default();
        let navigator = self.navigator.clone();
        let window = self.window.clone();
        let task_token = token.clone();
        debug!(?action, delay_ms = delay.as_millis() as u64, "Scheduling deferred action");

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {
                    debug!(?action, "Deferred action cancelled");
                    false
                }
                _ = tokio::time::sleep(delay) => {
                    info!(?action, "Running deferred action");
                    match &action {
                        DeferredAction::Navigate(path) => navigator.navigate(path),
                        DeferredAction::OpenExternal(url) => navigator.open_external(url),
                        DeferredAction::CloseWindow => {
                            if let Some(window) = &window {
                                window.close();
                            }
                        }
                    }
                    true
                }
            }
        });

        ScheduledTask { token, handle }
    }

    /// Schedule and keep the handle so [`cancel_all`](Self::cancel_all) can reach it.
    pub fn schedule_tracked(&self, action: DeferredAction, delay: Duration) {
        let task = self.schedule(action, delay);
        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|t| !t.is_finished());
            pending.push(task);
        }
    }

    /// Number of tracked actions that have not finished.
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .map(|p| p.iter().filter(|t| !t.is_finished()).count())
            .unwrap_or(0)
    }

    /// Cancel every action scheduled so far. Later actions run normally.
    pub fn cancel_all(&self) {
        if let Ok(mut root) = self.root.lock() {
            root.cancel();
            *root = CancellationToken::new();
        }
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }
    }
}

impl Drop for NavigationScheduler {
    fn drop(&mut self) {
        if let Ok(root) = self.root.lock() {
            root.cancel();
        }
    }
}

/// Navigator that records requests instead of acting on them.
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<DeferredAction>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<DeferredAction> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        if let Ok(mut v) = self.visits.lock() {
            v.push(DeferredAction::Navigate(path.to_string()));
        }
    }

    fn open_external(&self, url: &str) {
        if let Ok(mut v) = self.visits.lock() {
            v.push(DeferredAction::OpenExternal(url.to_string()));
        }
    }
}
