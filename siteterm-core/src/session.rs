//! Terminal session: the interpreter loop.
//!
//! A [`TerminalSession`] owns one line buffer, one input controller and one
//! command registry. It runs the boot sequence, turns submitted lines into
//! command output, and reports every change to its [`TerminalCallback`].
//!
//! Submissions are serialized: while a batch animates the input controller
//! rejects everything, so output of two commands can never interleave.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::callback::{SessionStatus, TerminalCallback};
use crate::commands::{CommandContext, CommandRegistry};
use crate::config::TerminalConfig;
use crate::input::{InputController, InputKey, InputOutcome};
use crate::renderer::{LineBuffer, OutputRenderer, ScrollFollow, ScrollMetrics};
use crate::types::{Line, Output, TerminalTheme, TerminalVariant};

/// Prompt marker echoed before each submitted line.
pub const PROMPT: &str = "$";

pub struct TerminalSession {
    config: TerminalConfig,
    registry: CommandRegistry,
    input: InputController,
    buffer: LineBuffer,
    renderer: OutputRenderer,
    scroll: ScrollFollow,
    theme: TerminalTheme,
    status: SessionStatus,
    callback: Arc<dyn TerminalCallback>,
}

impl TerminalSession {
    /// Create a session. Profile and navigation timings come from `config`.
    pub fn new(
        config: TerminalConfig,
        context: CommandContext,
        callback: Arc<dyn TerminalCallback>,
    ) -> Self {
        let context = context
            .with_profile(config.profile.clone())
            .with_navigation(config.navigation.clone());
        // The floating window's store owns the palette.
        let theme = context
            .window
            .as_ref()
            .map_or(context.theme, |window| window.state().theme);
        let context = context.with_theme(theme);
        let booting = config.boot.enabled;
        Self {
            registry: CommandRegistry::build(context),
            input: InputController::new(booting),
            buffer: LineBuffer::new(),
            renderer: OutputRenderer::new(config.typing.clone()),
            scroll: ScrollFollow::new(config.window.scroll_tolerance_px),
            theme,
            status: if booting {
                SessionStatus::Booting
            } else {
                SessionStatus::Ready
            },
            callback,
            config,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn theme(&self) -> TerminalTheme {
        self.theme
    }

    pub fn lines(&self) -> &[Line] {
        self.buffer.lines()
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn variant(&self) -> TerminalVariant {
        self.registry.context().variant
    }

    /// Record a viewport scroll reported by the host.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) {
        self.scroll.on_scroll(metrics);
    }

    /// Whether the host should keep the viewport pinned to new output.
    pub fn follows_output(&self) -> bool {
        self.scroll.should_follow()
    }

    /// Run the boot sequence, one system line per interval, then enable input.
    /// With boot disabled the session is already ready and input is focused.
    pub async fn boot(&mut self) {
        if self.status == SessionStatus::Booting {
            self.callback.on_status_change(SessionStatus::Booting).await;
            let interval = self.config.boot.interval();
            for text in self.config.boot.lines.clone() {
                tokio::time::sleep(interval).await;
                let line = self.buffer.push(Line::system(text));
                self.callback.on_line_appended(line).await;
            }
            self.input.set_booting(false);
            info!(lines = self.buffer.len(), "Boot sequence complete");
        }
        self.set_status(SessionStatus::Ready).await;
        self.callback.on_focus_input().await;
    }

    /// Feed a key to the input controller; a submitted line is executed
    /// before this returns.
    pub async fn handle_key(&mut self, key: InputKey) -> InputOutcome {
        let outcome = self.input.handle_key(key, &self.registry);
        if let InputOutcome::Submitted(raw) = &outcome {
            self.dispatch(raw.clone()).await;
        }
        outcome
    }

    /// Replace the input buffer and submit it, as a form submission would.
    /// Returns `false` when input is disabled.
    pub async fn submit(&mut self, text: &str) -> bool {
        if !self.input.is_enabled() {
            debug!("Submission rejected while busy");
            return false;
        }
        self.input.set_buffer(text);
        match self.input.submit() {
            Some(raw) => {
                self.dispatch(raw).await;
                true
            }
            None => false,
        }
    }

    /// Rebuild the registry for a new route.
    pub fn set_current_path(&mut self, path: impl Into<String>) {
        let context = self.registry.context().clone().with_path(path);
        self.registry = CommandRegistry::build(context);
    }

    /// Cancel every pending deferred action.
    pub fn unmount(&self) {
        debug!("Session unmounted");
        self.registry.context().scheduler.cancel_all();
    }

    async fn dispatch(&mut self, raw: String) {
        let echo = self.buffer.push(Line::command(format!("{PROMPT} {raw}")));
        self.callback.on_line_appended(echo).await;

        let output = match self.registry.execute_line(&raw).await {
            Ok(Some(output)) => output,
            Ok(None) => return,
            Err(e) => {
                warn!(input = %raw.trim(), error = %e, "Command failed");
                Output::text(format!("Error executing command: {e}"))
            }
        };
        self.apply(output).await;
        self.sync_theme().await;
    }

    async fn apply(&mut self, output: Output) {
        match output {
            Output::Clear => {
                self.buffer.clear();
                self.callback.on_cleared().await;
            }
            Output::ToggleTheme => {
                let theme = self.toggle_theme().await;
                self.animate(vec![format!("Theme switched to: {theme}")])
                    .await;
            }
            other => self.animate(other.into_lines()).await,
        }
    }

    async fn toggle_theme(&mut self) -> TerminalTheme {
        let theme = self.window_theme().unwrap_or(self.theme).toggled();
        if let Some(window) = &self.registry.context().window {
            window.set_theme(theme);
        }
        self.adopt_theme(theme).await;
        debug!(theme = %theme, "Theme toggled");
        theme
    }

    /// Pick up a palette change made on the window store, e.g. by `reset`.
    async fn sync_theme(&mut self) {
        if let Some(theme) = self.window_theme().filter(|t| *t != self.theme) {
            debug!(theme = %theme, "Theme synced from window");
            self.adopt_theme(theme).await;
        }
    }

    fn window_theme(&self) -> Option<TerminalTheme> {
        self.registry
            .context()
            .window
            .as_ref()
            .map(|window| window.state().theme)
    }

    async fn adopt_theme(&mut self, theme: TerminalTheme) {
        self.theme = theme;
        let context = self.registry.context().clone().with_theme(theme);
        self.registry = CommandRegistry::build(context);
        self.callback.on_theme_changed(theme).await;
    }

    /// Render a batch with input disabled for its whole duration.
    async fn animate(&mut self, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        self.input.set_animating(true);
        self.set_status(SessionStatus::Animating).await;
        self.renderer
            .render(lines, &mut self.buffer, self.callback.as_ref())
            .await;
        self.input.set_animating(false);
        self.set_status(SessionStatus::Ready).await;
        self.callback.on_focus_input().await;
    }

    async fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
        self.callback.on_status_change(status).await;
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::{RecordedEvent, RecordingCallback};
    use crate::content::fixtures::sample_posts;
    use crate::content::{ContentIndex, InMemoryContentIndex, Post};
    use crate::error::ContentError;
    use crate::renderer::ScrollMetrics;
    use crate::navigation::{NavigationScheduler, RecordingNavigator};
    use crate::types::LineKind;
    use crate::window::{WindowControl, WindowStore};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn context() -> (Arc<RecordingNavigator>, CommandContext) {
        let navigator = Arc::new(RecordingNavigator::new());
        let scheduler = Arc::new(NavigationScheduler::new(navigator.clone()));
        let index = Arc::new(InMemoryContentIndex::new(sample_posts()));
        (navigator, CommandContext::new(index, scheduler))
    }

    fn session(boot: bool) -> (Arc<RecordingCallback>, TerminalSession) {
        let mut config = TerminalConfig::default();
        config.boot.enabled = boot;
        let callback = Arc::new(RecordingCallback::new());
        let (_, ctx) = context();
        let session = TerminalSession::new(config, ctx, callback.clone());
        (callback, session)
    }

    struct BrokenIndex;

    #[async_trait::async_trait]
    impl ContentIndex for BrokenIndex {
        async fn list_posts(&self) -> crate::error::Result<Vec<Post>> {
            Err(ContentError::LoadFailed {
                path: "posts.json".into(),
                message: "disk offline".into(),
            }
            .into())
        }

        async fn search_posts(&self, _query: &str) -> crate::error::Result<Vec<Post>> {
            self.list_posts().await
        }
    }

    fn floating_session(window: Arc<WindowStore>) -> (Arc<RecordingCallback>, TerminalSession) {
        let (_, ctx) = context();
        let callback = Arc::new(RecordingCallback::new());
        let mut config = TerminalConfig::default();
        config.boot.enabled = false;
        let session = TerminalSession::new(config, ctx.floating(window), callback.clone());
        (callback, session)
    }

    fn texts(session: &TerminalSession) -> Vec<String> {
        session.lines().iter().map(|l| l.text.clone()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_boot_appends_system_lines_then_ready() {
        let (callback, mut session) = session(true);
        assert_eq!(session.status(), SessionStatus::Booting);
        assert!(!session.input().is_enabled());

        let start = tokio::time::Instant::now();
        session.boot().await;
        // Four lines, one interval each
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(800), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(810), "elapsed {elapsed:?}");

        assert_eq!(session.status(), SessionStatus::Ready);
        assert!(session.input().is_enabled());
        assert_eq!(session.lines().len(), 4);
        assert!(session.lines().iter().all(|l| l.kind == LineKind::System));
        assert!(session.lines()[0].text.starts_with("Initializing SiteTerm v"));
        assert_eq!(callback.focus_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_boot_is_ready_immediately() {
        let (callback, mut session) = session(false);
        assert_eq!(session.status(), SessionStatus::Ready);
        assert!(session.input().is_enabled());

        let start = tokio::time::Instant::now();
        session.boot().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(session.lines().is_empty());
        assert_eq!(callback.focus_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_rejected_while_booting() {
        let (_, mut session) = session(true);
        assert!(!session.submit("help").await);
        assert!(session.lines().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_echoes_and_types_output() {
        let (callback, mut session) = session(false);
        assert!(session.submit("whoami").await);
        assert_eq!(texts(&session), vec!["$ whoami", "bhavesh"]);
        assert_eq!(session.lines()[0].kind, LineKind::Command);
        assert_eq!(session.lines()[1].kind, LineKind::Output);

        let frames = callback.frames().await;
        assert_eq!(&frames[..3], &["$ whoami", "b", "bh"]);
        assert_eq!(
            callback.statuses().await,
            vec![SessionStatus::Animating, SessionStatus::Ready]
        );
        assert!(session.input().is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_command() {
        let (_, mut session) = session(false);
        session.submit("x").await;
        let last = session.lines().last().unwrap();
        assert!(last.text.contains("x"));
        assert!(last.text.contains("not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_submission_only_echoes() {
        let (_, mut session) = session(false);
        session.submit("   ").await;
        assert_eq!(texts(&session), vec!["$    "]);
        assert!(session.input().history().entries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_empties_buffer() {
        let (callback, mut session) = session(false);
        session.submit("pwd").await;
        session.submit("whoami").await;
        assert!(!session.lines().is_empty());
        session.submit("clear").await;
        assert!(session.lines().is_empty());
        assert!(callback.events().await.contains(&RecordedEvent::Cleared));
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_through_keys() {
        let (_, mut session) = session(false);
        session.submit("pwd").await;
        session.submit("whoami").await;
        session.submit("pwd").await;
        assert_eq!(session.input().history().entries(), &["pwd", "whoami"]);

        session.handle_key(InputKey::ArrowUp).await;
        assert_eq!(session.input().buffer(), "whoami");
        session.handle_key(InputKey::ArrowUp).await;
        assert_eq!(session.input().buffer(), "pwd");
        session.handle_key(InputKey::ArrowDown).await;
        assert_eq!(session.input().buffer(), "whoami");
        session.handle_key(InputKey::ArrowDown).await;
        assert_eq!(session.input().buffer(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_tab_then_enter_runs_completed_command() {
        let (_, mut session) = session(false);
        for c in "who".chars() {
            session.handle_key(InputKey::Char(c)).await;
        }
        session.handle_key(InputKey::Tab).await;
        assert_eq!(session.input().buffer(), "whoami");
        let outcome = session.handle_key(InputKey::Enter).await;
        assert_eq!(outcome, InputOutcome::Submitted("whoami".into()));
        assert_eq!(texts(&session).last().unwrap(), "bhavesh");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_l_clears_input_not_output() {
        let (_, mut session) = session(false);
        session.submit("pwd").await;
        for c in "abc".chars() {
            session.handle_key(InputKey::Char(c)).await;
        }
        session.handle_key(InputKey::ClearLine).await;
        assert_eq!(session.input().buffer(), "");
        assert_eq!(texts(&session), vec!["$ pwd", "~"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_raw_block_lines_are_instant() {
        let (_, mut session) = session(false);
        session.submit("rm -rf /").await;
        let raw: Vec<&Line> = session.lines().iter().filter(|l| l.raw).collect();
        assert!(!raw.is_empty());
        assert!(raw.iter().all(|l| !l.text.starts_with("rick:")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_theme_toggle_in_floating_variant() {
        let window = Arc::new(WindowStore::default());
        let (callback, mut session) = floating_session(window.clone());

        session.submit("theme").await;
        assert_eq!(session.theme(), TerminalTheme::Modern);
        assert_eq!(window.state().theme, TerminalTheme::Modern);
        assert_eq!(
            texts(&session).last().unwrap(),
            "Theme switched to: modern"
        );
        assert!(
            callback
                .events()
                .await
                .contains(&RecordedEvent::Theme(TerminalTheme::Modern))
        );

        session.submit("theme").await;
        assert_eq!(session.theme(), TerminalTheme::Retro);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_brings_session_theme_back_with_window() {
        let window = Arc::new(WindowStore::default());
        let (callback, mut session) = floating_session(window.clone());

        session.submit("theme").await;
        assert_eq!(window.state().theme, TerminalTheme::Modern);
        session.submit("reset").await;
        assert_eq!(window.state().theme, TerminalTheme::Retro);
        assert_eq!(session.theme(), TerminalTheme::Retro);
        assert_eq!(
            session.registry().context().theme,
            TerminalTheme::Retro
        );
        assert_eq!(
            callback.events().await.last(),
            Some(&RecordedEvent::Theme(TerminalTheme::Retro))
        );

        // Toggling again starts from the window's palette.
        session.submit("theme").await;
        assert_eq!(
            texts(&session).last().unwrap(),
            "Theme switched to: modern"
        );
        assert_eq!(window.state().theme, TerminalTheme::Modern);
    }

    #[tokio::test(start_paused = true)]
    async fn test_floating_session_starts_with_window_theme() {
        let window = Arc::new(WindowStore::default());
        window.set_theme(TerminalTheme::Modern);
        let (_, session) = floating_session(window);
        assert_eq!(session.theme(), TerminalTheme::Modern);
        assert_eq!(
            session.registry().context().theme,
            TerminalTheme::Modern
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_error_renders_line_and_session_recovers() {
        let navigator = Arc::new(RecordingNavigator::new());
        let scheduler = Arc::new(NavigationScheduler::new(navigator));
        let ctx = CommandContext::new(Arc::new(BrokenIndex), scheduler);
        let mut config = TerminalConfig::default();
        config.boot.enabled = false;
        let mut session =
            TerminalSession::new(config, ctx, Arc::new(RecordingCallback::new()));

        assert!(session.submit("blog").await);
        let last = session.lines().last().unwrap();
        assert!(
            last.text.starts_with("Error executing command:"),
            "got {:?}",
            last.text
        );
        assert!(last.text.contains("disk offline"));
        assert_eq!(session.status(), SessionStatus::Ready);
        assert!(session.input().is_enabled());

        assert!(session.submit("whoami").await);
        assert_eq!(texts(&session).last().unwrap(), "bhavesh");
    }

    #[tokio::test]
    async fn test_scroll_follow_uses_configured_tolerance() {
        let mut config = TerminalConfig::default();
        config.boot.enabled = false;
        config.window.scroll_tolerance_px = 50.0;
        let (_, ctx) = context();
        let mut session =
            TerminalSession::new(config, ctx, Arc::new(RecordingCallback::new()));
        assert!(session.follows_output());

        // 30px above the bottom is inside the configured tolerance
        session.on_scroll(ScrollMetrics {
            scroll_top: 570.0,
            scroll_height: 1000.0,
            client_height: 400.0,
        });
        assert!(session.follows_output());

        session.on_scroll(ScrollMetrics {
            scroll_top: 100.0,
            scroll_height: 1000.0,
            client_height: 400.0,
        });
        assert!(!session.follows_output());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_cancels_pending_navigation() {
        let (navigator, ctx) = context();
        let mut config = TerminalConfig::default();
        config.boot.enabled = false;
        let mut session =
            TerminalSession::new(config, ctx, Arc::new(RecordingCallback::new()));
        session.submit("goto blog").await;
        session.unmount();
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(navigator.visits().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_current_path_rebuilds_registry() {
        let (_, mut session) = session(false);
        session.set_current_path("/blogs");
        assert_eq!(session.registry().context().current_path, "/blogs");
        session.submit("goto blog").await;
        assert_eq!(
            texts(&session).last().unwrap(),
            "You are already on the blog page."
        );
    }
}
