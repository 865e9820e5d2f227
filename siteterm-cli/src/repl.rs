//! REPL for interactive and single-command modes.
//!
//! The session renders through [`StdoutCallback`], which keeps the last output
//! line open so typing frames can rewrite it in place. Keys are read with
//! crossterm's `EventStream` in raw mode and fed to the session one at a time.

use crossterm::cursor::MoveTo;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use futures::{FutureExt, Stream, StreamExt};
use siteterm_core::session::PROMPT;
use siteterm_core::{
    FocusTarget, InputKey, InputOutcome, Key, KeyPress, KeyboardDispatcher, Line, LineKind,
    SessionStatus, TerminalCallback, TerminalSession, TerminalTheme, WindowControl, WindowState,
    WindowStore,
};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// A callback that draws session lines on stdout.
pub(crate) struct StdoutCallback {
    /// The last output line has no trailing newline yet.
    line_open: AtomicBool,
    modern: AtomicBool,
}

impl StdoutCallback {
    pub fn new(theme: TerminalTheme) -> Self {
        Self {
            line_open: AtomicBool::new(false),
            modern: AtomicBool::new(theme == TerminalTheme::Modern),
        }
    }

    fn color(&self, kind: LineKind) -> Color {
        let modern = self.modern.load(Ordering::Relaxed);
        match (kind, modern) {
            (LineKind::System, _) => Color::DarkGrey,
            (LineKind::Command, false) => Color::Yellow,
            (LineKind::Command, true) => Color::Cyan,
            (_, false) => Color::Green,
            (_, true) => Color::White,
        }
    }

    fn paint(&self, out: &mut impl Write, line: &Line) -> io::Result<()> {
        queue!(out, SetForegroundColor(self.color(line.kind)))?;
        if line.kind == LineKind::Command {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        queue!(out, Print(&line.text), SetAttribute(Attribute::Reset), ResetColor)?;
        Ok(())
    }

    fn append(&self, line: &Line) -> io::Result<()> {
        let mut out = io::stdout().lock();
        if self.line_open.swap(true, Ordering::Relaxed) {
            queue!(out, Print("\r\n"))?;
        } else {
            // Replaces the prompt, if one is drawn
            queue!(out, Print("\r"), Clear(ClearType::CurrentLine))?;
        }
        self.paint(&mut out, line)?;
        out.flush()
    }

    fn rewrite(&self, line: &Line) -> io::Result<()> {
        let mut out = io::stdout().lock();
        queue!(out, Print("\r"), Clear(ClearType::CurrentLine))?;
        self.paint(&mut out, line)?;
        out.flush()
    }

    /// Draw the input prompt on its own line.
    pub fn prompt(&self, buffer: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        if self.line_open.swap(false, Ordering::Relaxed) {
            queue!(out, Print("\r\n"))?;
        }
        queue!(
            out,
            Print("\r"),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(self.color(LineKind::Command)),
            Print(PROMPT),
            ResetColor,
            Print(format!(" {buffer}"))
        )?;
        out.flush()
    }

    /// A one-off note outside the session's line buffer.
    pub fn notice(&self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        if self.line_open.swap(false, Ordering::Relaxed) {
            queue!(out, Print("\r\n"))?;
        }
        queue!(
            out,
            Print("\r"),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::DarkGrey),
            Print(text),
            ResetColor,
            Print("\r\n")
        )?;
        out.flush()
    }

    /// Terminate the open line, if any.
    pub fn finish(&self) -> io::Result<()> {
        if self.line_open.swap(false, Ordering::Relaxed) {
            let mut out = io::stdout().lock();
            queue!(out, Print("\r\n"))?;
            out.flush()?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TerminalCallback for StdoutCallback {
    async fn on_line_appended(&self, line: &Line) {
        let _ = self.append(line);
    }

    async fn on_line_updated(&self, line: &Line) {
        let _ = self.rewrite(line);
    }

    async fn on_cleared(&self) {
        self.line_open.store(false, Ordering::Relaxed);
        let _ = execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0));
    }

    async fn on_theme_changed(&self, theme: TerminalTheme) {
        self.modern
            .store(theme == TerminalTheme::Modern, Ordering::Relaxed);
    }

    async fn on_status_change(&self, status: SessionStatus) {
        debug!(%status, "Session status changed");
    }
}

/// What a terminal key event means to the REPL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReplAction {
    Quit,
    Input(InputKey),
    /// Offered to the global keyboard dispatcher.
    Shortcut(KeyPress),
}

fn key_press(key: Key, modifiers: KeyModifiers) -> KeyPress {
    KeyPress {
        key,
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
        shift: modifiers.contains(KeyModifiers::SHIFT),
        alt: modifiers.contains(KeyModifiers::ALT),
        meta: modifiers.contains(KeyModifiers::SUPER) || modifiers.contains(KeyModifiers::META),
    }
}

/// Map a key event to a REPL action. Returns None for keys the REPL ignores.
pub(crate) fn map_key(event: &KeyEvent) -> Option<ReplAction> {
    let modifiers = event.modifiers;
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Char('c' | 'd') if ctrl => Some(ReplAction::Quit),
        KeyCode::Char('l') if ctrl => Some(ReplAction::Input(InputKey::ClearLine)),
        KeyCode::Char(c) if ctrl || modifiers.contains(KeyModifiers::ALT) => {
            Some(ReplAction::Shortcut(key_press(Key::Char(c), modifiers)))
        }
        KeyCode::Char(c) => Some(ReplAction::Input(InputKey::Char(c))),
        KeyCode::Up => Some(ReplAction::Input(InputKey::ArrowUp)),
        KeyCode::Down => Some(ReplAction::Input(InputKey::ArrowDown)),
        KeyCode::Tab => Some(ReplAction::Input(InputKey::Tab)),
        KeyCode::Enter => Some(ReplAction::Input(InputKey::Enter)),
        KeyCode::Backspace => Some(ReplAction::Input(InputKey::Backspace)),
        KeyCode::Esc => Some(ReplAction::Shortcut(key_press(Key::Escape, modifiers))),
        _ => None,
    }
}

/// Wait for the next window change. `None` once the window is gone for good.
async fn window_change(rx: &mut Option<watch::Receiver<WindowState>>) -> Option<WindowState> {
    match rx {
        Some(rx) => {
            rx.changed().await.ok()?;
            Some(rx.borrow_and_update().clone())
        }
        None => std::future::pending().await,
    }
}

/// Discard items the stream already has ready, without waiting for more.
fn drain_ready<S: Stream + Unpin>(stream: &mut S) -> usize {
    let mut dropped = 0;
    while let Some(Some(_)) = stream.next().now_or_never() {
        dropped += 1;
    }
    dropped
}

/// Run the interactive REPL until Ctrl+C, Ctrl+D, or the window closes.
pub async fn run_interactive(
    session: TerminalSession,
    screen: Arc<StdoutCallback>,
    routes: mpsc::UnboundedReceiver<String>,
    window: Option<Arc<WindowStore>>,
) -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    let result = event_loop(session, &screen, routes, window).await;
    let _ = screen.finish();
    terminal::disable_raw_mode()?;
    result
}

async fn event_loop(
    mut session: TerminalSession,
    screen: &StdoutCallback,
    mut routes: mpsc::UnboundedReceiver<String>,
    window: Option<Arc<WindowStore>>,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let dispatcher = window
        .clone()
        .map(|w| KeyboardDispatcher::new(w as Arc<dyn WindowControl>));
    let mut window_rx = window.as_ref().map(|w| w.subscribe());

    session.boot().await;
    screen.prompt(session.input().buffer())?;

    loop {
        tokio::select! {
            event = events.next() => {
                let Some(event) = event else { break };
                let Event::Key(key) = event? else { continue };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Any key restores a minimized window and is otherwise dropped
                if let Some(window) = &window {
                    if window.state().is_minimized {
                        window.maximize();
                        screen.prompt(session.input().buffer())?;
                        continue;
                    }
                }
                match map_key(&key) {
                    Some(ReplAction::Quit) => break,
                    Some(ReplAction::Input(input)) => {
                        let outcome = session.handle_key(input).await;
                        // Input is disabled while output types, so keys that
                        // queued up meanwhile are dropped.
                        if matches!(outcome, InputOutcome::Submitted(_)) {
                            let dropped = drain_ready(&mut events);
                            if dropped > 0 {
                                debug!(dropped, "Discarded keys pressed during output");
                            }
                        }
                    }
                    Some(ReplAction::Shortcut(press)) => {
                        if let Some(dispatcher) = &dispatcher {
                            dispatcher.dispatch(&press, FocusTarget::TextInput);
                        }
                    }
                    None => continue,
                }
                screen.prompt(session.input().buffer())?;
            }
            Some(path) = routes.recv() => {
                info!(path = %path, "Route changed");
                session.set_current_path(path);
            }
            change = window_change(&mut window_rx) => {
                let Some(state) = change else { break };
                if !state.is_open {
                    debug!("Window closed");
                    break;
                }
                if state.is_minimized {
                    screen.notice("[terminal minimized - press any key to restore]")?;
                }
            }
        }
    }

    session.unmount();
    Ok(())
}

/// Run one command line, wait for any deferred navigation it scheduled, and exit.
pub async fn run_single_command(
    mut session: TerminalSession,
    screen: Arc<StdoutCallback>,
    line: &str,
    navigation_delay: Duration,
) -> anyhow::Result<()> {
    session.boot().await;
    session.submit(line).await;
    screen.finish()?;

    let scheduler = session.registry().context().scheduler.clone();
    if scheduler.pending_count() > 0 {
        debug!(pending = scheduler.pending_count(), "Waiting for deferred navigation");
        tokio::time::sleep(navigation_delay + Duration::from_millis(50)).await;
    }
    Ok(())
}
