//! Input line, command history and Tab completion.
//!
//! The controller is disabled while the boot sequence runs or output is
//! animating; in that state every key is ignored so a new command can never
//! interleave with an animated batch.

use tracing::debug;

use crate::commands::CommandRegistry;

/// Keys the input controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    ArrowUp,
    ArrowDown,
    Tab,
    Enter,
    /// Ctrl+L: clear the input line.
    ClearLine,
    Backspace,
    Char(char),
}

/// Result of handling a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// The controller is disabled or the key had no effect.
    Ignored,
    /// The buffer changed.
    Updated,
    /// The raw line the user submitted.
    Submitted(String),
}

/// Submitted lines, deduplicated, in first-submission order.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted line. Empty lines and lines already present are skipped;
    /// a repeated line keeps its original position.
    pub fn push(&mut self, entry: &str) -> bool {
        let trimmed = entry.trim();
        if trimmed.is_empty() || self.entries.iter().any(|e| e == trimmed) {
            return false;
        }
        self.entries.push(trimmed.to_string());
        true
    }

    /// Step toward older entries, starting from the newest.
    pub fn up(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let index = match self.cursor {
            None => self.entries.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(index);
        Some(&self.entries[index])
    }

    /// Step toward newer entries. Past the newest, browsing ends and `Some("")`
    /// is returned so the caller clears the buffer. `None` when not browsing.
    pub fn down(&mut self) -> Option<&str> {
        let index = self.cursor? + 1;
        if index >= self.entries.len() {
            self.cursor = None;
            return Some("");
        }
        self.cursor = Some(index);
        Some(&self.entries[index])
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// Owns the input buffer and history for one terminal session.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    buffer: String,
    history: CommandHistory,
    is_booting: bool,
    is_animating: bool,
}

impl InputController {
    pub fn new(is_booting: bool) -> Self {
        Self {
            is_booting,
            ..Self::default()
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Replace the buffer, as typing into the input box does.
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn is_booting(&self) -> bool {
        self.is_booting
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn set_booting(&mut self, booting: bool) {
        self.is_booting = booting;
    }

    pub fn set_animating(&mut self, animating: bool) {
        self.is_animating = animating;
    }

    /// Whether keys and submissions are accepted.
    pub fn is_enabled(&self) -> bool {
        !self.is_booting && !self.is_animating
    }

    pub fn handle_key(&mut self, key: InputKey, registry: &CommandRegistry) -> InputOutcome {
        if !self.is_enabled() {
            return InputOutcome::Ignored;
        }
        match key {
            InputKey::Enter => self
                .submit()
                .map(InputOutcome::Submitted)
                .unwrap_or(InputOutcome::Ignored),
            InputKey::ArrowUp => match self.history.up() {
                Some(entry) => {
                    self.buffer = entry.to_string();
                    InputOutcome::Updated
                }
                None => InputOutcome::Ignored,
            },
            InputKey::ArrowDown => match self.history.down() {
                Some(entry) => {
                    self.buffer = entry.to_string();
                    InputOutcome::Updated
                }
                None => InputOutcome::Ignored,
            },
            InputKey::Tab => {
                if self.complete(registry.names()) {
                    InputOutcome::Updated
                } else {
                    InputOutcome::Ignored
                }
            }
            InputKey::ClearLine => {
                self.buffer.clear();
                InputOutcome::Updated
            }
            InputKey::Backspace => {
                if self.buffer.pop().is_none() {
                    return InputOutcome::Ignored;
                }
                self.history.reset_cursor();
                InputOutcome::Updated
            }
            InputKey::Char(c) => {
                self.buffer.push(c);
                self.history.reset_cursor();
                InputOutcome::Updated
            }
        }
    }

    /// Take the current line for execution. Records it in history, clears the
    /// buffer and ends history browsing. `None` while disabled.
    pub fn submit(&mut self) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        let raw = std::mem::take(&mut self.buffer);
        if self.history.push(&raw) {
            debug!(entries = self.history.entries().len(), "History updated");
        }
        self.history.reset_cursor();
        Some(raw)
    }

    /// Replace the buffer with the single candidate that starts with it
    /// (case-insensitive). Zero or several matches leave it unchanged.
    pub fn complete<'a>(&mut self, candidates: impl IntoIterator<Item = &'a str>) -> bool {
        let prefix = self.buffer.to_lowercase();
        let mut matches = candidates
            .into_iter()
            .filter(|name| name.to_lowercase().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) => {
                self.buffer = only.to_string();
                true
            }
            _ => false,
        }
    }
}
