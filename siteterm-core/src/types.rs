//! Core type definitions for the SiteTerm interpreter.
//!
//! Defines the data that flows between the registry, the renderer and the
//! host: rendered lines, command output, and the terminal theme.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What produced a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Echo of a submitted input line.
    Command,
    /// Command output.
    Output,
    /// Boot sequence and other interpreter messages.
    System,
}

impl std::fmt::Display for LineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineKind::Command => write!(f, "command"),
            LineKind::Output => write!(f, "output"),
            LineKind::System => write!(f, "system"),
        }
    }
}

/// One unit of rendered terminal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: Uuid,
    pub kind: LineKind,
    pub text: String,
    /// Pre-rendered literal block, shown verbatim in a compact style.
    #[serde(default)]
    pub raw: bool,
    pub created_at: DateTime<Utc>,
}

impl Line {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            raw: false,
            created_at: Utc::now(),
        }
    }

    pub fn command(text: impl Into<String>) -> Self {
        Self::new(LineKind::Command, text)
    }

    pub fn output(text: impl Into<String>) -> Self {
        Self::new(LineKind::Output, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(LineKind::System, text)
    }

    /// Create a raw output line (literal block, no typing effect).
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            raw: true,
            ..Self::new(LineKind::Output, text)
        }
    }
}

/// Result of running a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// A single line.
    Text(String),
    /// Consecutive lines, rendered in order.
    Lines(Vec<String>),
    /// Wipe every rendered line.
    Clear,
    /// Flip the terminal theme and report it.
    ToggleTheme,
}

impl Output {
    pub fn text(text: impl Into<String>) -> Self {
        Output::Text(text.into())
    }

    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Output::Lines(lines.into_iter().map(Into::into).collect())
    }

    /// Flatten displayable output into lines. Control sentinels yield nothing.
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Output::Text(text) => vec![text],
            Output::Lines(lines) => lines,
            Output::Clear | Output::ToggleTheme => Vec::new(),
        }
    }

    /// Whether this output is a control sentinel rather than displayable text.
    pub fn is_control(&self) -> bool {
        matches!(self, Output::Clear | Output::ToggleTheme)
    }
}

impl From<&str> for Output {
    fn from(text: &str) -> Self {
        Output::Text(text.to_string())
    }
}

impl From<String> for Output {
    fn from(text: String) -> Self {
        Output::Text(text)
    }
}

impl From<Vec<String>> for Output {
    fn from(lines: Vec<String>) -> Self {
        Output::Lines(lines)
    }
}

/// Visual theme of the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalTheme {
    /// Green on black.
    #[default]
    Retro,
    Modern,
}

impl TerminalTheme {
    pub fn toggled(self) -> Self {
        match self {
            TerminalTheme::Retro => TerminalTheme::Modern,
            TerminalTheme::Modern => TerminalTheme::Retro,
        }
    }
}

impl std::fmt::Display for TerminalTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalTheme::Retro => write!(f, "retro"),
            TerminalTheme::Modern => write!(f, "modern"),
        }
    }
}

/// Which terminal is hosting the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalVariant {
    /// Inline terminal on a page. No window-control commands.
    #[default]
    Embedded,
    /// Draggable global terminal with window-control commands.
    Floating,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_constructors_set_kind() {
        assert_eq!(Line::command("$ help").kind, LineKind::Command);
        assert_eq!(Line::output("hi").kind, LineKind::Output);
        assert_eq!(Line::system("boot").kind, LineKind::System);
        let raw = Line::raw("art");
        assert_eq!(raw.kind, LineKind::Output);
        assert!(raw.raw);
    }

    #[test]
    fn test_line_ids_are_unique() {
        let a = Line::output("x");
        let b = Line::output("x");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_output_into_lines() {
        assert_eq!(Output::text("one").into_lines(), vec!["one"]);
        assert_eq!(Output::lines(["a", "", "b"]).into_lines(), vec!["a", "", "b"]);
        assert!(Output::Clear.into_lines().is_empty());
        assert!(Output::ToggleTheme.is_control());
        assert!(!Output::text("x").is_control());
    }

    #[test]
    fn test_theme_toggle_and_display() {
        assert_eq!(TerminalTheme::Retro.toggled(), TerminalTheme::Modern);
        assert_eq!(TerminalTheme::Modern.toggled(), TerminalTheme::Retro);
        assert_eq!(TerminalTheme::default().to_string(), "retro");
    }

    #[test]
    fn test_line_serialization_roundtrip_kind() {
        let line = Line::system("Welcome!");
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("\"kind\":\"system\""));
    }
}
