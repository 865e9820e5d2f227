//! # SiteTerm Core
//!
//! Command interpreter for a website's decorative terminal.
//! Provides the command registry, the typing-effect renderer, input history
//! and completion, the floating window state machine, the global keyboard
//! dispatcher, deferred navigation, configuration, and fundamental types.

pub mod callback;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod input;
pub mod keyboard;
pub mod navigation;
pub mod renderer;
pub mod session;
pub mod types;
pub mod window;

// Re-export commonly used types at the crate root.
pub use callback::{NoOpCallback, RecordedEvent, RecordingCallback, SessionStatus, TerminalCallback};
pub use commands::{
    CommandCategory, CommandContext, CommandKind, CommandRegistry, CommandSpec, ParsedCommand,
    parse_command_line,
};
pub use config::{TerminalConfig, load_config};
pub use content::{ContentIndex, InMemoryContentIndex, Post};
pub use error::{CommandError, ConfigError, ContentError, Result, TerminalError};
pub use input::{CommandHistory, InputController, InputKey, InputOutcome};
pub use keyboard::{FocusTarget, Key, KeyPress, KeyboardDispatcher, ShortcutAction};
pub use navigation::{DeferredAction, NavigationScheduler, Navigator, RecordingNavigator, ScheduledTask};
pub use renderer::{LineBuffer, OutputRenderer, ScrollFollow, ScrollMetrics, TypingFrames};
pub use session::TerminalSession;
pub use types::{Line, LineKind, Output, TerminalTheme, TerminalVariant};
pub use window::{
    PointerTarget, Position, Size, Viewport, WindowControl, WindowGestures, WindowPhase,
    WindowState, WindowStore,
};
