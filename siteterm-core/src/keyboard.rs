//! Global keyboard shortcuts for the floating terminal.
//!
//! Ctrl+` and Ctrl+Shift+T toggle the window, Escape closes it. While a
//! text-input-like element has focus only Escape is honored, so normal
//! typing is never hijacked.

use std::sync::Arc;
use tracing::debug;

use crate::window::WindowControl;

/// A key as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Other(String),
}

/// A key press with modifier state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyPress {
    /// A key with no modifiers held.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    pub fn ctrl_shift(key: Key) -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Self::plain(key)
        }
    }
}

/// What currently holds keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// An input, textarea, select or contenteditable element.
    TextInput,
    Other,
}

/// Window actions a shortcut can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Toggle,
    /// Close, only if the window is open.
    CloseIfOpen,
}

/// A key combination bound to an action.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    /// Modifiers must match exactly; character keys compare case-insensitively
    /// since Shift changes the reported character.
    fn matches(&self, press: &KeyPress) -> bool {
        let key_match = match (&self.key, &press.key) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(b),
            (a, b) => a == b,
        };
        key_match
            && self.ctrl == press.ctrl
            && self.shift == press.shift
            && self.alt == press.alt
            && self.meta == press.meta
    }
}

/// The default shortcut table.
pub fn default_shortcuts() -> Vec<Shortcut> {
    vec![
        Shortcut {
            key: Key::Char('`'),
            ctrl: true,
            shift: false,
            alt: false,
            meta: false,
            action: ShortcutAction::Toggle,
            description: "Toggle terminal (Ctrl + `)",
        },
        Shortcut {
            key: Key::Char('t'),
            ctrl: true,
            shift: true,
            alt: false,
            meta: false,
            action: ShortcutAction::Toggle,
            description: "Toggle terminal (Ctrl + Shift + T)",
        },
        Shortcut {
            key: Key::Escape,
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
            action: ShortcutAction::CloseIfOpen,
            description: "Close terminal (Escape)",
        },
    ]
}

/// Process-wide key listener for the floating window.
pub struct KeyboardDispatcher {
    window: Arc<dyn WindowControl>,
    shortcuts: Vec<Shortcut>,
}

impl KeyboardDispatcher {
    pub fn new(window: Arc<dyn WindowControl>) -> Self {
        Self {
            window,
            shortcuts: default_shortcuts(),
        }
    }

    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// Handle a key press. Returns the action applied, if any; the host should
    /// suppress the default key behavior when one is returned.
    pub fn dispatch(&self, press: &KeyPress, focus: FocusTarget) -> Option<ShortcutAction> {
        if focus == FocusTarget::TextInput {
            if press.key == Key::Escape && self.window.state().is_open {
                debug!("Escape in text input closes terminal");
                self.window.close();
                return Some(ShortcutAction::CloseIfOpen);
            }
            return None;
        }

        let shortcut = self.shortcuts.iter().find(|s| s.matches(press))?;
        match shortcut.action {
            ShortcutAction::Toggle => self.window.toggle(),
            ShortcutAction::CloseIfOpen => {
                if self.window.state().is_open {
                    self.window.close();
                }
            }
        }
        debug!(shortcut = shortcut.description, "Keyboard shortcut dispatched");
        Some(shortcut.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{WindowPhase, WindowStore};

    fn setup() -> (Arc<WindowStore>, KeyboardDispatcher) {
        let store = Arc::new(WindowStore::default());
        let dispatcher = KeyboardDispatcher::new(store.clone());
        (store, dispatcher)
    }

    #[test]
    fn test_ctrl_backtick_toggles() {
        let (store, dispatcher) = setup();
        let press = KeyPress::ctrl(Key::Char('`'));
        assert_eq!(
            dispatcher.dispatch(&press, FocusTarget::Other),
            Some(ShortcutAction::Toggle)
        );
        assert_eq!(store.state().phase(), WindowPhase::Open);
        dispatcher.dispatch(&press, FocusTarget::Other);
        assert_eq!(store.state().phase(), WindowPhase::Closed);
    }

    #[test]
    fn test_ctrl_shift_t_toggles_either_case() {
        let (store, dispatcher) = setup();
        dispatcher.dispatch(&KeyPress::ctrl_shift(Key::Char('T')), FocusTarget::Other);
        assert!(store.state().is_open);
        dispatcher.dispatch(&KeyPress::ctrl_shift(Key::Char('t')), FocusTarget::Other);
        assert!(!store.state().is_open);
    }

    #[test]
    fn test_modifiers_must_match_exactly() {
        let (store, dispatcher) = setup();
        // Ctrl+T without shift is not bound
        assert_eq!(
            dispatcher.dispatch(&KeyPress::ctrl(Key::Char('t')), FocusTarget::Other),
            None
        );
        // Backtick alone is not bound
        assert_eq!(
            dispatcher.dispatch(&KeyPress::plain(Key::Char('`')), FocusTarget::Other),
            None
        );
        assert!(!store.state().is_open);
    }

    #[test]
    fn test_escape_closes_only_when_open() {
        let (store, dispatcher) = setup();
        let esc = KeyPress::plain(Key::Escape);
        dispatcher.dispatch(&esc, FocusTarget::Other);
        assert_eq!(store.state().phase(), WindowPhase::Closed);
        store.open();
        dispatcher.dispatch(&esc, FocusTarget::Other);
        assert_eq!(store.state().phase(), WindowPhase::Closed);
    }

    #[test]
    fn test_text_input_focus_suppresses_toggle() {
        let (store, dispatcher) = setup();
        let result = dispatcher.dispatch(&KeyPress::ctrl(Key::Char('`')), FocusTarget::TextInput);
        assert_eq!(result, None);
        assert!(!store.state().is_open);
    }

    #[test]
    fn test_escape_honored_in_text_input() {
        let (store, dispatcher) = setup();
        store.open();
        let result = dispatcher.dispatch(&KeyPress::plain(Key::Escape), FocusTarget::TextInput);
        assert_eq!(result, Some(ShortcutAction::CloseIfOpen));
        assert!(!store.state().is_open);
    }

    #[test]
    fn test_escape_in_text_input_ignored_when_closed() {
        let (_store, dispatcher) = setup();
        let result = dispatcher.dispatch(&KeyPress::plain(Key::Escape), FocusTarget::TextInput);
        assert_eq!(result, None);
    }

    #[test]
    fn test_shortcut_table_has_descriptions() {
        let (_store, dispatcher) = setup();
        assert_eq!(dispatcher.shortcuts().len(), 3);
        assert!(dispatcher.shortcuts().iter().all(|s| !s.description.is_empty()));
    }
}
