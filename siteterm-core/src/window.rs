//! Floating terminal window state machine.
//!
//! The window is `Closed`, `Open` or `Minimized`, with position, size, theme
//! and opacity carried alongside. State lives in a [`WindowStore`] backed by a
//! `tokio::sync::watch` channel so the trigger button, the keyboard dispatcher
//! and the window itself observe one value. Consumers mutate it only through
//! [`WindowControl`] transitions.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::config::WindowConfig;
use crate::types::TerminalTheme;

/// Lowest opacity the window may be set to.
pub const MIN_OPACITY: f64 = 0.3;
/// Highest opacity the window may be set to.
pub const MAX_OPACITY: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Dimensions of the area the window must stay within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Discrete lifecycle phase of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPhase {
    Closed,
    Open,
    Minimized,
}

/// Complete floating window state.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
    pub is_open: bool,
    pub is_minimized: bool,
    pub position: Position,
    pub size: Size,
    pub theme: TerminalTheme,
    pub opacity: f64,
}

impl WindowState {
    /// Initial state: closed, with configured geometry.
    pub fn from_config(config: &WindowConfig) -> Self {
        Self {
            is_open: false,
            is_minimized: false,
            position: config.default_position,
            size: config.default_size,
            theme: config.default_theme,
            opacity: config.default_opacity,
        }
    }

    pub fn phase(&self) -> WindowPhase {
        match (self.is_open, self.is_minimized) {
            (false, _) => WindowPhase::Closed,
            (true, false) => WindowPhase::Open,
            (true, true) => WindowPhase::Minimized,
        }
    }

    /// Whether a live terminal session should be mounted.
    pub fn hosts_session(&self) -> bool {
        self.phase() == WindowPhase::Open
    }
}

impl Default for WindowState {
    fn default() -> Self {
        Self::from_config(&WindowConfig::default())
    }
}

/// Clamp a window position so a window of `size` stays inside `viewport`.
pub fn clamp_position(position: Position, size: Size, viewport: Viewport) -> Position {
    let max_x = viewport.width - size.width;
    let max_y = viewport.height - size.height;
    Position {
        x: position.x.min(max_x).max(0.0),
        y: position.y.min(max_y).max(0.0),
    }
}

/// Floor a requested size at `min`, then cap it at the space left in `viewport`.
pub fn clamp_size(size: Size, position: Position, viewport: Viewport, min: Size) -> Size {
    let max_width = viewport.width - position.x;
    let max_height = viewport.height - position.y;
    Size {
        width: size.width.max(min.width).min(max_width),
        height: size.height.max(min.height).min(max_height),
    }
}

/// Transitions available on the shared window state.
pub trait WindowControl: Send + Sync {
    /// Snapshot of the current state.
    fn state(&self) -> WindowState;

    /// closed -> open (not minimized).
    fn open(&self);

    /// any -> closed.
    fn close(&self);

    /// Flip open/closed; minimized is always cleared.
    fn toggle(&self);

    /// open -> minimized. No effect while closed.
    fn minimize(&self);

    /// minimized -> open.
    fn maximize(&self);

    /// Restore default geometry, theme and opacity, and show the window.
    fn reset(&self);

    fn set_theme(&self, theme: TerminalTheme);

    /// Set opacity, clamped to `[MIN_OPACITY, MAX_OPACITY]`. Returns the stored value.
    fn set_opacity(&self, opacity: f64) -> f64;

    /// Move the window, clamped to the viewport. Returns the stored position.
    fn move_to(&self, position: Position, viewport: Viewport) -> Position;

    /// Resize the window, clamped to the minimum and the viewport. Returns the stored size.
    fn resize_to(&self, size: Size, viewport: Viewport) -> Size;
}

/// The process-wide window state, owned explicitly and shared by `Arc`.
pub struct WindowStore {
    state: watch::Sender<WindowState>,
    config: WindowConfig,
}

impl WindowStore {
    pub fn new(config: WindowConfig) -> Self {
        let (state, _) = watch::channel(WindowState::from_config(&config));
        Self { state, config }
    }

    /// Convenience constructor returning the store behind the control trait.
    pub fn shared(config: WindowConfig) -> Arc<dyn WindowControl> {
        Arc::new(Self::new(config))
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<WindowState> {
        self.state.subscribe()
    }

    fn update(&self, action: &'static str, f: impl FnOnce(&mut WindowState)) {
        self.state.send_modify(|state| {
            f(state);
            debug!(
                action,
                phase = ?state.phase(),
                x = state.position.x,
                y = state.position.y,
                width = state.size.width,
                height = state.size.height,
                "Window state updated"
            );
        });
    }
}

impl Default for WindowStore {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

impl WindowControl for WindowStore {
    fn state(&self) -> WindowState {
        self.state.borrow().clone()
    }

    fn open(&self) {
        self.update("open", |s| {
            s.is_open = true;
            s.is_minimized = false;
        });
    }

    fn close(&self) {
        self.update("close", |s| {
            s.is_open = false;
            s.is_minimized = false;
        });
    }

    fn toggle(&self) {
        self.update("toggle", |s| {
            s.is_open = !s.is_open;
            s.is_minimized = false;
        });
    }

    fn minimize(&self) {
        self.update("minimize", |s| {
            if s.is_open {
                s.is_minimized = true;
            }
        });
    }

    fn maximize(&self) {
        self.update("maximize", |s| s.is_minimized = false);
    }

    fn reset(&self) {
        let defaults = WindowState::from_config(&self.config);
        self.update("reset", |s| {
            *s = WindowState {
                is_open: true,
                is_minimized: false,
                ..defaults
            };
        });
    }

    fn set_theme(&self, theme: TerminalTheme) {
        self.update("set_theme", |s| s.theme = theme);
    }

    fn set_opacity(&self, opacity: f64) -> f64 {
        let clamped = opacity.clamp(MIN_OPACITY, MAX_OPACITY);
        self.update("set_opacity", |s| s.opacity = clamped);
        clamped
    }

    fn move_to(&self, position: Position, viewport: Viewport) -> Position {
        let mut stored = position;
        self.update("move", |s| {
            s.position = clamp_position(position, s.size, viewport);
            stored = s.position;
        });
        stored
    }

    fn resize_to(&self, size: Size, viewport: Viewport) -> Size {
        let min = self.config.min_size;
        let mut stored = size;
        self.update("resize", |s| {
            s.size = clamp_size(size, s.position, viewport, min);
            stored = s.size;
        });
        stored
    }
}

/// Element under the pointer when a gesture starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The title bar.
    Header,
    /// A button or menu embedded in the title bar.
    HeaderControl,
    /// The bottom-right resize corner.
    ResizeHandle,
    /// Anywhere else inside the window.
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Drag { grab_offset: Position },
    Resize { origin: Position, start: Size },
}

/// Pointer-driven drag and resize on top of a [`WindowControl`].
pub struct WindowGestures {
    control: Arc<dyn WindowControl>,
    active: Option<Gesture>,
}

impl WindowGestures {
    pub fn new(control: Arc<dyn WindowControl>) -> Self {
        Self {
            control,
            active: None,
        }
    }

    /// Start a gesture. Returns whether one was started.
    pub fn pointer_down(&mut self, target: PointerTarget, pointer: Position) -> bool {
        let state = self.control.state();
        self.active = match target {
            PointerTarget::Header => Some(Gesture::Drag {
                grab_offset: Position {
                    x: pointer.x - state.position.x,
                    y: pointer.y - state.position.y,
                },
            }),
            PointerTarget::ResizeHandle => Some(Gesture::Resize {
                origin: pointer,
                start: state.size,
            }),
            PointerTarget::HeaderControl | PointerTarget::Body => None,
        };
        self.active.is_some()
    }

    /// Continue the active gesture, if any.
    pub fn pointer_move(&mut self, pointer: Position, viewport: Viewport) {
        match self.active {
            Some(Gesture::Drag { grab_offset }) => {
                self.control.move_to(
                    Position {
                        x: pointer.x - grab_offset.x,
                        y: pointer.y - grab_offset.y,
                    },
                    viewport,
                );
            }
            Some(Gesture::Resize { origin, start }) => {
                self.control.resize_to(
                    Size {
                        width: start.width + (pointer.x - origin.x),
                        height: start.height + (pointer.y - origin.y),
                    },
                    viewport,
                );
            }
            None => {}
        }
    }

    pub fn pointer_up(&mut self) {
        self.active = None;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.active, Some(Gesture::Drag { .. }))
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.active, Some(Gesture::Resize { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 1920.0,
        height: 1080.0,
    };

    fn store() -> Arc<WindowStore> {
        Arc::new(WindowStore::default())
    }

    #[test]
    fn test_initial_state_is_closed_with_defaults() {
        let store = store();
        let state = store.state();
        assert_eq!(state.phase(), WindowPhase::Closed);
        assert_eq!(state.position, Position { x: 100.0, y: 100.0 });
        assert_eq!(state.size, Size { width: 800.0, height: 500.0 });
        assert_eq!(state.theme, TerminalTheme::Retro);
        assert_eq!(state.opacity, 0.95);
    }

    #[test]
    fn test_open_minimize_maximize_close() {
        let store = store();
        store.open();
        assert_eq!(store.state().phase(), WindowPhase::Open);
        assert!(store.state().hosts_session());
        store.minimize();
        assert_eq!(store.state().phase(), WindowPhase::Minimized);
        assert!(!store.state().hosts_session());
        store.maximize();
        assert_eq!(store.state().phase(), WindowPhase::Open);
        store.close();
        assert_eq!(store.state().phase(), WindowPhase::Closed);
        assert!(!store.state().is_minimized);
    }

    #[test]
    fn test_minimize_while_closed_is_noop() {
        let store = store();
        store.minimize();
        assert_eq!(store.state().phase(), WindowPhase::Closed);
        assert!(!store.state().is_minimized);
    }

    #[test]
    fn test_toggle_clears_minimized() {
        let store = store();
        store.toggle();
        assert_eq!(store.state().phase(), WindowPhase::Open);
        store.minimize();
        store.toggle();
        assert_eq!(store.state().phase(), WindowPhase::Closed);
        store.toggle();
        assert_eq!(store.state().phase(), WindowPhase::Open);
    }

    #[test]
    fn test_reset_restores_everything_and_opens() {
        let store = store();
        store.open();
        store.move_to(Position { x: 400.0, y: 300.0 }, VIEWPORT);
        store.resize_to(Size { width: 900.0, height: 600.0 }, VIEWPORT);
        store.set_theme(TerminalTheme::Modern);
        store.set_opacity(0.5);
        store.minimize();

        store.reset();
        let state = store.state();
        assert_eq!(state, WindowState {
            is_open: true,
            ..WindowState::default()
        });
    }

    #[test]
    fn test_opacity_is_clamped() {
        let store = store();
        assert_eq!(store.set_opacity(0.1), MIN_OPACITY);
        assert_eq!(store.set_opacity(1.5), MAX_OPACITY);
        assert_eq!(store.set_opacity(0.75), 0.75);
        assert_eq!(store.state().opacity, 0.75);
    }

    #[test]
    fn test_clamp_position_keeps_window_inside() {
        let size = Size { width: 800.0, height: 500.0 };
        let p = clamp_position(Position { x: -50.0, y: 2000.0 }, size, VIEWPORT);
        assert_eq!(p, Position { x: 0.0, y: 580.0 });
        let p = clamp_position(Position { x: 1500.0, y: -1.0 }, size, VIEWPORT);
        assert_eq!(p, Position { x: 1120.0, y: 0.0 });
    }

    #[test]
    fn test_clamp_size_floor_then_ceiling() {
        let min = Size { width: 400.0, height: 300.0 };
        let s = clamp_size(
            Size { width: 100.0, height: 100.0 },
            Position { x: 100.0, y: 100.0 },
            VIEWPORT,
            min,
        );
        assert_eq!(s, min);
        let s = clamp_size(
            Size { width: 5000.0, height: 5000.0 },
            Position { x: 100.0, y: 80.0 },
            VIEWPORT,
            min,
        );
        assert_eq!(s, Size { width: 1820.0, height: 1000.0 });
    }

    #[test]
    fn test_drag_from_header_moves_window() {
        let store = store();
        let mut gestures = WindowGestures::new(store.clone());
        assert!(gestures.pointer_down(PointerTarget::Header, Position { x: 150.0, y: 110.0 }));
        assert!(gestures.is_dragging());
        gestures.pointer_move(Position { x: 250.0, y: 210.0 }, VIEWPORT);
        assert_eq!(store.state().position, Position { x: 200.0, y: 200.0 });
        gestures.pointer_up();
        assert!(!gestures.is_dragging());
        gestures.pointer_move(Position { x: 900.0, y: 900.0 }, VIEWPORT);
        assert_eq!(store.state().position, Position { x: 200.0, y: 200.0 });
    }

    #[test]
    fn test_drag_ignored_on_header_controls_and_body() {
        let store = store();
        let mut gestures = WindowGestures::new(store.clone());
        assert!(!gestures.pointer_down(PointerTarget::HeaderControl, Position { x: 120.0, y: 110.0 }));
        assert!(!gestures.pointer_down(PointerTarget::Body, Position { x: 300.0, y: 300.0 }));
        gestures.pointer_move(Position { x: 600.0, y: 600.0 }, VIEWPORT);
        assert_eq!(store.state().position, Position { x: 100.0, y: 100.0 });
    }

    #[test]
    fn test_resize_from_corner_handle() {
        let store = store();
        let mut gestures = WindowGestures::new(store.clone());
        assert!(gestures.pointer_down(PointerTarget::ResizeHandle, Position { x: 900.0, y: 600.0 }));
        assert!(gestures.is_resizing());
        gestures.pointer_move(Position { x: 1000.0, y: 650.0 }, VIEWPORT);
        assert_eq!(store.state().size, Size { width: 900.0, height: 550.0 });
        gestures.pointer_move(Position { x: 100.0, y: 100.0 }, VIEWPORT);
        assert_eq!(store.state().size, Size { width: 400.0, height: 300.0 });
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let store = WindowStore::default();
        let mut rx = store.subscribe();
        store.open();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_open);
    }
}
