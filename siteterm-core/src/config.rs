//! Configuration system for SiteTerm.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Configuration is loaded from `~/.config/siteterm/config.toml` and/or `.siteterm/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::types::TerminalTheme;
use crate::window::{Position, Size};

/// Top-level configuration for a terminal session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub boot: BootConfig,
    pub typing: TypingConfig,
    pub navigation: NavigationConfig,
    pub window: WindowConfig,
    pub profile: ProfileConfig,
}

impl TerminalConfig {
    /// Reject values the interpreter cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.3..=1.0).contains(&self.window.default_opacity) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "window.default_opacity must be between 0.3 and 1.0, got {}",
                    self.window.default_opacity
                ),
            });
        }
        if self.window.default_size.width < self.window.min_size.width
            || self.window.default_size.height < self.window.min_size.height
        {
            return Err(ConfigError::Invalid {
                message: "window.default_size must not be smaller than window.min_size".into(),
            });
        }
        if self.typing.raw_marker.is_empty() {
            return Err(ConfigError::Invalid {
                message: "typing.raw_marker must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Boot sequence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Whether the scripted intro runs on mount.
    pub enabled: bool,
    /// Delay between boot lines in milliseconds.
    pub interval_ms: u64,
    /// Lines revealed during boot, in order.
    pub lines: Vec<String>,
}

impl BootConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 200,
            lines: vec![
                format!("Initializing SiteTerm v{}...", env!("CARGO_PKG_VERSION")),
                String::new(),
                "Welcome! Type 'help' to see available commands.".to_string(),
                String::new(),
            ],
        }
    }
}

/// Typing effect configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    /// Delay between revealed characters in milliseconds.
    pub char_interval_ms: u64,
    /// Pause after an empty line in milliseconds.
    pub blank_line_pause_ms: u64,
    /// Prefix marking a literal block that skips the typing effect.
    pub raw_marker: String,
}

impl TypingConfig {
    pub fn char_interval(&self) -> Duration {
        Duration::from_millis(self.char_interval_ms)
    }

    pub fn blank_line_pause(&self) -> Duration {
        Duration::from_millis(self.blank_line_pause_ms)
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            char_interval_ms: 15,
            blank_line_pause_ms: 30,
            raw_marker: crate::renderer::RAW_BLOCK_MARKER.to_string(),
        }
    }
}

/// Deferred navigation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Delay before a navigation, an external link or a window close.
    pub delay_ms: u64,
}

impl NavigationConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self { delay_ms: 1000 }
    }
}

/// Floating window defaults and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub default_position: Position,
    pub default_size: Size,
    pub min_size: Size,
    pub default_theme: TerminalTheme,
    pub default_opacity: f64,
    /// Pixel tolerance for the "scrolled to bottom" check.
    pub scroll_tolerance_px: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_position: Position { x: 100.0, y: 100.0 },
            default_size: Size {
                width: 800.0,
                height: 500.0,
            },
            min_size: Size {
                width: 400.0,
                height: 300.0,
            },
            default_theme: TerminalTheme::Retro,
            default_opacity: 0.95,
            scroll_tolerance_px: 5.0,
        }
    }
}

/// Site owner details surfaced by `about`, `contact` and the virtual files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub name: String,
    pub username: String,
    pub headline: String,
    pub location: String,
    pub bio: Vec<String>,
    pub interests: Vec<String>,
    pub email: String,
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
    pub website: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            name: "Bhavesh Chaudhari".to_string(),
            username: "bhavesh".to_string(),
            headline: "Full-Stack Developer & Builder".to_string(),
            location: "India".to_string(),
            bio: vec![
                "Hi, I'm Bhavesh. I love building things with code.".to_string(),
                "As AI reshapes everything faster than we can imagine,".to_string(),
                "I'm using this space to document my thoughts,".to_string(),
                "experiments, and lessons as I lay the foundation".to_string(),
                "for something bigger.".to_string(),
            ],
            interests: vec![
                "Web technologies & scalable systems".to_string(),
                "SaaS, Indie Hacking".to_string(),
                "AI & how it changes how we build".to_string(),
                "Sharing what I learn".to_string(),
            ],
            email: "hello@example.com".to_string(),
            github: "https://github.com/bhaveyx".to_string(),
            linkedin: "https://www.linkedin.com/in/bhaveyx".to_string(),
            twitter: "https://x.com/bhaveyx".to_string(),
            website: "https://example.com".to_string(),
        }
    }
}

/// Load configuration with layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `SITETERM_`)
/// 3. Workspace-local config (`.siteterm/config.toml`)
/// 4. User config (`~/.config/siteterm/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&TerminalConfig>,
) -> Result<TerminalConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(TerminalConfig::default()));

    // User-level config
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "siteterm", "siteterm") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".siteterm").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (SITETERM_BOOT__ENABLED, SITETERM_TYPING__CHAR_INTERVAL_MS, etc.)
    figment = figment.merge(Env::prefixed("SITETERM_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}
