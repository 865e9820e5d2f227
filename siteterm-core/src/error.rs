//! Error types for the SiteTerm interpreter.
//!
//! Uses `thiserror` for public API error types. None of these are fatal to a
//! session: the interpreter renders any handler error as a single output line.

use std::path::PathBuf;

/// Top-level error type for the SiteTerm core library.
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while executing a registered command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Command not registered: {name}")]
    NotFound { name: String },

    #[error("Command '{name}' is not available in this terminal")]
    Unavailable { name: String },
}

/// Errors from the content index collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Failed to load posts from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// A type alias for results using the top-level `TerminalError`.
pub type Result<T> = std::result::Result<T, TerminalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_command() {
        let err = TerminalError::Command(CommandError::NotFound {
            name: "sudo".into(),
        });
        assert_eq!(err.to_string(), "Command error: Command not registered: sudo");
    }

    #[test]
    fn test_error_display_content() {
        let err = TerminalError::Content(ContentError::LoadFailed {
            path: PathBuf::from("posts.json"),
            message: "missing field `slug`".into(),
        });
        assert_eq!(
            err.to_string(),
            "Content error: Failed to load posts from posts.json: missing field `slug`"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = TerminalError::Config(ConfigError::Invalid {
            message: "typing.char_interval_ms must be positive".into(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid configuration: typing.char_interval_ms must be positive"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TerminalError = io_err.into();
        assert!(matches!(err, TerminalError::Io(_)));
    }

    #[test]
    fn test_command_unavailable_display() {
        let err = CommandError::Unavailable {
            name: "minimize".into(),
        };
        assert_eq!(
            err.to_string(),
            "Command 'minimize' is not available in this terminal"
        );
    }
}
