//! Command registry for the terminal interpreter.
//!
//! Every command carries structured metadata (category, usage, examples) for
//! `help` and Tab completion, plus a [`CommandKind`] that selects its handler.
//! The registry is a pure function of its [`CommandContext`]; rebuild it when
//! the current route, theme, content index or variant changes.

mod blog;
mod control;
mod files;
mod format;
mod info;
mod links;

use std::sync::Arc;
use tracing::debug;

use crate::config::{NavigationConfig, ProfileConfig};
use crate::content::ContentIndex;
use crate::error::{CommandError, Result};
use crate::navigation::NavigationScheduler;
use crate::types::{Output, TerminalTheme, TerminalVariant};
use crate::window::WindowControl;

/// The one multi-word command. Matched against the whole trimmed line.
pub const SELF_DESTRUCT: &str = "rm -rf /";

/// Groups shown in `help` output, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCategory {
    Information,
    Contact,
    Navigation,
    BlogContent,
    FileSystem,
    Projects,
    MustTry,
    TerminalControl,
}

impl CommandCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CommandCategory::Information => "Information",
            CommandCategory::Contact => "Contact",
            CommandCategory::Navigation => "Navigation",
            CommandCategory::BlogContent => "Blog & Content",
            CommandCategory::FileSystem => "File System",
            CommandCategory::Projects => "Projects",
            CommandCategory::MustTry => "Must Try",
            CommandCategory::TerminalControl => "Terminal Control",
        }
    }

    pub fn all() -> &'static [CommandCategory] {
        &[
            CommandCategory::Information,
            CommandCategory::Contact,
            CommandCategory::Navigation,
            CommandCategory::BlogContent,
            CommandCategory::FileSystem,
            CommandCategory::Projects,
            CommandCategory::MustTry,
            CommandCategory::TerminalControl,
        ]
    }
}

impl std::fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoCommand {
    Help,
    About,
    Whoami,
    Date,
    Projects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCommand {
    Pwd,
    Cat,
    SelfDestruct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCommand {
    Blog,
    Search,
    Featured,
    Recent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationCommand {
    Open,
    Goto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    Theme,
    Opacity,
    Minimize,
    Close,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Clear,
}

/// Which handler family runs a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Info(InfoCommand),
    Contact,
    Files(FileCommand),
    Content(ContentCommand),
    Navigation(NavigationCommand),
    Window(WindowCommand),
    Control(ControlCommand),
}

/// Metadata describing a registered command.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Lowercase name, e.g. "search".
    pub name: &'static str,
    /// One-line description shown in `help`.
    pub description: &'static str,
    /// Usage pattern, e.g. "search <keyword>".
    pub usage: Option<&'static str>,
    pub examples: &'static [&'static str],
    pub category: CommandCategory,
    pub kind: CommandKind,
}

impl CommandSpec {
    /// Left column of the `help` listing.
    fn listing(&self) -> &'static str {
        self.usage.unwrap_or(self.name)
    }
}

/// Read-only state the handlers close over.
#[derive(Clone)]
pub struct CommandContext {
    pub variant: TerminalVariant,
    /// Route the host is currently showing, for `goto`.
    pub current_path: String,
    pub theme: TerminalTheme,
    pub profile: ProfileConfig,
    pub navigation: NavigationConfig,
    pub content: Arc<dyn ContentIndex>,
    pub scheduler: Arc<NavigationScheduler>,
    pub window: Option<Arc<dyn WindowControl>>,
}

impl CommandContext {
    pub fn new(content: Arc<dyn ContentIndex>, scheduler: Arc<NavigationScheduler>) -> Self {
        Self {
            variant: TerminalVariant::Embedded,
            current_path: "/".to_string(),
            theme: TerminalTheme::default(),
            profile: ProfileConfig::default(),
            navigation: NavigationConfig::default(),
            content,
            scheduler,
            window: None,
        }
    }

    /// Switch to the floating variant, which adds the window-control commands.
    pub fn floating(mut self, window: Arc<dyn WindowControl>) -> Self {
        self.variant = TerminalVariant::Floating;
        self.window = Some(window);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.current_path = path.into();
        self
    }

    pub fn with_theme(mut self, theme: TerminalTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_profile(mut self, profile: ProfileConfig) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_navigation(mut self, navigation: NavigationConfig) -> Self {
        self.navigation = navigation;
        self
    }

    /// Window handle for window-control commands.
    fn window(&self, name: &str) -> Result<&Arc<dyn WindowControl>> {
        self.window.as_ref().ok_or_else(|| {
            CommandError::Unavailable {
                name: name.to_string(),
            }
            .into()
        })
    }
}

/// A tokenized input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Lowercased command name used for lookup.
    pub name: String,
    /// The name token exactly as typed.
    pub token: String,
    pub args: Vec<String>,
}

/// Split a raw input line into a command name and positional arguments.
///
/// Returns `None` for a blank line. The literal `rm -rf /` is kept whole.
pub fn parse_command_line(raw: &str) -> Option<ParsedCommand> {
    let trimmed = raw.trim();
    if trimmed == SELF_DESTRUCT {
        return Some(ParsedCommand {
            name: SELF_DESTRUCT.to_string(),
            token: SELF_DESTRUCT.to_string(),
            args: Vec::new(),
        });
    }
    let mut parts = trimmed.split_whitespace();
    let token = parts.next()?.to_string();
    Some(ParsedCommand {
        name: token.to_lowercase(),
        token,
        args: parts.map(str::to_string).collect(),
    })
}

/// Message for a name that is not registered.
pub fn not_found_message(token: &str) -> String {
    format!("Command not found: {token}. Type 'help' for available commands.")
}

/// Registry holding every command available to one terminal.
pub struct CommandRegistry {
    commands: Vec<CommandSpec>,
    context: CommandContext,
}

impl CommandRegistry {
    /// Build the command table for `context`.
    pub fn build(context: CommandContext) -> Self {
        let mut registry = Self {
            commands: Vec::new(),
            context,
        };
        registry.register_defaults();
        if registry.context.variant == TerminalVariant::Floating {
            registry.register_window_controls();
        }
        debug!(
            variant = ?registry.context.variant,
            commands = registry.commands.len(),
            "Command registry built"
        );
        registry
    }

    fn register(&mut self, spec: CommandSpec) {
        self.commands.push(spec);
    }

    fn register_defaults(&mut self) {
        // Information
        self.register(CommandSpec {
            name: "help",
            description: "Show available commands",
            usage: Some("help [command]"),
            examples: &["help", "help cat", "help search"],
            category: CommandCategory::Information,
            kind: CommandKind::Info(InfoCommand::Help),
        });
        self.register(CommandSpec {
            name: "about",
            description: "Learn about me",
            usage: None,
            examples: &[],
            category: CommandCategory::Information,
            kind: CommandKind::Info(InfoCommand::About),
        });
        self.register(CommandSpec {
            name: "whoami",
            description: "Display current user",
            usage: None,
            examples: &[],
            category: CommandCategory::Information,
            kind: CommandKind::Info(InfoCommand::Whoami),
        });
        self.register(CommandSpec {
            name: "date",
            description: "Show current date and time",
            usage: None,
            examples: &[],
            category: CommandCategory::Information,
            kind: CommandKind::Info(InfoCommand::Date),
        });

        // Contact
        self.register(CommandSpec {
            name: "contact",
            description: "Get my contact information",
            usage: None,
            examples: &[],
            category: CommandCategory::Contact,
            kind: CommandKind::Contact,
        });

        // Navigation
        self.register(CommandSpec {
            name: "open",
            description: "Open a blog post or a social profile",
            usage: Some("open <target>"),
            examples: &["open blog 1", "open twitter", "open github"],
            category: CommandCategory::Navigation,
            kind: CommandKind::Navigation(NavigationCommand::Open),
        });
        self.register(CommandSpec {
            name: "goto",
            description: "Navigate to different pages",
            usage: Some("goto <page>"),
            examples: &["goto home", "goto blog", "goto thoughts"],
            category: CommandCategory::Navigation,
            kind: CommandKind::Navigation(NavigationCommand::Goto),
        });

        // Blog & Content
        self.register(CommandSpec {
            name: "blog",
            description: "See latest blog posts",
            usage: None,
            examples: &[],
            category: CommandCategory::BlogContent,
            kind: CommandKind::Content(ContentCommand::Blog),
        });
        self.register(CommandSpec {
            name: "search",
            description: "Search through blog posts",
            usage: Some("search <keyword>"),
            examples: &["search react", "search performance", "search typescript"],
            category: CommandCategory::BlogContent,
            kind: CommandKind::Content(ContentCommand::Search),
        });
        self.register(CommandSpec {
            name: "featured",
            description: "Show featured blog posts",
            usage: None,
            examples: &[],
            category: CommandCategory::BlogContent,
            kind: CommandKind::Content(ContentCommand::Featured),
        });
        self.register(CommandSpec {
            name: "recent",
            description: "Show recent blog posts",
            usage: Some("recent [number]"),
            examples: &["recent", "recent 3", "recent 10"],
            category: CommandCategory::BlogContent,
            kind: CommandKind::Content(ContentCommand::Recent),
        });

        // File System
        self.register(CommandSpec {
            name: "pwd",
            description: "Print working directory",
            usage: None,
            examples: &[],
            category: CommandCategory::FileSystem,
            kind: CommandKind::Files(FileCommand::Pwd),
        });
        self.register(CommandSpec {
            name: "cat",
            description: "Display file contents",
            usage: Some("cat <filename>"),
            examples: &["cat about.md", "cat contact.txt"],
            category: CommandCategory::FileSystem,
            kind: CommandKind::Files(FileCommand::Cat),
        });

        // Projects
        self.register(CommandSpec {
            name: "projects",
            description: "View my featured projects",
            usage: None,
            examples: &[],
            category: CommandCategory::Projects,
            kind: CommandKind::Info(InfoCommand::Projects),
        });

        // Must Try
        self.register(CommandSpec {
            name: SELF_DESTRUCT,
            description: "You may test that assumption at your convenience",
            usage: None,
            examples: &[],
            category: CommandCategory::MustTry,
            kind: CommandKind::Files(FileCommand::SelfDestruct),
        });

        // Terminal Control
        self.register(CommandSpec {
            name: "clear",
            description: "Clear terminal output",
            usage: None,
            examples: &[],
            category: CommandCategory::TerminalControl,
            kind: CommandKind::Control(ControlCommand::Clear),
        });
    }

    fn register_window_controls(&mut self) {
        self.register(CommandSpec {
            name: "theme",
            description: "Toggle terminal theme",
            usage: None,
            examples: &[],
            category: CommandCategory::TerminalControl,
            kind: CommandKind::Window(WindowCommand::Theme),
        });
        self.register(CommandSpec {
            name: "opacity",
            description: "Set terminal opacity",
            usage: Some("opacity <30-100>"),
            examples: &["opacity 80", "opacity 100"],
            category: CommandCategory::TerminalControl,
            kind: CommandKind::Window(WindowCommand::Opacity),
        });
        self.register(CommandSpec {
            name: "minimize",
            description: "Minimize terminal",
            usage: None,
            examples: &[],
            category: CommandCategory::TerminalControl,
            kind: CommandKind::Window(WindowCommand::Minimize),
        });
        self.register(CommandSpec {
            name: "close",
            description: "Close terminal",
            usage: None,
            examples: &[],
            category: CommandCategory::TerminalControl,
            kind: CommandKind::Window(WindowCommand::Close),
        });
        self.register(CommandSpec {
            name: "reset",
            description: "Reset terminal position and size",
            usage: None,
            examples: &[],
            category: CommandCategory::TerminalControl,
            kind: CommandKind::Window(WindowCommand::Reset),
        });
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    /// Look up a command by name, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.commands
            .iter()
            .find(|cmd| cmd.name.eq_ignore_ascii_case(name))
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|cmd| cmd.name)
    }

    /// Names starting with `prefix`, ignoring case, sorted.
    pub fn completions(&self, prefix: &str) -> Vec<&'static str> {
        let prefix = prefix.to_lowercase();
        let mut results: Vec<&'static str> = self
            .names()
            .filter(|name| name.starts_with(&prefix))
            .collect();
        results.sort();
        results
    }

    pub fn all(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Categorized listing followed by tips.
    pub fn help_text(&self) -> Vec<String> {
        let mut output = vec!["Available commands:".to_string()];

        for category in CommandCategory::all() {
            let cmds: Vec<&CommandSpec> = self
                .commands
                .iter()
                .filter(|c| c.category == *category)
                .collect();
            if cmds.is_empty() {
                continue;
            }
            output.push(String::new());
            output.push(format!("## {}:", category.label()));
            for cmd in cmds {
                output.push(format!("  {:<16}- {}", cmd.listing(), cmd.description));
            }
        }

        if self.context.variant == TerminalVariant::Floating {
            output.extend(
                [
                    "",
                    "⌨️ Global Shortcuts:",
                    "  Ctrl + `         - Toggle terminal anywhere",
                    "  Ctrl + Shift + T - Alternative toggle",
                    "  Escape           - Close terminal",
                ]
                .map(String::from),
            );
        }

        output.extend(
            [
                "",
                "💡 Tips:",
                "  ↑/↓ arrows       - Command history",
                "  Tab              - Auto-complete commands",
                "  Ctrl + L         - Clear the input line",
            ]
            .map(String::from),
        );
        if self.context.variant == TerminalVariant::Floating {
            output.push("  Drag header      - Move terminal".to_string());
            output.push("  Drag corner      - Resize terminal".to_string());
        }
        output
    }

    /// Detail lines for one command, or a not-found line.
    pub fn help_for(&self, topic: &str) -> Output {
        let Some(cmd) = self.lookup(topic) else {
            return Output::text(format!(
                "Command '{topic}' not found. Type 'help' to see all commands."
            ));
        };
        let mut lines = vec![
            format!("Command: {}", cmd.name),
            format!("Description: {}", cmd.description),
        ];
        if let Some(usage) = cmd.usage {
            lines.push(format!("Usage: {usage}"));
        }
        if !cmd.examples.is_empty() {
            lines.push(format!("Examples: {}", cmd.examples.join(", ")));
        }
        Output::Lines(lines)
    }

    /// Run a registered command by name.
    pub async fn execute(&self, name: &str, args: &[String]) -> Result<Output> {
        let cmd = self.lookup(name).ok_or_else(|| CommandError::NotFound {
            name: name.to_string(),
        })?;
        debug!(command = cmd.name, args = args.len(), "Executing command");
        let ctx = &self.context;

        match cmd.kind {
            CommandKind::Info(info) => Ok(self.run_info(info, args)),
            CommandKind::Contact => Ok(info::contact(&ctx.profile)),
            CommandKind::Files(file) => Ok(files::run(file, ctx, args)),
            CommandKind::Content(content) => blog::run(content, ctx, args).await,
            CommandKind::Navigation(nav) => links::run(nav, ctx, args).await,
            CommandKind::Window(window) => control::run_window(window, cmd.name, ctx, args),
            CommandKind::Control(ControlCommand::Clear) => Ok(Output::Clear),
        }
    }

    fn run_info(&self, cmd: InfoCommand, args: &[String]) -> Output {
        let profile = &self.context.profile;
        match cmd {
            // `help rm -rf /` names the multi-word command
            InfoCommand::Help if !args.is_empty() => self.help_for(&args.join(" ")),
            InfoCommand::Help => Output::Lines(self.help_text()),
            InfoCommand::About => info::about(profile),
            InfoCommand::Whoami => Output::text(profile.username.clone()),
            InfoCommand::Date => info::date(),
            InfoCommand::Projects => info::projects(profile),
        }
    }

    /// Tokenize and run one input line. Blank lines produce nothing; unknown
    /// names produce the not-found line naming the token as typed.
    pub async fn execute_line(&self, raw: &str) -> Result<Option<Output>> {
        let Some(parsed) = parse_command_line(raw) else {
            return Ok(None);
        };
        if self.lookup(&parsed.name).is_none() {
            debug!(token = %parsed.token, "Unknown command");
            return Ok(Some(Output::text(not_found_message(&parsed.token))));
        }
        self.execute(&parsed.name, &parsed.args).await.map(Some)
    }
}
