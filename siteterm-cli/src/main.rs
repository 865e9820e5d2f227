//! SiteTerm CLI: the website's terminal, in your terminal.
//!
//! Provides an interactive REPL and a single-command mode.

mod host;
mod repl;

use clap::Parser;
use siteterm_core::{
    CommandContext, InMemoryContentIndex, NavigationScheduler, TerminalConfig, TerminalSession,
    WindowControl, WindowStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::host::BrowserNavigator;
use crate::repl::StdoutCallback;

/// SiteTerm: a personal website's command interpreter
#[derive(Parser, Debug)]
#[command(name = "siteterm", version, about, long_about = None)]
struct Cli {
    /// Command line to run (starts interactive mode if omitted)
    command_line: Option<String>,

    /// JSON file with the site's posts
    #[arg(short, long)]
    posts: Option<PathBuf>,

    /// Run as the floating window, with the window-control commands
    #[arg(long)]
    floating: bool,

    /// Skip the boot sequence
    #[arg(long)]
    no_boot: bool,

    /// Route the terminal is shown on
    #[arg(long, default_value = "/")]
    path: String,

    /// Log links instead of opening them in the browser
    #[arg(long)]
    no_browser: bool,

    /// Workspace directory holding `.siteterm/config.toml`
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show current configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Stderr shares the screen with the REPL, so it stays quiet by default
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Human-readable layer for stderr (always active)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "siteterm", "siteterm")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "siteterm.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if let Some(Commands::Config { action }) = &cli.command {
        return handle_config(action, &workspace);
    }

    let mut config = siteterm_core::load_config(Some(&workspace), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    config.validate()?;

    // Apply CLI overrides
    if cli.no_boot || cli.command_line.is_some() {
        config.boot.enabled = false;
    }

    run(cli, config).await
}

fn handle_config(action: &ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let dir = workspace.join(".siteterm");
            let path = dir.join("config.toml");
            if path.exists() {
                println!("Configuration already exists at {}", path.display());
                return Ok(());
            }
            std::fs::create_dir_all(&dir)?;
            std::fs::write(&path, toml::to_string_pretty(&TerminalConfig::default())?)?;
            println!("Created {}", path.display());
        }
        ConfigAction::Show => {
            let config = siteterm_core::load_config(Some(workspace), None)
                .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

async fn run(cli: Cli, config: TerminalConfig) -> anyhow::Result<()> {
    let index = match &cli.posts {
        Some(path) => InMemoryContentIndex::from_json_file(path)?,
        None => InMemoryContentIndex::default(),
    };
    info!(posts = index.len(), "Content index ready");

    let (routes_tx, routes_rx) = mpsc::unbounded_channel();
    let navigator = Arc::new(BrowserNavigator::new(
        &config.profile.website,
        !cli.no_browser,
        routes_tx,
    ));

    let window = cli.floating.then(|| {
        let store = Arc::new(WindowStore::new(config.window.clone()));
        store.open();
        store
    });

    let mut scheduler = NavigationScheduler::new(navigator);
    if let Some(window) = &window {
        scheduler = scheduler.with_window(window.clone());
    }
    let mut context = CommandContext::new(Arc::new(index), Arc::new(scheduler))
        .with_path(cli.path.clone())
        .with_theme(config.window.default_theme);
    if let Some(window) = &window {
        context = context.floating(window.clone() as Arc<dyn WindowControl>);
    }

    let screen = Arc::new(StdoutCallback::new(config.window.default_theme));
    let navigation_delay = config.navigation.delay();
    let session = TerminalSession::new(config, context, screen.clone());

    match cli.command_line {
        Some(line) => repl::run_single_command(session, screen, &line, navigation_delay).await,
        None => repl::run_interactive(session, screen, routes_rx, window).await,
    }
}
