//! glimpse - browse and play Twitch streams from the terminal
//!
//! # Usage
//!
//! ```bash
//! # Launch interactive TUI
//! glimpse
//!
//! # CLI mode (for scripting)
//! glimpse top --limit 5
//! glimpse search "speedrun" --json
//! glimpse play somestreamer
//! ```

use std::io::{stdout, Stdout};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;
use tracing_subscriber::EnvFilter;

use glimpse::app::{App, Command as AppCommand, Completion, Screen};
use glimpse::cli::{Cli, Command, ExitCode, Output};
use glimpse::config::{self, Config};
use glimpse::{commands, input, ui};
use glimpse::{FavoritesStore, ImageCache, LiveStatusClient, LocalPlayer, Runtime, TwitchClient};

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.is_cli_mode() {
        init_cli_logging();
        let config = load_config(&cli);
        let exit_code = run_cli(cli, &config).await;
        std::process::exit(exit_code.into());
    } else {
        let log_path = init_file_logging()?;
        info!(log = %log_path.display(), "glimpse starting");
        let config = load_config(&cli);
        run_tui(config).await
    }
}

fn load_config(cli: &Cli) -> Config {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

// =============================================================================
// Logging
// =============================================================================

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// CLI mode: warnings to stderr so stdout stays parseable
fn init_cli_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter("warn"))
        .init();
}

/// TUI mode: the terminal belongs to the UI, so log to a file
fn init_file_logging() -> Result<std::path::PathBuf> {
    let dir = config::data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let log_path = dir.join("glimpse.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_env_filter(env_filter("info"))
        .init();
    Ok(log_path)
}

// =============================================================================
// CLI Mode
// =============================================================================

/// Run CLI command and return exit code
async fn run_cli(cli: Cli, config: &Config) -> ExitCode {
    let output = Output::new(&cli);

    match cli.command {
        Some(Command::Top(cmd)) => commands::top_cmd(cmd, config, &output).await,
        Some(Command::Search(cmd)) => commands::search_cmd(cmd, config, &output).await,
        Some(Command::Resolve(cmd)) => commands::resolve_cmd(cmd, config, &output).await,
        Some(Command::Play(cmd)) => commands::play_cmd(cmd, config, &output).await,
        // handled by the is_cli_mode check
        None => ExitCode::Success,
    }
}

// =============================================================================
// TUI Mode
// =============================================================================

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_tui(config: Config) -> Result<()> {
    let favorites = FavoritesStore::load(config.favorites.resolved_path());
    let images = Arc::new(ImageCache::new());
    let twitch = Arc::new(TwitchClient::with_images(config.twitch.clone(), images));
    let live_status = Arc::new(LiveStatusClient::new(&config.favorites));
    let player = Box::new(LocalPlayer::new(&config.player));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runtime = Runtime::new(twitch, live_status, player, tx);
    let mut app = App::new(favorites);

    let mut terminal = init_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app, &mut runtime, &mut rx).await;

    // Always stop the player and restore the terminal, even on error
    runtime.shutdown();
    restore_terminal(&mut terminal)?;
    info!("glimpse exiting");

    result
}

fn dispatch(app: &App, runtime: &mut Runtime, commands: Vec<AppCommand>) {
    for command in commands {
        runtime.execute(command, &app.favorites);
    }
}

/// Main event loop - input, completions, player exit, render
async fn run_event_loop(
    terminal: &mut Tui,
    app: &mut App,
    runtime: &mut Runtime,
    completions: &mut UnboundedReceiver<Completion>,
) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(100);

    let startup = app.start();
    dispatch(app, runtime, startup);

    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (ignore releases on Windows)
                if key.kind == KeyEventKind::Press {
                    let mapped = match app.screen {
                        Screen::TextInput(_) => input::from_text_key(key),
                        Screen::Browsing(_) => input::from_key(key),
                    };
                    if let Some(input) = mapped {
                        let commands = app.handle_input(input);
                        dispatch(app, runtime, commands);
                    }
                }
            }
        }

        while let Ok(completion) = completions.try_recv() {
            let commands = app.complete(completion);
            dispatch(app, runtime, commands);
        }

        runtime.poll_player();
    }

    Ok(())
}
