//! CLI - Command Line Interface for glimpse
//!
//! Every browse action is scriptable. Output is JSON when asked for or when
//! stdout is not a terminal.
//!
//! # Examples
//!
//! ```bash
//! glimpse top --limit 5
//! glimpse search "speedrun" --json
//! glimpse resolve somestreamer
//! glimpse play somestreamer --player mpv
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::player::PlayerType;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// Stream offline or no matching rendition
    StreamUnavailable = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// glimpse - browse and play Twitch streams from the terminal
///
/// Run without arguments to launch the interactive TUI.
#[derive(Parser, Debug)]
#[command(
    name = "glimpse",
    version,
    about = "Browse and play Twitch streams from the terminal",
    long_about = "Lists top streams, searches live channels and plays them in \
                  ffplay, mpv or VLC.\n\n\
                  Run without arguments to launch the interactive TUI.\n\
                  Use subcommands for scripting.",
    after_help = "EXAMPLES:\n\
                  glimpse                        Launch interactive TUI\n\
                  glimpse top -l 5               Five most watched streams\n\
                  glimpse search \"chess\"         Live channels matching a query\n\
                  glimpse resolve somestreamer   Print the playable manifest URL"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the most watched live streams
    #[command(visible_alias = "t")]
    Top(TopCmd),

    /// Search live channels
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// Print the playable manifest URL of a live channel
    #[command(visible_alias = "r")]
    Resolve(ResolveCmd),

    /// Play a live channel in the local player
    #[command(visible_alias = "p")]
    Play(PlayCmd),
}

/// List the most watched live streams
#[derive(Args, Debug)]
pub struct TopCmd {
    /// Number of streams (default from config)
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,
}

/// Search live channels by query
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Search query (channel name, keywords)
    #[arg(required = true)]
    pub query: String,
}

/// Resolve the manifest URL for a channel
#[derive(Args, Debug)]
pub struct ResolveCmd {
    /// Channel login
    pub login: String,

    /// Rendition marker to look for (e.g. "RESOLUTION=1280x720")
    #[arg(long, short = 'r')]
    pub rendition: Option<String>,
}

/// Play a channel locally
#[derive(Args, Debug)]
pub struct PlayCmd {
    /// Channel login
    pub login: String,

    /// Rendition marker to look for
    #[arg(long, short = 'r')]
    pub rendition: Option<String>,

    /// Player to use (default from config)
    #[arg(long, short = 'p', value_enum)]
    pub player: Option<PlayerChoice>,
}

/// Local player selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerChoice {
    Ffplay,
    Mpv,
    Vlc,
}

impl From<PlayerChoice> for PlayerType {
    fn from(choice: PlayerChoice) -> Self {
        match choice {
            PlayerChoice::Ffplay => PlayerType::Ffplay,
            PlayerChoice::Mpv => PlayerType::Mpv,
            PlayerChoice::Vlc => PlayerType::Vlc,
        }
    }
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Resolved manifest URL
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub login: String,
    pub url: String,
}

/// Result of a local play
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayResponse {
    pub status: &'static str,
    pub login: String,
    pub player: String,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data as a JSON envelope
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(&JsonOutput::success(data))?);
        Ok(())
    }

    /// Print plain text lines (non-JSON mode)
    pub fn lines<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: std::fmt::Display,
    {
        for line in lines {
            println!("{}", line);
        }
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Argument Validation
// =============================================================================

/// Validate a channel login (1-25 ASCII letters, digits or underscores)
pub fn validate_login(login: &str) -> Result<&str, &'static str> {
    if !login.is_empty()
        && login.len() <= 25
        && login.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(login)
    } else {
        Err("Invalid channel login (expected 1-25 letters, digits or underscores)")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_args_is_tui_mode() {
        let cli = Cli::parse_from(["glimpse"]);
        assert!(!cli.is_cli_mode());
    }

    #[test]
    fn test_top_command() {
        let cli = Cli::parse_from(["glimpse", "top", "--limit", "5"]);
        match cli.command {
            Some(Command::Top(cmd)) => assert_eq!(cmd.limit, Some(5)),
            other => panic!("Expected Top command, got {:?}", other),
        }
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Cli::try_parse_from(["glimpse", "search"]).is_err());
        let cli = Cli::parse_from(["glimpse", "s", "chess club"]);
        match cli.command {
            Some(Command::Search(cmd)) => assert_eq!(cmd.query, "chess club"),
            other => panic!("Expected Search command, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["glimpse", "resolve", "somebody", "-j", "-q"]);
        assert!(cli.json);
        assert!(cli.quiet);
        assert!(cli.should_json());
    }

    #[test]
    fn test_play_options() {
        let cli = Cli::parse_from([
            "glimpse", "play", "somebody", "--player", "mpv", "-r", "RESOLUTION=1280x720",
        ]);
        match cli.command {
            Some(Command::Play(cmd)) => {
                assert_eq!(cmd.login, "somebody");
                assert_eq!(cmd.player.map(PlayerType::from), Some(PlayerType::Mpv));
                assert_eq!(cmd.rendition.as_deref(), Some("RESOLUTION=1280x720"));
            }
            other => panic!("Expected Play command, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_login() {
        assert!(validate_login("some_streamer42").is_ok());
        assert!(validate_login("").is_err());
        assert!(validate_login("has space").is_err());
        assert!(validate_login("../etc").is_err());
        assert!(validate_login(&"a".repeat(26)).is_err());
    }

    #[test]
    fn test_json_envelopes() {
        let ok = serde_json::to_value(JsonOutput::success(vec![1, 2])).unwrap();
        assert_eq!(ok, serde_json::json!({"data": [1, 2]}));

        let err = serde_json::to_value(JsonOutput::<()>::error_msg("boom", ExitCode::StreamUnavailable))
            .unwrap();
        assert_eq!(err, serde_json::json!({"error": "boom", "exit_code": 5}));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::Error), 1);
        assert_eq!(i32::from(ExitCode::InvalidArgs), 2);
        assert_eq!(i32::from(ExitCode::NetworkError), 3);
        assert_eq!(i32::from(ExitCode::StreamUnavailable), 5);
    }
}
