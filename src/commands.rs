//! CLI Command Handlers
//!
//! Each handler takes its CLI args, the loaded config and Output, and returns
//! an ExitCode.

use std::time::Duration;

use crate::api::{TwitchClient, TwitchError};
use crate::cli::{
    validate_login, ExitCode, Output, PlayCmd, PlayResponse, ResolveCmd, ResolveResponse,
    SearchCmd, TopCmd,
};
use crate::config::{Config, TwitchConfig};
use crate::models::Stream;
use crate::player::{LocalPlayer, MediaPlayer, PlayerType};

/// Exit code for a failed Twitch call
pub fn exit_code_for(error: &TwitchError) -> ExitCode {
    match error {
        TwitchError::Request(_) => ExitCode::NetworkError,
        // usher answers 404 for channels that are not live
        TwitchError::Http(404) => ExitCode::StreamUnavailable,
        TwitchError::Http(_) => ExitCode::NetworkError,
        TwitchError::RenditionNotFound { .. } => ExitCode::StreamUnavailable,
        TwitchError::Decode(_) | TwitchError::MissingData(_) => ExitCode::Error,
    }
}

fn twitch_client(config: TwitchConfig, rendition: Option<String>) -> TwitchClient {
    let config = match rendition {
        Some(rendition) => TwitchConfig { rendition, ..config },
        None => config,
    };
    TwitchClient::new(config)
}

fn print_streams(streams: &[Stream], output: &Output) -> ExitCode {
    if output.json {
        if let Err(e) = output.print(streams) {
            return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
        }
    } else {
        output.lines(streams);
    }
    ExitCode::Success
}

// =============================================================================
// Top Command
// =============================================================================

pub async fn top_cmd(cmd: TopCmd, config: &Config, output: &Output) -> ExitCode {
    let limit = cmd.limit.unwrap_or(config.twitch.top_streams_limit);
    if limit == 0 {
        return output.error("Limit must be at least 1", ExitCode::InvalidArgs);
    }
    let client = TwitchClient::new(config.twitch.clone());

    output.info(format!("Fetching top {} streams...", limit));

    match client.top_streams(limit).await {
        Ok(streams) => print_streams(&streams, output),
        Err(e) => output.error(format!("Top streams failed: {}", e), exit_code_for(&e)),
    }
}

// =============================================================================
// Search Command
// =============================================================================

pub async fn search_cmd(cmd: SearchCmd, config: &Config, output: &Output) -> ExitCode {
    let query = cmd.query.trim();
    if query.is_empty() {
        return output.error("Search query is empty", ExitCode::InvalidArgs);
    }
    let client = TwitchClient::new(config.twitch.clone());

    output.info(format!("Searching for: {}", query));

    match client.search_streams(query).await {
        Ok(streams) => print_streams(&streams, output),
        Err(e) => output.error(format!("Search failed: {}", e), exit_code_for(&e)),
    }
}

// =============================================================================
// Resolve Command
// =============================================================================

pub async fn resolve_cmd(cmd: ResolveCmd, config: &Config, output: &Output) -> ExitCode {
    let login = match validate_login(&cmd.login) {
        Ok(login) => login.to_string(),
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };
    let client = twitch_client(config.twitch.clone(), cmd.rendition);

    output.info(format!("Resolving {}...", login));

    match client.resolve_playback(&login).await {
        Ok(url) => {
            if output.json {
                if let Err(e) = output.print(ResolveResponse { login, url }) {
                    return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
                }
            } else {
                output.lines([url]);
            }
            ExitCode::Success
        }
        Err(e) => output.error(format!("Resolve failed: {}", e), exit_code_for(&e)),
    }
}

// =============================================================================
// Play Command
// =============================================================================

pub async fn play_cmd(cmd: PlayCmd, config: &Config, output: &Output) -> ExitCode {
    const POLL_INTERVAL: Duration = Duration::from_millis(250);

    let login = match validate_login(&cmd.login) {
        Ok(login) => login.to_string(),
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };

    let mut player_config = config.player.clone();
    if let Some(choice) = cmd.player {
        player_config.player = PlayerType::from(choice);
    }
    let mut player = LocalPlayer::new(&player_config);
    if !player.is_available().await {
        return output.error(
            format!("Player '{}' not found. Install it first.", player.player_type().command()),
            ExitCode::Error,
        );
    }

    let client = twitch_client(config.twitch.clone(), cmd.rendition);
    output.info(format!("Resolving {}...", login));
    let url = match client.resolve_playback(&login).await {
        Ok(url) => url,
        Err(e) => return output.error(format!("Resolve failed: {}", e), exit_code_for(&e)),
    };

    if let Err(e) = player.launch(&url) {
        return output.error(format!("Failed to start player: {}", e), ExitCode::Error);
    }
    output.info(format!("Playing {} in {} (Ctrl-C to stop)", login, player.player_type()));

    let status = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                player.stop();
                break "stopped";
            }
            _ = tokio::time::sleep(POLL_INTERVAL) => {
                if player.poll_exit() {
                    break "finished";
                }
            }
        }
    };

    if output.json {
        let response = PlayResponse {
            status,
            login,
            player: player.player_type().to_string(),
        };
        if let Err(e) = output.print(response) {
            return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
        }
    }
    ExitCode::Success
}
