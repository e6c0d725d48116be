//! Local Player - ffplay/mpv/VLC playback
//!
//! Streams open in an external player process. The player runs in its own
//! process group so that stopping it also takes down any helpers it spawned.

use serde::{Deserialize, Serialize};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;

/// Supported local players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    /// ffplay from FFmpeg (default)
    #[default]
    Ffplay,
    /// mpv media player
    Mpv,
    /// VLC media player
    Vlc,
}

impl PlayerType {
    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerType::Ffplay => "ffplay",
            PlayerType::Mpv => "mpv",
            PlayerType::Vlc => {
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerType::Ffplay => "ffplay",
            PlayerType::Mpv => "mpv",
            PlayerType::Vlc => "VLC",
        }
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Errors from local player operations
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start player: {0}")]
    StartFailed(#[from] std::io::Error),
    #[error("Nothing to play")]
    EmptyUrl,
}

/// Something that can play a stream URL
pub trait MediaPlayer: Send {
    /// Start playing `url`, replacing any current playback
    fn launch(&mut self, url: &str) -> Result<(), PlayerError>;

    /// Stop playback; no-op when idle
    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    /// Returns true once if the player exited on its own since the last call
    fn poll_exit(&mut self) -> bool;
}

/// External player process
pub struct LocalPlayer {
    player_type: PlayerType,
    width: u32,
    height: u32,
    child: Option<Child>,
}

impl LocalPlayer {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            player_type: config.player,
            width: config.width,
            height: config.height,
            child: None,
        }
    }

    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    /// Check if the player is available on the system
    pub async fn is_available(&self) -> bool {
        let cmd = self.player_type.command();
        if cmd.starts_with('/') {
            return std::path::Path::new(cmd).exists();
        }

        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Command-line arguments for playing `url`
    pub fn args(&self, url: &str) -> Vec<String> {
        let (w, h) = (self.width, self.height);
        match self.player_type {
            PlayerType::Ffplay => vec![
                "-vf".into(),
                format!("scale={}:{}", w, h),
                "-window_title".into(),
                "glimpse".into(),
                "-autoexit".into(),
                "-x".into(),
                w.to_string(),
                "-y".into(),
                h.to_string(),
                url.into(),
            ],
            PlayerType::Mpv => vec![
                url.into(),
                "--force-window=immediate".into(),
                format!("--geometry={}x{}", w, h),
                "--title=glimpse".into(),
            ],
            PlayerType::Vlc => vec![
                url.into(),
                "--no-video-title-show".into(),
                format!("--width={}", w),
                format!("--height={}", h),
                "--play-and-exit".into(),
            ],
        }
    }

    fn spawn(&self, url: &str) -> Result<Child, PlayerError> {
        let mut cmd = Command::new(self.player_type.command());
        cmd.args(self.args(url))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::NotFound(self.player_type.command().to_string())
            } else {
                PlayerError::StartFailed(e)
            }
        })
    }
}

impl MediaPlayer for LocalPlayer {
    fn launch(&mut self, url: &str) -> Result<(), PlayerError> {
        if url.is_empty() {
            return Err(PlayerError::EmptyUrl);
        }
        self.stop();
        let child = self.spawn(url)?;
        info!(player = %self.player_type, pid = ?child.id(), "player started");
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        kill_group(&mut child);
        // reap if it is already gone; otherwise tokio reaps it in the background
        let _ = child.try_wait();
        debug!("player stopped");
    }

    fn is_playing(&self) -> bool {
        self.child.is_some()
    }

    fn poll_exit(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(%status, "player exited");
                self.child = None;
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "could not poll player");
                self.child = None;
                true
            }
        }
    }
}

impl Drop for LocalPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(unix)]
fn kill_group(child: &mut Child) {
    if let Some(pid) = child.id() {
        // process_group(0) made the child its own group leader
        let rc = unsafe { libc::kill(-(pid as libc::pid_t), libc::SIGKILL) };
        if rc == 0 {
            return;
        }
    }
    let _ = child.start_kill();
}

#[cfg(not(unix))]
fn kill_group(child: &mut Child) {
    let _ = child.start_kill();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(player_type: PlayerType) -> LocalPlayer {
        LocalPlayer::new(&PlayerConfig {
            player: player_type,
            ..PlayerConfig::default()
        })
    }

    #[test]
    fn test_player_type_command() {
        assert_eq!(PlayerType::Ffplay.command(), "ffplay");
        assert_eq!(PlayerType::Mpv.command(), "mpv");
        let vlc_cmd = PlayerType::Vlc.command();
        assert!(vlc_cmd == "vlc" || vlc_cmd == "/Applications/VLC.app/Contents/MacOS/VLC");
    }

    #[test]
    fn test_default_player() {
        assert_eq!(PlayerType::default(), PlayerType::Ffplay);
        assert_eq!(PlayerType::Vlc.to_string(), "VLC");
    }

    #[test]
    fn test_ffplay_args() {
        let args = player(PlayerType::Ffplay).args("https://cdn/x.m3u8");
        assert_eq!(
            args,
            vec![
                "-vf",
                "scale=640:480",
                "-window_title",
                "glimpse",
                "-autoexit",
                "-x",
                "640",
                "-y",
                "480",
                "https://cdn/x.m3u8"
            ]
        );
    }

    #[test]
    fn test_mpv_args_start_with_url() {
        let args = player(PlayerType::Mpv).args("https://cdn/x.m3u8");
        assert_eq!(args[0], "https://cdn/x.m3u8");
        assert!(args.contains(&"--geometry=640x480".to_string()));
    }

    #[test]
    fn test_idle_player() {
        let mut p = player(PlayerType::Ffplay);
        assert!(!p.is_playing());
        assert!(!p.poll_exit());
        p.stop();
        assert!(!p.is_playing());
    }

    #[test]
    fn test_launch_empty_url() {
        let mut p = player(PlayerType::Ffplay);
        assert!(matches!(p.launch(""), Err(PlayerError::EmptyUrl)));
    }
}
