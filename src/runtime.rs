//! Command executor
//!
//! Runs the [`Command`]s produced by the state machine. Network work is
//! spawned onto tokio and reports back as a [`Completion`] on the channel;
//! player control happens inline since spawning a process does not block.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::api::{LiveStatusClient, TwitchClient};
use crate::app::{Command, Completion};
use crate::enrich;
use crate::favorites::FavoritesStore;
use crate::player::MediaPlayer;

/// Executes commands against the network and the player
pub struct Runtime {
    twitch: Arc<TwitchClient>,
    live_status: Arc<LiveStatusClient>,
    player: Box<dyn MediaPlayer>,
    /// Resolved manifest URLs by login; only non-empty URLs are stored
    playback_urls: Arc<Mutex<HashMap<String, String>>>,
    /// Login of the stream handed to the player
    current: Option<String>,
    tx: UnboundedSender<Completion>,
}

impl Runtime {
    pub fn new(
        twitch: Arc<TwitchClient>,
        live_status: Arc<LiveStatusClient>,
        player: Box<dyn MediaPlayer>,
        tx: UnboundedSender<Completion>,
    ) -> Self {
        Self {
            twitch,
            live_status,
            player,
            playback_urls: Arc::new(Mutex::new(HashMap::new())),
            current: None,
            tx,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    /// Cached playback URL for `login`, if any
    pub fn cached_playback_url(&self, login: &str) -> Option<String> {
        self.playback_urls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(login)
            .cloned()
    }

    /// Execute one command
    pub fn execute(&mut self, command: Command, favorites: &FavoritesStore) {
        debug!(?command, "execute");
        match command {
            Command::LoadTop => {
                let twitch = Arc::clone(&self.twitch);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let limit = twitch.config().top_streams_limit;
                    let result = twitch.top_streams(limit).await.map_err(|e| e.to_string());
                    let _ = tx.send(Completion::TopLoaded(result));
                });
            }
            Command::LoadFavorites { ticket, favorites } => {
                let twitch = Arc::clone(&self.twitch);
                let live_status = Arc::clone(&self.live_status);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = match live_status.live_streams(&favorites).await {
                        Ok(streams) => Ok(enrich::enrich(twitch.images(), &streams).await),
                        Err(e) => Err(e.to_string()),
                    };
                    let _ = tx.send(Completion::FavoritesLoaded { ticket, result });
                });
            }
            Command::Search { ticket, query } => {
                let twitch = Arc::clone(&self.twitch);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = twitch.search_streams(&query).await.map_err(|e| e.to_string());
                    let _ = tx.send(Completion::SearchFinished { ticket, result });
                });
            }
            Command::ResolvePlayback { ticket, login } => {
                if let Some(url) = self.cached_playback_url(&login) {
                    debug!(login = %login, "playback url from cache");
                    let _ = self.tx.send(Completion::PlaybackResolved {
                        ticket,
                        login,
                        result: Ok(url),
                    });
                    return;
                }

                let twitch = Arc::clone(&self.twitch);
                let cache = Arc::clone(&self.playback_urls);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = twitch
                        .resolve_playback_url(&login)
                        .await
                        .map_err(|e| e.to_string());
                    if let Ok(url) = &result {
                        if !url.is_empty() {
                            cache
                                .lock()
                                .unwrap_or_else(|e| e.into_inner())
                                .insert(login.clone(), url.clone());
                        }
                    }
                    let _ = tx.send(Completion::PlaybackResolved {
                        ticket,
                        login,
                        result,
                    });
                });
            }
            Command::Launch { ticket, login, url } => match self.player.launch(&url) {
                Ok(()) => {
                    info!(login = %login, "playing");
                    self.current = Some(login.clone());
                    let _ = self.tx.send(Completion::PlaybackStarted { ticket, login });
                }
                Err(e) => {
                    warn!(login = %login, error = %e, "player failed to start");
                    self.forget(&login);
                    let _ = self.tx.send(Completion::PlaybackFailed {
                        ticket,
                        login,
                        error: e.to_string(),
                    });
                }
            },
            Command::StopPlayback => {
                self.player.stop();
                self.current = None;
            }
            Command::SaveFavorites => {
                if let Err(e) = favorites.save() {
                    warn!(error = %e, "could not save favorites");
                }
            }
        }
    }

    /// Report a player that exited on its own
    pub fn poll_player(&mut self) {
        if self.player.poll_exit() {
            // the stream ended or its token expired; resolve afresh next time
            if let Some(login) = self.current.take() {
                self.forget(&login);
            }
            let _ = self.tx.send(Completion::PlaybackEnded);
        }
    }

    /// Stop anything still running
    pub fn shutdown(&mut self) {
        self.player.stop();
        self.current = None;
    }

    fn forget(&self, login: &str) {
        self.playback_urls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(login);
    }
}
