//! glimpse - browse and play Twitch streams from the terminal
//!
//! Lists top streams, searches live channels, keeps favorites and hands the
//! selected stream to a local player.
//!
//! # Modules
//!
//! - `models` - Streams, broadcasters, playback tokens
//! - `api` - Twitch GraphQL client, manifest lookup, favorites live status
//! - `images` - Concurrent image fetcher and cache
//! - `enrich` - Attach cached images to streams
//! - `app` - Navigation state machine
//! - `runtime` - Executes the state machine's commands
//! - `ui` - TUI rendering
//! - `cli` / `commands` - Scriptable subcommands

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod enrich;
pub mod favorites;
pub mod images;
pub mod input;
pub mod models;
pub mod player;
pub mod runtime;
pub mod ui;

// Re-export commonly used types
pub use models::{Broadcaster, ImageBytes, PlaybackToken, Stream};

pub use api::{LiveStatusClient, TwitchClient, TwitchError};
pub use app::{App, Command, Completion, Screen, Source};
pub use config::Config;
pub use favorites::FavoritesStore;
pub use images::ImageCache;
pub use player::{LocalPlayer, MediaPlayer, PlayerType};
pub use runtime::Runtime;
