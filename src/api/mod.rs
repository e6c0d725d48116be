//! API clients for external services
//!
//! - Twitch: private GraphQL API (top streams, search, playback tokens)
//! - Manifest: variant playlist lookup
//! - Favorites: live status of favorited broadcasters

pub mod favorites;
pub mod gql;
pub mod manifest;
pub mod twitch;

pub use favorites::{LiveStatusClient, LiveStatusError};
pub use twitch::{TwitchClient, TwitchError};
