//! GraphQL request bodies for the private Twitch API
//!
//! Two of the three operations are persisted queries: the server already
//! knows the query text and only needs its sha256 fingerprint. Playback
//! tokens are requested with the query text inline.

use serde::Serialize;
use uuid::Uuid;

pub const TOP_STREAMS_OPERATION: &str = "BrowsePage_Popular";
pub const SEARCH_OPERATION: &str = "SearchResultsPage_SearchResults";
pub const PLAYBACK_TOKEN_OPERATION: &str = "PlaybackAccessToken";

const PLAYBACK_TOKEN_QUERY: &str = "query PlaybackAccessToken($login: String!, $isLive: Boolean!, $playerType: String!) { streamPlaybackAccessToken(channelName: $login, params: {platform: \"web\", playerBackend: \"mediaplayer\", playerType: $playerType}) @include(if: $isLive) { value signature } }";

/// Top-level request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlRequest {
    pub operation_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<&'static str>,
    pub variables: Variables,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}

/// Union of the variables used by the three operations
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variables {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_live: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<BrowseOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_type_is_recency: Option<bool>,
    #[serde(rename = "includeIsDJ", skip_serializing_if = "Option::is_none")]
    pub include_is_dj: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseOptions {
    pub include_restricted: Vec<&'static str>,
    pub sort: &'static str,
    pub freeform_tags: Option<Vec<String>>,
    pub tags: Vec<String>,
    #[serde(rename = "recommendations_context")]
    pub recommendations_context: RecommendationsContext,
    #[serde(rename = "requestID")]
    pub request_id: String,
    pub broadcaster_languages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsContext {
    pub platform: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extensions {
    pub persisted_query: PersistedQuery,
}

/// Fingerprint of a server-side query. Hashes come from configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedQuery {
    pub version: u32,
    pub sha256_hash: String,
}

impl Extensions {
    fn persisted(sha256_hash: &str) -> Self {
        Self {
            persisted_query: PersistedQuery {
                version: 1,
                sha256_hash: sha256_hash.to_string(),
            },
        }
    }
}

/// Most-watched live streams, sorted by viewer count
pub fn top_streams(limit: u32, sha256_hash: &str) -> GqlRequest {
    GqlRequest {
        operation_name: TOP_STREAMS_OPERATION,
        query: None,
        variables: Variables {
            image_width: Some(50),
            limit: Some(limit),
            platform_type: Some("all"),
            options: Some(BrowseOptions {
                include_restricted: vec!["SUB_ONLY_LIVE"],
                sort: "VIEWER_COUNT",
                freeform_tags: None,
                tags: Vec::new(),
                recommendations_context: RecommendationsContext { platform: "web" },
                request_id: Uuid::new_v4().simple().to_string(),
                broadcaster_languages: Vec::new(),
            }),
            sort_type_is_recency: Some(false),
            include_is_dj: Some(true),
            ..Variables::default()
        },
        extensions: Some(Extensions::persisted(sha256_hash)),
    }
}

/// Channel search by free text
pub fn search(query: &str, sha256_hash: &str) -> GqlRequest {
    GqlRequest {
        operation_name: SEARCH_OPERATION,
        query: None,
        variables: Variables {
            query: Some(query.to_string()),
            include_is_dj: Some(true),
            ..Variables::default()
        },
        extensions: Some(Extensions::persisted(sha256_hash)),
    }
}

/// Signed playback token for a live channel
pub fn playback_token(login: &str) -> GqlRequest {
    GqlRequest {
        operation_name: PLAYBACK_TOKEN_OPERATION,
        query: Some(PLAYBACK_TOKEN_QUERY),
        variables: Variables {
            is_live: Some(true),
            login: Some(login.to_string()),
            player_type: Some("embed"),
            ..Variables::default()
        },
        extensions: None,
    }
}
