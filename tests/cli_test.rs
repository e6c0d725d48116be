//! CLI Command Tests
//!
//! Command handlers against a mocked Twitch backend. Covers exit codes and
//! input validation.

mod cli_parsing {
    use clap::Parser;
    use glimpse::cli::{Cli, Command, PlayerChoice};

    #[test]
    fn test_no_args_is_tui_mode() {
        let cli = Cli::parse_from(["glimpse"]);
        assert!(!cli.is_cli_mode());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_aliases() {
        assert!(matches!(
            Cli::parse_from(["glimpse", "t"]).command,
            Some(Command::Top(_))
        ));
        assert!(matches!(
            Cli::parse_from(["glimpse", "r", "somebody"]).command,
            Some(Command::Resolve(_))
        ));
        assert!(matches!(
            Cli::parse_from(["glimpse", "p", "somebody"]).command,
            Some(Command::Play(_))
        ));
    }

    #[test]
    fn test_config_flag() {
        let cli = Cli::parse_from(["glimpse", "--config", "/tmp/glimpse.toml", "top"]);
        assert_eq!(cli.config.unwrap().to_str(), Some("/tmp/glimpse.toml"));
    }

    #[test]
    fn test_unknown_player_rejected() {
        assert!(Cli::try_parse_from(["glimpse", "play", "x", "--player", "winamp"]).is_err());
        let cli = Cli::parse_from(["glimpse", "play", "x", "--player", "vlc"]);
        match cli.command {
            Some(Command::Play(cmd)) => assert_eq!(cmd.player, Some(PlayerChoice::Vlc)),
            other => panic!("Expected Play command, got {:?}", other),
        }
    }
}

mod cli_commands {
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    use glimpse::cli::{ExitCode, Output, ResolveCmd, SearchCmd, TopCmd};
    use glimpse::commands::{resolve_cmd, search_cmd, top_cmd};
    use glimpse::config::{Config, TwitchConfig};

    fn config(server: &ServerGuard) -> Config {
        Config {
            twitch: TwitchConfig {
                gql_url: format!("{}/gql", server.url()),
                usher_url: format!("{}/hls", server.url()),
                ..TwitchConfig::default()
            },
            ..Config::default()
        }
    }

    fn quiet_json() -> Output {
        Output {
            json: true,
            quiet: true,
        }
    }

    #[tokio::test]
    async fn test_top_success() {
        let mut server = Server::new_async().await;
        let _gql = server
            .mock("POST", "/gql")
            .match_body(Matcher::PartialJson(json!({ "variables": { "limit": 2 } })))
            .with_status(200)
            .with_body(json!({ "data": { "streams": { "edges": [] } } }).to_string())
            .create_async()
            .await;

        let code = top_cmd(TopCmd { limit: Some(2) }, &config(&server), &quiet_json()).await;
        assert_eq!(code, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_top_zero_limit_is_invalid() {
        let server = Server::new_async().await;
        let code = top_cmd(TopCmd { limit: Some(0) }, &config(&server), &quiet_json()).await;
        assert_eq!(code, ExitCode::InvalidArgs);
    }

    #[tokio::test]
    async fn test_top_server_error_is_network_error() {
        let mut server = Server::new_async().await;
        let _gql = server
            .mock("POST", "/gql")
            .with_status(503)
            .create_async()
            .await;

        let code = top_cmd(TopCmd { limit: None }, &config(&server), &quiet_json()).await;
        assert_eq!(code, ExitCode::NetworkError);
    }

    #[tokio::test]
    async fn test_search_blank_query_is_invalid() {
        let server = Server::new_async().await;
        let cmd = SearchCmd {
            query: "   ".into(),
        };
        assert_eq!(
            search_cmd(cmd, &config(&server), &quiet_json()).await,
            ExitCode::InvalidArgs
        );
    }

    #[tokio::test]
    async fn test_resolve_without_rendition_is_unavailable() {
        let mut server = Server::new_async().await;
        let _token = server
            .mock("POST", "/gql")
            .with_status(200)
            .with_body(
                json!({ "data": { "streamPlaybackAccessToken": { "value": "v", "signature": "s" } } })
                    .to_string(),
            )
            .create_async()
            .await;
        let _usher = server
            .mock("GET", "/hls/somebody.m3u8")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("#EXTM3U\n#EXT-X-STREAM-INF:RESOLUTION=1920x1080\nhttps://cdn/source.m3u8")
            .create_async()
            .await;

        let cmd = ResolveCmd {
            login: "somebody".into(),
            rendition: None,
        };
        assert_eq!(
            resolve_cmd(cmd, &config(&server), &quiet_json()).await,
            ExitCode::StreamUnavailable
        );
    }

    #[tokio::test]
    async fn test_resolve_with_rendition_override() {
        let mut server = Server::new_async().await;
        let _token = server
            .mock("POST", "/gql")
            .with_status(200)
            .with_body(
                json!({ "data": { "streamPlaybackAccessToken": { "value": "v", "signature": "s" } } })
                    .to_string(),
            )
            .create_async()
            .await;
        let _usher = server
            .mock("GET", "/hls/somebody.m3u8")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("#EXTM3U\n#EXT-X-STREAM-INF:RESOLUTION=1920x1080\nhttps://cdn/source.m3u8")
            .create_async()
            .await;

        let cmd = ResolveCmd {
            login: "somebody".into(),
            rendition: Some("RESOLUTION=1920x1080".into()),
        };
        assert_eq!(
            resolve_cmd(cmd, &config(&server), &quiet_json()).await,
            ExitCode::Success
        );
    }
}
