//! Spotify Web API client
//!
//! Only the playback-state endpoint is used. The access token is supplied
//! from configuration; obtaining and refreshing it happens outside this crate.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::SpotifyConfig;
use crate::error::{Error, Result};
use crate::track::PlaybackSnapshot;

use super::{parse_playback_json, PlaybackSource, PLAYER_PATH};

/// User agent sent with every request
const USER_AGENT: &str = concat!("listen-ledger/", env!("CARGO_PKG_VERSION"));

/// Spotify playback client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl SpotifyClient {
    /// Create a client from configuration and a bearer token
    pub fn new(config: &SpotifyConfig, access_token: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout()?)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    /// Full URL of the playback endpoint
    #[must_use]
    pub fn player_url(&self) -> String {
        format!("{}{PLAYER_PATH}", self.base_url)
    }
}

#[async_trait]
impl PlaybackSource for SpotifyClient {
    async fn current_playback(&self) -> Result<Option<PlaybackSnapshot>> {
        let response = self
            .http_client
            .get(self.player_url())
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();

        // Nothing loaded in any player
        if status == StatusCode::NO_CONTENT {
            debug!("No active playback");
            return Ok(None);
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::config("Spotify rejected the access token"));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::other("Spotify rate limit hit"));
        }

        if !status.is_success() {
            return Err(Error::other(format!(
                "Spotify returned HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response.text().await?;
        parse_playback_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_url_uses_configured_base() {
        let config = SpotifyConfig {
            api_base: "http://localhost:8080/v1/".to_string(),
            ..SpotifyConfig::default()
        };
        let client = SpotifyClient::new(&config, "token").unwrap();
        assert_eq!(client.player_url(), "http://localhost:8080/v1/me/player");
    }

    #[test]
    fn test_default_base() {
        let client = SpotifyClient::new(&SpotifyConfig::default(), "token").unwrap();
        assert_eq!(client.player_url(), "https://api.spotify.com/v1/me/player");
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let config = SpotifyConfig {
            request_timeout: "whenever".to_string(),
            ..SpotifyConfig::default()
        };
        assert!(SpotifyClient::new(&config, "token").is_err());
    }

    #[test]
    fn test_user_agent_format() {
        assert!(USER_AGENT.starts_with("listen-ledger/"));
    }
}
