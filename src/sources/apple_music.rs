//! Apple Music API client.
//!
//! Calls authenticate with the developer bearer token plus the user's
//! `Music-User-Token` header. Recent-tracks items are returned as raw
//! JSON values and normalized by [`crate::matching::track_fields`].

use super::{check_status, http_client, parse_error, transport_error, SourceResult};
use crate::config::AppleMusicConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

const SOURCE: &str = "Apple Music";

#[derive(Debug, Deserialize)]
struct RecentTracksResponse {
    #[serde(default)]
    data: Vec<Value>,
}

/// Apple Music API client
#[derive(Debug, Clone)]
pub struct AppleMusicClient {
    http: Client,
    config: AppleMusicConfig,
}

impl AppleMusicClient {
    /// Create a new Apple Music client
    pub fn new(config: AppleMusicConfig) -> Self {
        Self {
            http: http_client(),
            config,
        }
    }

    /// The user's recently played tracks, newest first.
    ///
    /// An invalid or revoked user token surfaces as `Unauthorized`
    /// (Apple answers 403 for those).
    pub async fn recent_tracks(
        &self,
        music_user_token: &str,
        limit: u32,
    ) -> SourceResult<Vec<Value>> {
        let response = self
            .http
            .get(format!(
                "{}/v1/me/recent/played/tracks",
                self.config.api_base
            ))
            .bearer_auth(&self.config.developer_token)
            .header("Music-User-Token", music_user_token)
            .query(&[("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, e))?;

        let response = check_status(response, SOURCE)?;
        let body: RecentTracksResponse =
            response.json().await.map_err(|e| parse_error(SOURCE, e))?;
        Ok(body.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_tracks_deserialize() {
        let json = r#"{
            "data": [
                {
                    "id": "1440881047",
                    "type": "songs",
                    "attributes": {
                        "name": "Mask Off",
                        "artistName": "Future",
                        "albumName": "FUTURE",
                        "durationInMillis": 204600,
                        "genreNames": ["Hip-Hop/Rap"]
                    }
                }
            ]
        }"#;
        let body: RecentTracksResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["attributes"]["artistName"], "Future");
    }

    #[test]
    fn test_recent_tracks_missing_data_defaults_to_empty() {
        let json = r#"{"next": "/v1/me/recent/played/tracks?offset=10"}"#;
        let body: RecentTracksResponse = serde_json::from_str(json).unwrap();
        assert!(body.data.is_empty());
    }
}
