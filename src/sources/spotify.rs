//! Spotify Web API client.
//!
//! Covers the endpoints the fetch and image-cache passes need: the
//! refresh-token grant, recently-played history, artist search, and the
//! user's playlists. History items are returned as raw JSON values and
//! normalized by [`crate::matching::track_fields`].

use super::{check_status, http_client, parse_error, transport_error, SourceResult};
use crate::config::SpotifyConfig;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

const SOURCE: &str = "Spotify";

/// Token triple returned by the accounts service.
///
/// Spotify omits `refresh_token` when the old one stays valid.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

/// Artist as returned by the search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

impl SpotifyArtist {
    /// Largest image URL, when the artist has any
    pub fn image_url(&self) -> Option<&str> {
        self.images.first().map(|i| i.url.as_str())
    }

    /// First listed genre
    pub fn primary_genre(&self) -> &str {
        self.genres.first().map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
struct ArtistSearchResponse {
    artists: ArtistPage,
}

#[derive(Debug, Deserialize)]
struct ArtistPage {
    #[serde(default)]
    items: Vec<SpotifyArtist>,
}

/// Playlist as returned by `/v1/me/playlists`
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracks: PlaylistTracksRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistTracksRef {
    #[serde(default)]
    pub total: i64,
}

#[derive(Debug, Deserialize)]
struct PlaylistsResponse {
    #[serde(default)]
    items: Vec<SpotifyPlaylist>,
}

#[derive(Debug, Deserialize)]
struct RecentlyPlayedResponse {
    #[serde(default)]
    items: Vec<Value>,
}

/// Spotify Web API client
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    config: SpotifyConfig,
}

impl SpotifyClient {
    /// Create a new Spotify client
    pub fn new(config: SpotifyConfig) -> Self {
        Self {
            http: http_client(),
            config,
        }
    }

    /// Exchange a refresh token for a fresh access token
    pub async fn refresh_access_token(&self, refresh_token: &str) -> SourceResult<TokenResponse> {
        let response = self
            .http
            .post(format!("{}/api/token", self.config.accounts_base))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, e))?;

        let response = check_status(response, SOURCE)?;
        response.json().await.map_err(|e| parse_error(SOURCE, e))
    }

    /// Obtain an application token via the client-credentials grant.
    /// Enough for the search endpoints used by the image-cache pass.
    pub async fn client_credentials_token(&self) -> SourceResult<TokenResponse> {
        let response = self
            .http
            .post(format!("{}/api/token", self.config.accounts_base))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, e))?;

        let response = check_status(response, SOURCE)?;
        response.json().await.map_err(|e| parse_error(SOURCE, e))
    }

    /// Play events after the given cursor, newest-first as Spotify returns
    /// them. The cursor is sent as a millisecond epoch `after` parameter.
    pub async fn recently_played(
        &self,
        access_token: &str,
        after: Option<NaiveDateTime>,
        limit: u32,
    ) -> SourceResult<Vec<Value>> {
        let mut query: Vec<(&str, String)> = vec![("limit", limit.to_string())];
        if let Some(after) = after {
            query.push(("after", after.and_utc().timestamp_millis().to_string()));
        }

        let response = self
            .http
            .get(format!(
                "{}/v1/me/player/recently-played",
                self.config.api_base
            ))
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, e))?;

        let response = check_status(response, SOURCE)?;
        let body: RecentlyPlayedResponse =
            response.json().await.map_err(|e| parse_error(SOURCE, e))?;
        Ok(body.items)
    }

    /// Search artists by name
    pub async fn search_artists(
        &self,
        access_token: &str,
        name: &str,
        limit: u32,
    ) -> SourceResult<Vec<SpotifyArtist>> {
        let response = self
            .http
            .get(format!("{}/v1/search", self.config.api_base))
            .bearer_auth(access_token)
            .query(&[
                ("q", name),
                ("type", "artist"),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, e))?;

        let response = check_status(response, SOURCE)?;
        let body: ArtistSearchResponse =
            response.json().await.map_err(|e| parse_error(SOURCE, e))?;
        Ok(body.artists.items)
    }

    /// The user's playlists
    pub async fn current_user_playlists(
        &self,
        access_token: &str,
        limit: u32,
    ) -> SourceResult<Vec<SpotifyPlaylist>> {
        let response = self
            .http
            .get(format!("{}/v1/me/playlists", self.config.api_base))
            .bearer_auth(access_token)
            .query(&[("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, e))?;

        let response = check_status(response, SOURCE)?;
        let body: PlaylistsResponse =
            response.json().await.map_err(|e| parse_error(SOURCE, e))?;
        Ok(body.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_deserialize() {
        let json = r#"{
            "access_token": "NgCXRK...MzYjw",
            "token_type": "Bearer",
            "scope": "user-read-recently-played",
            "expires_in": 3600,
            "refresh_token": "NgAagA...Um_SHo"
        }"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "NgCXRK...MzYjw");
        assert_eq!(token.expires_in, 3600);
        assert_eq!(token.refresh_token.as_deref(), Some("NgAagA...Um_SHo"));
    }

    #[test]
    fn test_token_response_without_refresh_token() {
        let json = r#"{"access_token": "abc", "expires_in": 3600}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_artist_search_deserialize() {
        let json = r#"{
            "artists": {
                "items": [
                    {
                        "id": "0iEtIxbK0KxaSlF7G42ZOp",
                        "name": "Metro Boomin",
                        "genres": ["rap", "trap"],
                        "images": [
                            {"url": "https://i.scdn.co/image/big", "width": 640},
                            {"url": "https://i.scdn.co/image/small", "width": 160}
                        ]
                    }
                ]
            }
        }"#;
        let body: ArtistSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.artists.items.len(), 1);
        let artist = &body.artists.items[0];
        assert_eq!(artist.name, "Metro Boomin");
        assert_eq!(artist.primary_genre(), "rap");
        assert_eq!(artist.image_url(), Some("https://i.scdn.co/image/big"));
    }

    #[test]
    fn test_artist_without_images_or_genres() {
        let json = r#"{"artists": {"items": [{"id": "x", "name": "Obscure Act"}]}}"#;
        let body: ArtistSearchResponse = serde_json::from_str(json).unwrap();
        let artist = &body.artists.items[0];
        assert!(artist.image_url().is_none());
        assert_eq!(artist.primary_genre(), "");
    }

    #[test]
    fn test_playlists_deserialize() {
        let json = r#"{
            "items": [
                {"id": "37i9dQ", "name": "Heavy Rotation", "tracks": {"total": 42}}
            ]
        }"#;
        let body: PlaylistsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.items[0].tracks.total, 42);
    }

    #[test]
    fn test_recently_played_empty_page() {
        let json = r#"{"items": []}"#;
        let body: RecentlyPlayedResponse = serde_json::from_str(json).unwrap();
        assert!(body.items.is_empty());
    }
}
