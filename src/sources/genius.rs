//! Genius API client.
//!
//! The primary producer-credit source: search for the song, then read
//! `producer_artists` from the full song payload.

use super::{check_status, http_client, parse_error, transport_error, SourceResult};
use crate::config::GeniusConfig;
use reqwest::Client;
use serde::Deserialize;

const SOURCE: &str = "Genius";

/// Artist reference as Genius embeds it in songs and hits
#[derive(Debug, Clone, Deserialize)]
pub struct GeniusArtist {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Song reference inside a search hit
#[derive(Debug, Clone, Deserialize)]
pub struct GeniusSongRef {
    pub id: i64,
    pub title: String,
    pub primary_artist: GeniusArtist,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeniusHit {
    pub result: GeniusSongRef,
}

/// Full song payload with producer credits
#[derive(Debug, Clone, Deserialize)]
pub struct GeniusSong {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub producer_artists: Vec<GeniusArtist>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    hits: Vec<GeniusHit>,
}

#[derive(Debug, Deserialize)]
struct SongResponse {
    response: SongBody,
}

#[derive(Debug, Deserialize)]
struct SongBody {
    song: GeniusSong,
}

/// Genius API client
#[derive(Debug, Clone)]
pub struct GeniusClient {
    http: Client,
    config: GeniusConfig,
}

impl GeniusClient {
    /// Create a new Genius client
    pub fn new(config: GeniusConfig) -> Self {
        Self {
            http: http_client(),
            config,
        }
    }

    /// Search songs by free-text query
    pub async fn search(&self, query: &str) -> SourceResult<Vec<GeniusHit>> {
        let response = self
            .http
            .get(format!("{}/search", self.config.api_base))
            .bearer_auth(&self.config.access_token)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, e))?;

        let response = check_status(response, SOURCE)?;
        let body: SearchResponse = response.json().await.map_err(|e| parse_error(SOURCE, e))?;
        Ok(body.response.hits)
    }

    /// Full song payload including producer credits
    pub async fn song(&self, id: i64) -> SourceResult<GeniusSong> {
        let response = self
            .http
            .get(format!("{}/songs/{}", self.config.api_base, id))
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, e))?;

        let response = check_status(response, SOURCE)?;
        let body: SongResponse = response.json().await.map_err(|e| parse_error(SOURCE, e))?;
        Ok(body.response.song)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_deserialize() {
        let json = r#"{
            "response": {
                "hits": [
                    {
                        "result": {
                            "id": 3039923,
                            "title": "Mask Off",
                            "primary_artist": {"id": 2197, "name": "Future"}
                        }
                    }
                ]
            }
        }"#;
        let body: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.response.hits.len(), 1);
        assert_eq!(body.response.hits[0].result.primary_artist.name, "Future");
    }

    #[test]
    fn test_song_deserialize_with_producers() {
        let json = r#"{
            "response": {
                "song": {
                    "id": 3039923,
                    "title": "Mask Off",
                    "producer_artists": [
                        {"id": 158762, "name": "Metro Boomin", "image_url": "https://images.genius.com/metro.jpg"}
                    ]
                }
            }
        }"#;
        let body: SongResponse = serde_json::from_str(json).unwrap();
        let song = body.response.song;
        assert_eq!(song.producer_artists.len(), 1);
        assert_eq!(song.producer_artists[0].name, "Metro Boomin");
    }

    #[test]
    fn test_song_without_producers_defaults_to_empty() {
        let json = r#"{"response": {"song": {"id": 1, "title": "Untitled"}}}"#;
        let body: SongResponse = serde_json::from_str(json).unwrap();
        assert!(body.response.song.producer_artists.is_empty());
    }

    #[test]
    fn test_empty_search() {
        let json = r#"{"response": {"hits": []}}"#;
        let body: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(body.response.hits.is_empty());
    }
}
