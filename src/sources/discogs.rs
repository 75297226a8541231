//! Discogs API client.
//!
//! Fallback producer-credit source: search for the release, then filter
//! its `extraartists` credits to the Producer role.

use super::{check_status, http_client, parse_error, transport_error, SourceResult};
use crate::config::DiscogsConfig;
use reqwest::Client;
use serde::Deserialize;

const SOURCE: &str = "Discogs";

/// One row of the release search results
#[derive(Debug, Clone, Deserialize)]
pub struct DiscogsSearchResult {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<DiscogsSearchResult>,
}

/// Credit row on a release
#[derive(Debug, Clone, Deserialize)]
pub struct DiscogsCredit {
    pub name: String,
    #[serde(default)]
    pub role: String,
}

impl DiscogsCredit {
    /// Whether this credit is a production credit
    pub fn is_producer(&self) -> bool {
        self.role.to_lowercase().contains("producer")
    }
}

/// Release payload, trimmed to the credits we read
#[derive(Debug, Clone, Deserialize)]
pub struct DiscogsRelease {
    pub id: i64,
    #[serde(default)]
    pub extraartists: Vec<DiscogsCredit>,
}

impl DiscogsRelease {
    /// Credits with a producer role
    pub fn producer_credits(&self) -> impl Iterator<Item = &DiscogsCredit> {
        self.extraartists.iter().filter(|c| c.is_producer())
    }
}

/// Discogs API client
#[derive(Debug, Clone)]
pub struct DiscogsClient {
    http: Client,
    config: DiscogsConfig,
}

impl DiscogsClient {
    /// Create a new Discogs client
    pub fn new(config: DiscogsConfig) -> Self {
        Self {
            http: http_client(),
            config,
        }
    }

    /// Search releases by track and artist
    pub async fn search_release(
        &self,
        track: &str,
        artist: &str,
    ) -> SourceResult<Vec<DiscogsSearchResult>> {
        let response = self
            .http
            .get(format!("{}/database/search", self.config.api_base))
            .query(&[
                ("track", track),
                ("artist", artist),
                ("type", "release"),
                ("token", &self.config.token),
            ])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, e))?;

        let response = check_status(response, SOURCE)?;
        let body: SearchResponse = response.json().await.map_err(|e| parse_error(SOURCE, e))?;
        Ok(body.results)
    }

    /// Full release payload
    pub async fn release(&self, id: i64) -> SourceResult<DiscogsRelease> {
        let response = self
            .http
            .get(format!("{}/releases/{}", self.config.api_base, id))
            .query(&[("token", &self.config.token)])
            .send()
            .await
            .map_err(|e| transport_error(SOURCE, e))?;

        let response = check_status(response, SOURCE)?;
        response.json().await.map_err(|e| parse_error(SOURCE, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_deserialize() {
        let json = r#"{
            "results": [
                {"id": 9817143, "title": "Future - FUTURE"}
            ]
        }"#;
        let body: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.results[0].id, 9817143);
    }

    #[test]
    fn test_release_producer_credits() {
        let json = r#"{
            "id": 9817143,
            "extraartists": [
                {"name": "Metro Boomin", "role": "Producer"},
                {"name": "Seth Firkins", "role": "Recorded By"},
                {"name": "Southside", "role": "Co-producer"}
            ]
        }"#;
        let release: DiscogsRelease = serde_json::from_str(json).unwrap();
        let producers: Vec<&str> = release
            .producer_credits()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(producers, vec!["Metro Boomin", "Southside"]);
    }

    #[test]
    fn test_release_without_credits() {
        let json = r#"{"id": 1}"#;
        let release: DiscogsRelease = serde_json::from_str(json).unwrap();
        assert_eq!(release.producer_credits().count(), 0);
    }
}
