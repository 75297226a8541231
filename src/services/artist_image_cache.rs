//! Artist image caching.
//!
//! The `cache-artist-images` pass. Collects distinct artist credits from
//! listening history that have no cached row yet, splits each credit into
//! individual act names, resolves every name through Spotify artist
//! search, and caches the result. A candidate is accepted only on a
//! case-insensitive exact match or an edit-distance similarity of at
//! least 85 percent; everything else is recorded as a miss so the lookup
//! is not repeated on the next pass.

use crate::error::{AppError, AppResult};
use crate::matching::{best_match, split_artist_credit};
use crate::models::ArtistImage;
use crate::repositories::{ArtistImageRepository, ListeningHistoryRepository};
use crate::sources::spotify::SpotifyArtist;
use crate::sources::{SourceError, SpotifyClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info, warn};

/// Credits examined per pass
const CREDIT_BATCH: i64 = 200;

/// Candidates requested per artist search
const SEARCH_LIMIT: u32 = 10;

/// Outcome of one cache pass
#[derive(Debug, Default, Clone, Copy)]
pub struct CachePassSummary {
    pub credits_processed: usize,
    pub credits_failed: usize,
    pub artists_resolved: usize,
    pub artists_missed: usize,
}

/// Resolves and caches artist images through the Spotify search API
pub struct ArtistImageCache {
    spotify: Option<SpotifyClient>,
    history_repo: Arc<ListeningHistoryRepository>,
    image_repo: Arc<ArtistImageRepository>,
}

impl ArtistImageCache {
    /// Create a new artist image cache service
    pub fn new(
        spotify: Option<SpotifyClient>,
        history_repo: Arc<ListeningHistoryRepository>,
        image_repo: Arc<ArtistImageRepository>,
    ) -> Self {
        Self {
            spotify,
            history_repo,
            image_repo,
        }
    }

    /// Run cache passes forever on the given interval
    pub async fn start(self: Arc<Self>, interval: Duration) {
        let mut ticker = time::interval(interval);
        info!("Artist image cache started, running every {:?}", interval);

        loop {
            ticker.tick().await;

            match self.run_pass().await {
                Ok(summary) => info!(
                    credits = summary.credits_processed,
                    failed = summary.credits_failed,
                    resolved = summary.artists_resolved,
                    missed = summary.artists_missed,
                    "Image cache pass complete"
                ),
                Err(e) => error!("Image cache pass failed: {}", e),
            }
        }
    }

    /// Run one cache pass over uncached credits
    pub async fn run_pass(&self) -> AppResult<CachePassSummary> {
        let client = match &self.spotify {
            Some(client) => client,
            None => {
                warn!("Spotify credentials not configured, skipping image cache pass");
                return Ok(CachePassSummary::default());
            }
        };

        // Search works with an application token; no user involved here
        let token = client.client_credentials_token().await?.access_token;

        let credits = self
            .history_repo
            .distinct_uncached_artist_names(CREDIT_BATCH)
            .await?;

        let mut summary = CachePassSummary::default();

        for credit in credits {
            match self.cache_credit(client, &token, &credit).await {
                Ok((resolved, missed)) => {
                    summary.credits_processed += 1;
                    summary.artists_resolved += resolved;
                    summary.artists_missed += missed;
                }
                Err(e) => {
                    // Per-item failure: log and continue with the next credit
                    warn!(credit = %credit, "Image lookup failed: {}", e);
                    summary.credits_failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Resolve every act in one credit and mark the credit itself checked
    async fn cache_credit(
        &self,
        client: &SpotifyClient,
        token: &str,
        credit: &str,
    ) -> AppResult<(usize, usize)> {
        let names = split_artist_credit(credit);
        if names.is_empty() {
            return Err(AppError::Validation(format!("Empty artist credit: {credit:?}")));
        }

        let mut lead: Option<ArtistImage> = None;
        let mut resolved = 0;
        let mut missed = 0;

        for name in &names {
            let row = match self.image_repo.find_by_name(name).await? {
                Some(existing) => existing,
                None => {
                    let row = match self.resolve_artist(client, token, name).await? {
                        Some(artist) => {
                            resolved += 1;
                            self.image_repo
                                .upsert(
                                    name,
                                    Some(&artist.id),
                                    artist.image_url(),
                                    artist.primary_genre(),
                                )
                                .await?
                        }
                        None => {
                            missed += 1;
                            self.image_repo.upsert(name, None, None, "").await?
                        }
                    };
                    row
                }
            };

            if lead.is_none() && row.is_resolved() {
                lead = Some(row);
            }
        }

        // Multi-artist credits get their own row carrying the lead act's
        // image, so the credit stops showing up as uncached
        let credit_is_single = names.len() == 1 && names[0].eq_ignore_ascii_case(credit.trim());
        if !credit_is_single {
            match &lead {
                Some(lead_row) => {
                    self.image_repo
                        .upsert(
                            credit,
                            lead_row.spotify_artist_id.as_deref(),
                            lead_row.image_url.as_deref(),
                            &lead_row.genre,
                        )
                        .await?;
                }
                None => {
                    self.image_repo.upsert(credit, None, None, "").await?;
                }
            }
        }

        // Spotify play rows ingest without a genre; fill from the lead act
        if let Some(lead_row) = &lead {
            if !lead_row.genre.is_empty() {
                self.history_repo
                    .fill_missing_genre(credit, &lead_row.genre)
                    .await?;
            }
        }

        Ok((resolved, missed))
    }

    /// Search Spotify for one act name and pick the accepted candidate
    async fn resolve_artist(
        &self,
        client: &SpotifyClient,
        token: &str,
        name: &str,
    ) -> Result<Option<SpotifyArtist>, SourceError> {
        let candidates = client.search_artists(token, name, SEARCH_LIMIT).await?;
        let candidate_names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();

        Ok(best_match(name, &candidate_names).map(|(idx, _)| candidates[idx].clone()))
    }
}
