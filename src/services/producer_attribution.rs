//! Producer attribution.
//!
//! Walks listening-history tracks that have no producer link yet, asks
//! Genius for the song's producer credits, falls back to Discogs release
//! credits, upserts producer rows, and links them to the track. Tracks
//! with no credit in either source are recorded as unmatched so they are
//! not retried every pass. Followers of a producer are notified when a
//! new track is linked.

use crate::error::AppResult;
use crate::matching::{names_match, split_artist_credit};
use crate::models::{CreditSource, ListeningHistory};
use crate::repositories::{
    ListeningHistoryRepository, NotificationRepository, ProducerRepository,
    UnmatchedTrackRepository,
};
use crate::sources::{DiscogsClient, GeniusClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info, warn};

/// Tracks examined per pass
const TRACK_BATCH: i64 = 100;

/// One producer credit found for a track
#[derive(Debug, Clone)]
struct FoundCredit {
    name: String,
    source: CreditSource,
    external_id: Option<String>,
    image_url: Option<String>,
}

/// Outcome of one attribution pass
#[derive(Debug, Default, Clone, Copy)]
pub struct AttributionSummary {
    pub tracks_processed: usize,
    pub tracks_failed: usize,
    pub tracks_attributed: usize,
    pub tracks_unmatched: usize,
}

/// Links listening-history tracks to producer credit entities
pub struct ProducerAttribution {
    genius: Option<GeniusClient>,
    discogs: Option<DiscogsClient>,
    history_repo: Arc<ListeningHistoryRepository>,
    producer_repo: Arc<ProducerRepository>,
    unmatched_repo: Arc<UnmatchedTrackRepository>,
    notification_repo: Arc<NotificationRepository>,
}

impl ProducerAttribution {
    /// Create a new producer attribution service
    pub fn new(
        genius: Option<GeniusClient>,
        discogs: Option<DiscogsClient>,
        history_repo: Arc<ListeningHistoryRepository>,
        producer_repo: Arc<ProducerRepository>,
        unmatched_repo: Arc<UnmatchedTrackRepository>,
        notification_repo: Arc<NotificationRepository>,
    ) -> Self {
        Self {
            genius,
            discogs,
            history_repo,
            producer_repo,
            unmatched_repo,
            notification_repo,
        }
    }

    /// Run attribution passes forever on the given interval
    pub async fn start(self: Arc<Self>, interval: Duration) {
        let mut ticker = time::interval(interval);
        info!("Producer attribution started, running every {:?}", interval);

        loop {
            ticker.tick().await;

            match self.run_pass().await {
                Ok(summary) => info!(
                    tracks = summary.tracks_processed,
                    failed = summary.tracks_failed,
                    attributed = summary.tracks_attributed,
                    unmatched = summary.tracks_unmatched,
                    "Attribution pass complete"
                ),
                Err(e) => error!("Attribution pass failed: {}", e),
            }
        }
    }

    /// Run one pass over unattributed tracks
    pub async fn run_pass(&self) -> AppResult<AttributionSummary> {
        if self.genius.is_none() && self.discogs.is_none() {
            warn!("Neither Genius nor Discogs configured, skipping attribution pass");
            return Ok(AttributionSummary::default());
        }

        let queue = self.history_repo.find_unattributed(TRACK_BATCH).await?;
        let mut summary = AttributionSummary::default();

        for play in queue {
            match self.attribute_track(&play).await {
                Ok(attributed) => {
                    summary.tracks_processed += 1;
                    if attributed {
                        summary.tracks_attributed += 1;
                    } else {
                        summary.tracks_unmatched += 1;
                    }
                }
                Err(e) => {
                    // Per-item failure: log and move to the next track
                    warn!(
                        track = %play.track_name,
                        artist = %play.artist_name,
                        "Attribution failed: {}",
                        e
                    );
                    summary.tracks_failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Attribute one track; returns whether any producer was linked
    async fn attribute_track(&self, play: &ListeningHistory) -> AppResult<bool> {
        let primary_artist = split_artist_credit(&play.artist_name)
            .into_iter()
            .next()
            .unwrap_or_else(|| play.artist_name.clone());

        let mut credits = Vec::new();

        if let Some(genius) = &self.genius {
            match self
                .genius_credits(genius, &play.track_name, &primary_artist)
                .await
            {
                Ok(found) => credits = found,
                Err(e) => warn!(
                    track = %play.track_name,
                    "Genius lookup failed, falling back: {}",
                    e
                ),
            }
        }

        if credits.is_empty() {
            if let Some(discogs) = &self.discogs {
                match self
                    .discogs_credits(discogs, &play.track_name, &primary_artist)
                    .await
                {
                    Ok(found) => credits = found,
                    Err(e) => warn!(track = %play.track_name, "Discogs lookup failed: {}", e),
                }
            }
        }

        if credits.is_empty() {
            self.unmatched_repo
                .record(
                    &play.source,
                    &play.track_external_id,
                    &play.track_name,
                    &play.artist_name,
                    "no producer credit on Genius or Discogs",
                )
                .await?;
            return Ok(false);
        }

        for credit in credits {
            let producer = self
                .producer_repo
                .upsert_by_name(
                    &credit.name,
                    credit.source.as_str(),
                    credit.external_id.as_deref(),
                    credit.image_url.as_deref(),
                )
                .await?;

            let newly_linked = self
                .producer_repo
                .link_track(
                    producer.id,
                    &play.source,
                    &play.track_external_id,
                    &play.track_name,
                    &play.artist_name,
                )
                .await?;

            if newly_linked {
                self.notify_followers(&producer.id, &producer.name, play)
                    .await;
            }
        }

        Ok(true)
    }

    /// Producer credits from Genius: search, pick the hit whose primary
    /// artist matches, read producer_artists from the full song
    async fn genius_credits(
        &self,
        genius: &GeniusClient,
        track: &str,
        artist: &str,
    ) -> AppResult<Vec<FoundCredit>> {
        let hits = genius.search(&format!("{track} {artist}")).await?;

        let matching = hits
            .iter()
            .find(|hit| names_match(artist, &hit.result.primary_artist.name));

        let hit = match matching {
            Some(hit) => hit,
            None => return Ok(Vec::new()),
        };

        let song = genius.song(hit.result.id).await?;

        Ok(song
            .producer_artists
            .into_iter()
            .map(|producer| FoundCredit {
                name: producer.name,
                source: CreditSource::Genius,
                external_id: Some(producer.id.to_string()),
                image_url: producer.image_url,
            })
            .collect())
    }

    /// Producer credits from Discogs: first release hit, extraartists
    /// filtered to the Producer role
    async fn discogs_credits(
        &self,
        discogs: &DiscogsClient,
        track: &str,
        artist: &str,
    ) -> AppResult<Vec<FoundCredit>> {
        let results = discogs.search_release(track, artist).await?;

        let hit = match results.first() {
            Some(hit) => hit,
            None => return Ok(Vec::new()),
        };

        let release = discogs.release(hit.id).await?;

        Ok(release
            .producer_credits()
            .map(|credit| FoundCredit {
                name: credit.name.clone(),
                source: CreditSource::Discogs,
                external_id: Some(release.id.to_string()),
                image_url: None,
            })
            .collect())
    }

    /// Notify everyone following the producer about the new link.
    /// Notification failures only log; the link itself already stuck.
    async fn notify_followers(
        &self,
        producer_id: &uuid::Uuid,
        producer_name: &str,
        play: &ListeningHistory,
    ) {
        let followers = match self.producer_repo.followers_of(*producer_id).await {
            Ok(followers) => followers,
            Err(e) => {
                warn!(producer = %producer_name, "Follower lookup failed: {}", e);
                return;
            }
        };

        let message = format!(
            "{} produced \"{}\" by {}",
            producer_name, play.track_name, play.artist_name
        );

        for user_id in followers {
            if let Err(e) = self
                .notification_repo
                .create(user_id, Some(*producer_id), &message)
                .await
            {
                warn!(user_id = %user_id, "Notification insert failed: {}", e);
            }
        }
    }
}
