//! Listening-history polling.
//!
//! One polling run walks every user with linked credentials for a source,
//! pulls plays newer than the stored cursor, normalizes the items, and
//! inserts them idempotently. All rows from one run share a fetch_session
//! id. A failing user is logged and skipped so one expired token cannot
//! abort the run.

use crate::error::{AppError, AppResult};
use crate::matching::PlayedTrack;
use crate::models::{PlaySource, User};
use crate::repositories::{
    ListeningHistoryRepository, NewPlay, PlaylistRepository, UserRepository,
};
use crate::sources::{AppleMusicClient, SourceError, SpotifyClient};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Page size requested from both source APIs
const FETCH_LIMIT: u32 = 50;

/// Refresh the Spotify token when less than this many seconds remain
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Outcome of one polling run
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchSummary {
    pub users_processed: usize,
    pub users_failed: usize,
    pub plays_inserted: usize,
}

/// Polls Spotify and Apple Music for new listening history
pub struct HistoryFetcher {
    spotify: Option<SpotifyClient>,
    apple_music: Option<AppleMusicClient>,
    user_repo: Arc<UserRepository>,
    history_repo: Arc<ListeningHistoryRepository>,
    playlist_repo: Arc<PlaylistRepository>,
}

impl HistoryFetcher {
    /// Create a new history fetcher
    pub fn new(
        spotify: Option<SpotifyClient>,
        apple_music: Option<AppleMusicClient>,
        user_repo: Arc<UserRepository>,
        history_repo: Arc<ListeningHistoryRepository>,
        playlist_repo: Arc<PlaylistRepository>,
    ) -> Self {
        Self {
            spotify,
            apple_music,
            user_repo,
            history_repo,
            playlist_repo,
        }
    }

    /// Run both source passes forever on the given interval.
    /// A pass completes before the next tick is awaited, so runs
    /// cannot overlap within the process.
    pub async fn start(self: Arc<Self>, interval: Duration) {
        let mut ticker = time::interval(interval);
        info!("History fetcher started, polling every {:?}", interval);

        loop {
            ticker.tick().await;

            // The sources are independent, poll them concurrently
            let (spotify_result, apple_result) = futures::future::join(
                self.run_spotify_pass(None),
                self.run_apple_pass(None),
            )
            .await;

            match spotify_result {
                Ok(summary) => log_summary("spotify", summary),
                Err(e) => error!("Spotify fetch pass failed: {}", e),
            }
            match apple_result {
                Ok(summary) => log_summary("apple_music", summary),
                Err(e) => error!("Apple Music fetch pass failed: {}", e),
            }
        }
    }

    /// Fetch Spotify history for every linked user (or just one)
    pub async fn run_spotify_pass(&self, only_user: Option<Uuid>) -> AppResult<FetchSummary> {
        if self.spotify.is_none() {
            warn!("Spotify credentials not configured, skipping fetch pass");
            return Ok(FetchSummary::default());
        }

        let users = self.linked_users(PlaySource::Spotify, only_user).await?;
        let mut summary = FetchSummary::default();

        for user in users {
            match self.fetch_spotify_for_user(&user).await {
                Ok(inserted) => {
                    summary.users_processed += 1;
                    summary.plays_inserted += inserted;
                }
                Err(e) => {
                    // One user's failure must not abort the batch
                    warn!(user_id = %user.id, "Spotify fetch failed: {}", e);
                    summary.users_failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Fetch Apple Music history for every linked user (or just one)
    pub async fn run_apple_pass(&self, only_user: Option<Uuid>) -> AppResult<FetchSummary> {
        if self.apple_music.is_none() {
            warn!("Apple Music credentials not configured, skipping fetch pass");
            return Ok(FetchSummary::default());
        }

        let users = self.linked_users(PlaySource::AppleMusic, only_user).await?;
        let mut summary = FetchSummary::default();

        for user in users {
            match self.fetch_apple_for_user(&user).await {
                Ok(inserted) => {
                    summary.users_processed += 1;
                    summary.plays_inserted += inserted;
                }
                Err(e) => {
                    warn!(user_id = %user.id, "Apple Music fetch failed: {}", e);
                    summary.users_failed += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn linked_users(
        &self,
        source: PlaySource,
        only_user: Option<Uuid>,
    ) -> AppResult<Vec<User>> {
        let users = match source {
            PlaySource::Spotify => self.user_repo.find_with_spotify_tokens().await?,
            PlaySource::AppleMusic => self.user_repo.find_with_apple_tokens().await?,
        };

        Ok(match only_user {
            Some(id) => users.into_iter().filter(|u| u.id == id).collect(),
            None => users,
        })
    }

    async fn fetch_spotify_for_user(&self, user: &User) -> AppResult<usize> {
        let client = self
            .spotify
            .as_ref()
            .ok_or(SourceError::Disabled("Spotify"))?;

        let mut access_token = self.ensure_spotify_token(client, user).await?;

        let cursor = match user.spotify_cursor {
            Some(cursor) => Some(cursor),
            None => {
                self.history_repo
                    .latest_played_at(user.id, PlaySource::Spotify.as_str())
                    .await?
            }
        };

        // Token may have gone stale between the expiry check and the call;
        // refresh once on 401 and retry, per the source error contract.
        let items = match client
            .recently_played(&access_token, cursor, FETCH_LIMIT)
            .await
        {
            Ok(items) => items,
            Err(e) if e.is_unauthorized() => {
                access_token = self.refresh_spotify_token(client, user).await?;
                client
                    .recently_played(&access_token, cursor, FETCH_LIMIT)
                    .await?
            }
            Err(e) => return Err(e.into()),
        };

        let session = Uuid::new_v4();
        let mut inserted = 0;
        let mut newest: Option<NaiveDateTime> = cursor;

        for item in &items {
            let play = PlayedTrack::from_spotify_item(item);
            if !play.is_usable() {
                warn!(user_id = %user.id, "Skipping malformed Spotify play item");
                continue;
            }
            if self
                .store_play(user.id, PlaySource::Spotify, &play, session)
                .await?
            {
                inserted += 1;
            }
            if let Some(played_at) = play.played_at {
                newest = Some(newest.map_or(played_at, |n| n.max(played_at)));
            }
        }

        if let Some(newest) = newest {
            if Some(newest) != user.spotify_cursor {
                self.user_repo.update_spotify_cursor(user.id, newest).await?;
            }
        }

        self.mirror_playlists(client, &access_token, user).await;

        info!(
            user_id = %user.id,
            session = %session,
            fetched = items.len(),
            inserted,
            "Spotify history fetched"
        );
        Ok(inserted)
    }

    async fn fetch_apple_for_user(&self, user: &User) -> AppResult<usize> {
        let client = self
            .apple_music
            .as_ref()
            .ok_or(SourceError::Disabled("Apple Music"))?;

        let user_token = user
            .apple_music_user_token
            .as_deref()
            .ok_or_else(|| AppError::Validation("User has no Apple Music token".to_string()))?;

        let items = client.recent_tracks(user_token, FETCH_LIMIT).await?;

        let session = Uuid::new_v4();
        let mut inserted = 0;
        let mut newest: Option<NaiveDateTime> = user.apple_cursor;

        for item in &items {
            let play = PlayedTrack::from_apple_item(item);
            if !play.is_usable() {
                warn!(user_id = %user.id, "Skipping malformed Apple Music play item");
                continue;
            }

            // Apple only reports history since the cursor implicitly; rows
            // older than the cursor are duplicates of an earlier run.
            if let (Some(cursor), Some(played_at)) = (user.apple_cursor, play.played_at) {
                if played_at <= cursor {
                    continue;
                }
            }

            if self
                .store_play(user.id, PlaySource::AppleMusic, &play, session)
                .await?
            {
                inserted += 1;
            }
            if let Some(played_at) = play.played_at {
                newest = Some(newest.map_or(played_at, |n| n.max(played_at)));
            }
        }

        if let Some(newest) = newest {
            if Some(newest) != user.apple_cursor {
                self.user_repo.update_apple_cursor(user.id, newest).await?;
            }
        }

        info!(
            user_id = %user.id,
            session = %session,
            fetched = items.len(),
            inserted,
            "Apple Music history fetched"
        );
        Ok(inserted)
    }

    async fn store_play(
        &self,
        user_id: Uuid,
        source: PlaySource,
        play: &PlayedTrack,
        session: Uuid,
    ) -> AppResult<bool> {
        let played_at = play
            .played_at
            .unwrap_or_else(|| chrono::Utc::now().naive_utc());

        let new_play = NewPlay {
            user_id,
            source: source.as_str().to_string(),
            track_external_id: play.external_id.clone(),
            track_name: play.name.clone(),
            artist_name: play.artist_credit.clone(),
            album_name: play.album.clone(),
            genre: play.genre.clone(),
            duration_ms: play.duration_ms,
            artwork_url: play.artwork_url.clone(),
            played_at,
            fetch_session: session,
        };

        Ok(self.history_repo.insert_play(&new_play).await?)
    }

    /// Valid access token for the user, refreshing when missing or about
    /// to expire
    async fn ensure_spotify_token(
        &self,
        client: &SpotifyClient,
        user: &User,
    ) -> AppResult<String> {
        let expiring = user
            .spotify_token_expires_at
            .map(|at| {
                (at - chrono::Utc::now().naive_utc()).num_seconds() < TOKEN_REFRESH_MARGIN_SECS
            })
            .unwrap_or(true);

        match (&user.spotify_access_token, expiring) {
            (Some(token), false) => Ok(token.clone()),
            _ => self.refresh_spotify_token(client, user).await,
        }
    }

    async fn refresh_spotify_token(
        &self,
        client: &SpotifyClient,
        user: &User,
    ) -> AppResult<String> {
        let refresh_token = user
            .spotify_refresh_token
            .as_deref()
            .ok_or_else(|| AppError::Validation("User has no Spotify refresh token".to_string()))?;

        let token = client.refresh_access_token(refresh_token).await?;
        let expires_at =
            chrono::Utc::now().naive_utc() + chrono::Duration::seconds(token.expires_in);

        self.user_repo
            .update_spotify_tokens(
                user.id,
                &token.access_token,
                token.refresh_token.as_deref().unwrap_or(refresh_token),
                expires_at,
            )
            .await?;

        info!(user_id = %user.id, "Spotify access token refreshed");
        Ok(token.access_token)
    }

    /// Mirror the user's Spotify playlists. Failure here never fails the
    /// history fetch; the mirror is best effort.
    async fn mirror_playlists(&self, client: &SpotifyClient, access_token: &str, user: &User) {
        let playlists = match client.current_user_playlists(access_token, FETCH_LIMIT).await {
            Ok(playlists) => playlists,
            Err(e) => {
                warn!(user_id = %user.id, "Playlist mirror failed: {}", e);
                return;
            }
        };

        for playlist in playlists {
            if let Err(e) = self
                .playlist_repo
                .upsert(
                    user.id,
                    PlaySource::Spotify.as_str(),
                    &playlist.id,
                    &playlist.name,
                    playlist.tracks.total as i32,
                )
                .await
            {
                warn!(user_id = %user.id, playlist = %playlist.id, "Playlist upsert failed: {}", e);
            }
        }
    }
}

fn log_summary(source: &str, summary: FetchSummary) {
    info!(
        source,
        users = summary.users_processed,
        failed = summary.users_failed,
        inserted = summary.plays_inserted,
        "Fetch pass complete"
    );
}

/// Extract a usable play from a raw item for tests and tooling
pub fn normalize_item(source: PlaySource, item: &Value) -> PlayedTrack {
    match source {
        PlaySource::Spotify => PlayedTrack::from_spotify_item(item),
        PlaySource::AppleMusic => PlayedTrack::from_apple_item(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_item_dispatches_by_source() {
        let spotify = json!({
            "played_at": "2024-03-01T12:30:00Z",
            "track": {"id": "abc", "name": "Song", "duration_ms": 1000, "artists": [{"name": "A"}], "album": {"name": "LP", "images": []}}
        });
        let apple = json!({
            "id": "123",
            "attributes": {"name": "Song", "artistName": "A", "albumName": "LP", "durationInMillis": 1000, "genreNames": ["Pop"]}
        });

        let s = normalize_item(PlaySource::Spotify, &spotify);
        assert_eq!(s.external_id, "abc");
        assert!(s.played_at.is_some());

        let a = normalize_item(PlaySource::AppleMusic, &apple);
        assert_eq!(a.external_id, "123");
        assert_eq!(a.genre, "Pop");
    }

    #[test]
    fn test_fetch_summary_default() {
        let summary = FetchSummary::default();
        assert_eq!(summary.users_processed, 0);
        assert_eq!(summary.plays_inserted, 0);
    }
}
