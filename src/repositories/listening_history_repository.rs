use crate::models::ListeningHistory;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Result as SqlxResult};
use uuid::Uuid;

const HISTORY_COLUMNS: &str = "id, user_id, source, track_external_id, track_name, artist_name, \
     album_name, genre, duration_ms, artwork_url, played_at, fetch_session, created_at";

/// Insert payload for one play event
#[derive(Debug, Clone)]
pub struct NewPlay {
    pub user_id: Uuid,
    pub source: String,
    pub track_external_id: String,
    pub track_name: String,
    pub artist_name: String,
    pub album_name: String,
    pub genre: String,
    pub duration_ms: i64,
    pub artwork_url: Option<String>,
    pub played_at: NaiveDateTime,
    pub fetch_session: Uuid,
}

/// Play count per genre for one user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GenreCount {
    pub genre: String,
    pub play_count: i64,
}

/// Repository for listening-history data access
pub struct ListeningHistoryRepository {
    pool: PgPool,
}

impl ListeningHistoryRepository {
    /// Create a new ListeningHistoryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a play event. Re-polled events hit the uniqueness constraint
    /// and are skipped; returns whether a row was actually inserted.
    pub async fn insert_play(&self, play: &NewPlay) -> SqlxResult<bool> {
        let result = sqlx::query(
            "INSERT INTO listening_history \
             (user_id, source, track_external_id, track_name, artist_name, album_name, \
              genre, duration_ms, artwork_url, played_at, fetch_session) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (user_id, source, track_external_id, played_at) DO NOTHING",
        )
        .bind(play.user_id)
        .bind(&play.source)
        .bind(&play.track_external_id)
        .bind(&play.track_name)
        .bind(&play.artist_name)
        .bind(&play.album_name)
        .bind(&play.genre)
        .bind(play.duration_ms)
        .bind(&play.artwork_url)
        .bind(play.played_at)
        .bind(play.fetch_session)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Recent plays for a user, optionally filtered by source
    pub async fn find_recent_for_user(
        &self,
        user_id: Uuid,
        source: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> SqlxResult<Vec<ListeningHistory>> {
        match source {
            Some(source) => {
                sqlx::query_as::<_, ListeningHistory>(&format!(
                    "SELECT {HISTORY_COLUMNS} FROM listening_history \
                     WHERE user_id = $1 AND source = $2 \
                     ORDER BY played_at DESC LIMIT $3 OFFSET $4"
                ))
                .bind(user_id)
                .bind(source)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ListeningHistory>(&format!(
                    "SELECT {HISTORY_COLUMNS} FROM listening_history \
                     WHERE user_id = $1 ORDER BY played_at DESC LIMIT $2 OFFSET $3"
                ))
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
            }
        }
    }

    /// Newest played_at ingested for (user, source); the polling cursor fallback
    pub async fn latest_played_at(
        &self,
        user_id: Uuid,
        source: &str,
    ) -> SqlxResult<Option<NaiveDateTime>> {
        sqlx::query_scalar::<_, Option<NaiveDateTime>>(
            "SELECT MAX(played_at) FROM listening_history WHERE user_id = $1 AND source = $2",
        )
        .bind(user_id)
        .bind(source)
        .fetch_one(&self.pool)
        .await
    }

    /// Number of rows inserted by one polling run
    pub async fn count_for_session(&self, fetch_session: Uuid) -> SqlxResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM listening_history WHERE fetch_session = $1",
        )
        .bind(fetch_session)
        .fetch_one(&self.pool)
        .await
    }

    /// Distinct artist credits that have no cached image row yet
    pub async fn distinct_uncached_artist_names(&self, limit: i64) -> SqlxResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT lh.artist_name FROM listening_history lh \
             LEFT JOIN artist_images ai ON lower(ai.artist_name) = lower(lh.artist_name) \
             WHERE ai.id IS NULL ORDER BY lh.artist_name LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Play counts grouped by genre for one user, most played first.
    /// Rows whose genre was never resolved are bucketed under 'unknown'.
    pub async fn genre_breakdown_for_user(&self, user_id: Uuid) -> SqlxResult<Vec<GenreCount>> {
        sqlx::query_as::<_, GenreCount>(
            "SELECT CASE WHEN genre = '' THEN 'unknown' ELSE genre END AS genre, \
             COUNT(*) AS play_count \
             FROM listening_history WHERE user_id = $1 \
             GROUP BY 1 ORDER BY play_count DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Distinct tracks with neither a producer link nor an unmatched record,
    /// newest plays first. These are the attribution work queue.
    pub async fn find_unattributed(&self, limit: i64) -> SqlxResult<Vec<ListeningHistory>> {
        sqlx::query_as::<_, ListeningHistory>(&format!(
            "SELECT DISTINCT ON (lh.source, lh.track_external_id) {} \
             FROM listening_history lh \
             LEFT JOIN producer_tracks pt \
               ON pt.source = lh.source AND pt.track_external_id = lh.track_external_id \
             LEFT JOIN unmatched_tracks ut \
               ON ut.source = lh.source AND ut.track_external_id = lh.track_external_id \
             WHERE pt.id IS NULL AND ut.id IS NULL \
             ORDER BY lh.source, lh.track_external_id, lh.played_at DESC \
             LIMIT $1",
            HISTORY_COLUMNS
                .split(", ")
                .map(|c| format!("lh.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Fill the genre of rows whose artist resolved to `genre` during the
    /// image-cache pass. Spotify play items carry no genre of their own.
    pub async fn fill_missing_genre(&self, artist_name: &str, genre: &str) -> SqlxResult<u64> {
        let result = sqlx::query(
            "UPDATE listening_history SET genre = $2 \
             WHERE genre = '' AND lower(artist_name) = lower($1)",
        )
        .bind(artist_name)
        .bind(genre)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Users who listened to a given track; used to notify producer followers
    pub async fn listeners_of_track(
        &self,
        source: &str,
        track_external_id: &str,
    ) -> SqlxResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT DISTINCT user_id FROM listening_history \
             WHERE source = $1 AND track_external_id = $2",
        )
        .bind(source)
        .bind(track_external_id)
        .fetch_all(&self.pool)
        .await
    }
}
