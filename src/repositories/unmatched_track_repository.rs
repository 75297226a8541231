use crate::models::UnmatchedTrack;
use sqlx::{PgPool, Result as SqlxResult};

const UNMATCHED_COLUMNS: &str =
    "id, source, track_external_id, track_name, artist_name, reason, created_at";

/// Repository for tracks that producer attribution could not resolve
pub struct UnmatchedTrackRepository {
    pool: PgPool,
}

impl UnmatchedTrackRepository {
    /// Create a new UnmatchedTrackRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record an attribution miss. Re-recording updates the reason.
    pub async fn record(
        &self,
        source: &str,
        track_external_id: &str,
        track_name: &str,
        artist_name: &str,
        reason: &str,
    ) -> SqlxResult<UnmatchedTrack> {
        sqlx::query_as::<_, UnmatchedTrack>(&format!(
            "INSERT INTO unmatched_tracks \
             (source, track_external_id, track_name, artist_name, reason) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (source, track_external_id) DO UPDATE SET reason = EXCLUDED.reason \
             RETURNING {UNMATCHED_COLUMNS}"
        ))
        .bind(source)
        .bind(track_external_id)
        .bind(track_name)
        .bind(artist_name)
        .bind(reason)
        .fetch_one(&self.pool)
        .await
    }

    /// Most recent misses
    pub async fn find_recent(&self, limit: i64) -> SqlxResult<Vec<UnmatchedTrack>> {
        sqlx::query_as::<_, UnmatchedTrack>(&format!(
            "SELECT {UNMATCHED_COLUMNS} FROM unmatched_tracks \
             ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
