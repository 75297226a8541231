use crate::models::Playlist;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

const PLAYLIST_COLUMNS: &str = "id, user_id, source, external_id, name, track_count, created_at";

/// Repository for mirrored playlists
pub struct PlaylistRepository {
    pool: PgPool,
}

impl PlaylistRepository {
    /// Create a new PlaylistRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a playlist row
    pub async fn upsert(
        &self,
        user_id: Uuid,
        source: &str,
        external_id: &str,
        name: &str,
        track_count: i32,
    ) -> SqlxResult<Playlist> {
        sqlx::query_as::<_, Playlist>(&format!(
            "INSERT INTO playlists (user_id, source, external_id, name, track_count) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, source, external_id) DO UPDATE SET \
               name = EXCLUDED.name, track_count = EXCLUDED.track_count \
             RETURNING {PLAYLIST_COLUMNS}"
        ))
        .bind(user_id)
        .bind(source)
        .bind(external_id)
        .bind(name)
        .bind(track_count)
        .fetch_one(&self.pool)
        .await
    }

    /// Playlists belonging to a user
    pub async fn find_for_user(&self, user_id: Uuid) -> SqlxResult<Vec<Playlist>> {
        sqlx::query_as::<_, Playlist>(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE user_id = $1 ORDER BY name"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
