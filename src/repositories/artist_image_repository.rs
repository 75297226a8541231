use crate::models::ArtistImage;
use sqlx::{PgPool, Result as SqlxResult};

const IMAGE_COLUMNS: &str = "id, artist_name, spotify_artist_id, image_url, genre, checked_at";

/// Repository for cached artist images
pub struct ArtistImageRepository {
    pool: PgPool,
}

impl ArtistImageRepository {
    /// Create a new ArtistImageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a cached image row by artist name (case-insensitive)
    pub async fn find_by_name(&self, artist_name: &str) -> SqlxResult<Option<ArtistImage>> {
        sqlx::query_as::<_, ArtistImage>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM artist_images WHERE lower(artist_name) = lower($1)"
        ))
        .bind(artist_name)
        .fetch_optional(&self.pool)
        .await
    }

    /// Record a lookup result. A null image_url marks a definitive miss so
    /// the artist is not searched again on every pass.
    pub async fn upsert(
        &self,
        artist_name: &str,
        spotify_artist_id: Option<&str>,
        image_url: Option<&str>,
        genre: &str,
    ) -> SqlxResult<ArtistImage> {
        sqlx::query_as::<_, ArtistImage>(&format!(
            "INSERT INTO artist_images (artist_name, spotify_artist_id, image_url, genre, checked_at) \
             VALUES ($1, $2, $3, $4, now()) \
             ON CONFLICT (artist_name) DO UPDATE SET \
               spotify_artist_id = EXCLUDED.spotify_artist_id, \
               image_url = EXCLUDED.image_url, \
               genre = EXCLUDED.genre, \
               checked_at = now() \
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(artist_name)
        .bind(spotify_artist_id)
        .bind(image_url)
        .bind(genre)
        .fetch_one(&self.pool)
        .await
    }

    /// Most recently checked rows; used by the admin surface
    pub async fn list_recent(&self, limit: i64) -> SqlxResult<Vec<ArtistImage>> {
        sqlx::query_as::<_, ArtistImage>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM artist_images ORDER BY checked_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
