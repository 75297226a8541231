use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Cached artist image resolved through the Spotify search API.
///
/// A row with a null `image_url` records a definitive miss so the
/// lookup is not repeated on every cache pass.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArtistImage {
    pub id: Uuid,
    pub artist_name: String,
    pub spotify_artist_id: Option<String>,
    pub image_url: Option<String>,
    pub genre: String,
    pub checked_at: NaiveDateTime,
}

impl ArtistImage {
    pub fn is_resolved(&self) -> bool {
        self.image_url.is_some()
    }
}
