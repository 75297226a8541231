use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User account with per-source OAuth credentials and fetch cursors
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub spotify_id: Option<String>,
    #[serde(skip_serializing)]
    pub spotify_access_token: Option<String>,
    #[serde(skip_serializing)]
    pub spotify_refresh_token: Option<String>,
    pub spotify_token_expires_at: Option<NaiveDateTime>,
    #[serde(skip_serializing)]
    pub apple_music_user_token: Option<String>,
    pub spotify_cursor: Option<NaiveDateTime>,
    pub apple_cursor: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl User {
    /// Whether the user has a linked Spotify account
    pub fn has_spotify(&self) -> bool {
        self.spotify_refresh_token.is_some()
    }

    /// Whether the user has a linked Apple Music account
    pub fn has_apple_music(&self) -> bool {
        self.apple_music_user_token.is_some()
    }
}
