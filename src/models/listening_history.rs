use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Source a play event was pulled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaySource {
    Spotify,
    AppleMusic,
}

impl PlaySource {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "spotify" => Ok(PlaySource::Spotify),
            "apple_music" => Ok(PlaySource::AppleMusic),
            _ => Err(format!("Invalid play source: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaySource::Spotify => "spotify",
            PlaySource::AppleMusic => "apple_music",
        }
    }
}

impl From<String> for PlaySource {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(PlaySource::Spotify)
    }
}

impl From<PlaySource> for String {
    fn from(source: PlaySource) -> Self {
        source.as_str().to_string()
    }
}

/// One play event from a user's listening history.
///
/// Rows inserted by a single polling run share a `fetch_session` id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ListeningHistory {
    pub id: Uuid,
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
    pub created_at: NaiveDateTime,
}

impl ListeningHistory {
    pub fn play_source(&self) -> PlaySource {
        PlaySource::from_str(&self.source).unwrap_or(PlaySource::Spotify)
    }
}
