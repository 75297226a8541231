use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Track for which producer attribution found no credit in any source
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UnmatchedTrack {
    pub id: Uuid,
    pub source: String,
    pub track_external_id: String,
    pub track_name: String,
    pub artist_name: String,
    pub reason: String,
    pub created_at: NaiveDateTime,
}
