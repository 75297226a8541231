use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User playlist mirrored from a streaming source
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Playlist {
    pub id: Uuid,
    pub user_id: Uuid,
    pub source: String,
    pub external_id: String,
    pub name: String,
    pub track_count: i32,
    pub created_at: NaiveDateTime,
}
