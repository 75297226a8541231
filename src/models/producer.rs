use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Where a producer credit was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditSource {
    Genius,
    Discogs,
}

impl CreditSource {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "genius" => Ok(CreditSource::Genius),
            "discogs" => Ok(CreditSource::Discogs),
            _ => Err(format!("Invalid credit source: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditSource::Genius => "genius",
            CreditSource::Discogs => "discogs",
        }
    }
}

impl From<String> for CreditSource {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(CreditSource::Genius)
    }
}

impl From<CreditSource> for String {
    fn from(source: CreditSource) -> Self {
        source.as_str().to_string()
    }
}

/// Music-production credit entity that tracks link to
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Producer {
    pub id: Uuid,
    pub name: String,
    pub source: String,
    pub external_id: Option<String>,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Producer {
    pub fn credit_source(&self) -> CreditSource {
        CreditSource::from_str(&self.source).unwrap_or(CreditSource::Genius)
    }
}

/// Link between a producer and one track
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProducerTrack {
    pub id: Uuid,
    pub producer_id: Uuid,
    pub source: String,
    pub track_external_id: String,
    pub track_name: String,
    pub artist_name: String,
    pub created_at: NaiveDateTime,
}

/// User follow/favourite relation for a producer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProducerFollow {
    pub user_id: Uuid,
    pub producer_id: Uuid,
    pub favourite: bool,
    pub created_at: NaiveDateTime,
}
