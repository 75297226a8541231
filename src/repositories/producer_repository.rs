use crate::models::{Producer, ProducerTrack};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Result as SqlxResult};
use uuid::Uuid;

const PRODUCER_COLUMNS: &str = "id, name, source, external_id, image_url, created_at";

/// Producer plus the caller's favourite flag
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FollowedProducer {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub favourite: bool,
}

/// Producer ranked by a user's play count
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProducerPlayCount {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub play_count: i64,
}

/// Edge of the collaboration graph: another producer sharing tracks
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CollaborationEdge {
    pub producer_id: Uuid,
    pub name: String,
    pub shared_tracks: i64,
}

/// Repository for producer data access
pub struct ProducerRepository {
    pool: PgPool,
}

impl ProducerRepository {
    /// Create a new ProducerRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a producer or return the existing row for that name.
    /// External id and image are only filled in when previously absent.
    pub async fn upsert_by_name(
        &self,
        name: &str,
        source: &str,
        external_id: Option<&str>,
        image_url: Option<&str>,
    ) -> SqlxResult<Producer> {
        sqlx::query_as::<_, Producer>(&format!(
            "INSERT INTO producers (name, source, external_id, image_url) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (name) DO UPDATE SET \
               external_id = COALESCE(producers.external_id, EXCLUDED.external_id), \
               image_url = COALESCE(producers.image_url, EXCLUDED.image_url) \
             RETURNING {PRODUCER_COLUMNS}"
        ))
        .bind(name)
        .bind(source)
        .bind(external_id)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a producer by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<Producer>> {
        sqlx::query_as::<_, Producer>(&format!(
            "SELECT {PRODUCER_COLUMNS} FROM producers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Case-insensitive name search
    pub async fn search_by_name(&self, query: &str, limit: i64) -> SqlxResult<Vec<Producer>> {
        sqlx::query_as::<_, Producer>(&format!(
            "SELECT {PRODUCER_COLUMNS} FROM producers \
             WHERE name ILIKE '%' || $1 || '%' ORDER BY name LIMIT $2"
        ))
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Link a producer to a track; returns whether the link is new
    pub async fn link_track(
        &self,
        producer_id: Uuid,
        source: &str,
        track_external_id: &str,
        track_name: &str,
        artist_name: &str,
    ) -> SqlxResult<bool> {
        let result = sqlx::query(
            "INSERT INTO producer_tracks \
             (producer_id, source, track_external_id, track_name, artist_name) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (producer_id, source, track_external_id) DO NOTHING",
        )
        .bind(producer_id)
        .bind(source)
        .bind(track_external_id)
        .bind(track_name)
        .bind(artist_name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Tracks linked to a producer, newest first
    pub async fn tracks_of(&self, producer_id: Uuid, limit: i64) -> SqlxResult<Vec<ProducerTrack>> {
        sqlx::query_as::<_, ProducerTrack>(
            "SELECT id, producer_id, source, track_external_id, track_name, artist_name, \
             created_at FROM producer_tracks \
             WHERE producer_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(producer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Follow a producer (idempotent)
    pub async fn follow(&self, user_id: Uuid, producer_id: Uuid) -> SqlxResult<()> {
        sqlx::query(
            "INSERT INTO producer_follows (user_id, producer_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, producer_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(producer_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Unfollow a producer; returns whether a follow existed
    pub async fn unfollow(&self, user_id: Uuid, producer_id: Uuid) -> SqlxResult<bool> {
        let result = sqlx::query(
            "DELETE FROM producer_follows WHERE user_id = $1 AND producer_id = $2",
        )
        .bind(user_id)
        .bind(producer_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark or clear the favourite flag. Favouriting implies following.
    pub async fn set_favourite(
        &self,
        user_id: Uuid,
        producer_id: Uuid,
        favourite: bool,
    ) -> SqlxResult<()> {
        sqlx::query(
            "INSERT INTO producer_follows (user_id, producer_id, favourite) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, producer_id) DO UPDATE SET favourite = EXCLUDED.favourite",
        )
        .bind(user_id)
        .bind(producer_id)
        .bind(favourite)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Producers followed by a user, favourites first
    pub async fn followed_by_user(&self, user_id: Uuid) -> SqlxResult<Vec<FollowedProducer>> {
        sqlx::query_as::<_, FollowedProducer>(
            "SELECT p.id, p.name, p.image_url, pf.favourite \
             FROM producer_follows pf \
             JOIN producers p ON p.id = pf.producer_id \
             WHERE pf.user_id = $1 \
             ORDER BY pf.favourite DESC, p.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Users following a producer
    pub async fn followers_of(&self, producer_id: Uuid) -> SqlxResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM producer_follows WHERE producer_id = $1",
        )
        .bind(producer_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Producers ranked by how often a user played their tracks
    pub async fn top_for_user(&self, user_id: Uuid, limit: i64) -> SqlxResult<Vec<ProducerPlayCount>> {
        sqlx::query_as::<_, ProducerPlayCount>(
            "SELECT p.id, p.name, p.image_url, COUNT(*) AS play_count \
             FROM listening_history lh \
             JOIN producer_tracks pt \
               ON pt.source = lh.source AND pt.track_external_id = lh.track_external_id \
             JOIN producers p ON p.id = pt.producer_id \
             WHERE lh.user_id = $1 \
             GROUP BY p.id, p.name, p.image_url \
             ORDER BY play_count DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Producers sharing at least one track with the given producer,
    /// weighted by how many tracks they share
    pub async fn collaborators_of(&self, producer_id: Uuid) -> SqlxResult<Vec<CollaborationEdge>> {
        sqlx::query_as::<_, CollaborationEdge>(
            "SELECT p.id AS producer_id, p.name, COUNT(*) AS shared_tracks \
             FROM producer_tracks a \
             JOIN producer_tracks b \
               ON a.source = b.source \
              AND a.track_external_id = b.track_external_id \
              AND b.producer_id <> a.producer_id \
             JOIN producers p ON p.id = b.producer_id \
             WHERE a.producer_id = $1 \
             GROUP BY p.id, p.name \
             ORDER BY shared_tracks DESC, p.name",
        )
        .bind(producer_id)
        .fetch_all(&self.pool)
        .await
    }
}
