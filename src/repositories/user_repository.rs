use crate::models::User;
use chrono::NaiveDateTime;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, display_name, email, spotify_id, spotify_access_token, \
     spotify_refresh_token, spotify_token_expires_at, apple_music_user_token, \
     spotify_cursor, apple_cursor, created_at";

/// Repository for user data access
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user
    pub async fn create(&self, display_name: &str, email: &str) -> SqlxResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (display_name, email) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(display_name)
        .bind(email)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a user by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find a user by email address
    pub async fn find_by_email(&self, email: &str) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find or create a user by email address (upsert pattern)
    /// Returns the user whether it was created or already existed
    pub async fn find_or_create_by_email(
        &self,
        display_name: &str,
        email: &str,
    ) -> SqlxResult<User> {
        // Try to find existing user first
        if let Some(user) = self.find_by_email(email).await? {
            return Ok(user);
        }

        // Create new user if not found
        self.create(display_name, email).await
    }

    /// List users holding a Spotify refresh token
    pub async fn find_with_spotify_tokens(&self) -> SqlxResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE spotify_refresh_token IS NOT NULL ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// List users holding an Apple Music user token
    pub async fn find_with_apple_tokens(&self) -> SqlxResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE apple_music_user_token IS NOT NULL ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// Persist a refreshed Spotify token triple
    pub async fn update_spotify_tokens(
        &self,
        id: Uuid,
        access_token: &str,
        refresh_token: &str,
        expires_at: NaiveDateTime,
    ) -> SqlxResult<()> {
        sqlx::query(
            "UPDATE users SET spotify_access_token = $2, spotify_refresh_token = $3, \
             spotify_token_expires_at = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(access_token)
        .bind(refresh_token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Advance the Spotify fetch cursor to the newest ingested play
    pub async fn update_spotify_cursor(&self, id: Uuid, cursor: NaiveDateTime) -> SqlxResult<()> {
        sqlx::query("UPDATE users SET spotify_cursor = $2 WHERE id = $1")
            .bind(id)
            .bind(cursor)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Advance the Apple Music fetch cursor
    pub async fn update_apple_cursor(&self, id: Uuid, cursor: NaiveDateTime) -> SqlxResult<()> {
        sqlx::query("UPDATE users SET apple_cursor = $2 WHERE id = $1")
            .bind(id)
            .bind(cursor)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
