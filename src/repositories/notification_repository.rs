use crate::models::Notification;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

const NOTIFICATION_COLUMNS: &str = "id, user_id, producer_id, message, read_at, created_at";

/// Repository for user notifications
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new NotificationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new notification
    pub async fn create(
        &self,
        user_id: Uuid,
        producer_id: Option<Uuid>,
        message: &str,
    ) -> SqlxResult<Notification> {
        sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications (user_id, producer_id, message) \
             VALUES ($1, $2, $3) RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(user_id)
        .bind(producer_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await
    }

    /// Notifications for a user, newest first
    pub async fn find_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> SqlxResult<Vec<Notification>> {
        if unread_only {
            sqlx::query_as::<_, Notification>(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
                 WHERE user_id = $1 AND read_at IS NULL \
                 ORDER BY created_at DESC LIMIT $2"
            ))
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, Notification>(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
                 WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
            ))
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        }
    }

    /// Mark one notification read; returns whether it belonged to the user
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> SqlxResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = now() \
             WHERE id = $1 AND user_id = $2 AND read_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
