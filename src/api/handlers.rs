//! HTTP request handlers.
//!
//! Implements the JSON endpoints. Errors map through
//! [`AppError::status_code`] to HTTP statuses.

use crate::error::{option_to_result, AppError, RepositoryError};
use crate::models::{ListeningHistory, Notification, PlaySource, Playlist, Producer, ProducerTrack};
use crate::repositories::{FollowedProducer, GenreCount, ProducerPlayCount};
use crate::services::analytics::CollaborationGraph;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::server::ApiContext;

/// Error wrapper so handlers can use `?` on anything convertible to AppError
pub struct ApiError(AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub source: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TopProducersQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    pub unread: Option<bool>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ProducerSearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProducerDetail {
    #[serde(flatten)]
    pub producer: Producer,
    pub tracks: Vec<ProducerTrack>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_history(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<ListeningHistory>> {
    ensure_user(&ctx, user_id).await?;

    // Reject unknown source filters instead of returning an empty page
    if let Some(source) = query.source.as_deref() {
        PlaySource::from_str(source).map_err(AppError::Validation)?;
    }

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let history = ctx
        .history_repo
        .find_recent_for_user(user_id, query.source.as_deref(), limit, offset)
        .await?;

    Ok(Json(history))
}

pub async fn get_genre_stats(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Vec<GenreCount>> {
    ensure_user(&ctx, user_id).await?;
    Ok(Json(ctx.analytics.genre_breakdown(user_id).await?))
}

pub async fn get_top_producers(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<TopProducersQuery>,
) -> ApiResult<Vec<ProducerPlayCount>> {
    ensure_user(&ctx, user_id).await?;
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    Ok(Json(ctx.analytics.top_producers(user_id, limit).await?))
}

pub async fn get_followed_producers(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Vec<FollowedProducer>> {
    ensure_user(&ctx, user_id).await?;
    Ok(Json(ctx.analytics.followed_producers(user_id).await?))
}

pub async fn follow_producer(
    State(ctx): State<ApiContext>,
    Path((user_id, producer_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusResponse> {
    ensure_user(&ctx, user_id).await?;

    // Foreign-key violations classify as validation errors (400), so an
    // unknown producer id does not surface as a server fault
    ctx.producer_repo
        .follow(user_id, producer_id)
        .await
        .map_err(RepositoryError::from)?;
    Ok(Json(StatusResponse {
        status: "following".to_string(),
    }))
}

pub async fn unfollow_producer(
    State(ctx): State<ApiContext>,
    Path((user_id, producer_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusResponse> {
    ensure_user(&ctx, user_id).await?;

    let removed = ctx.producer_repo.unfollow(user_id, producer_id).await?;
    if !removed {
        return Err(AppError::NotFound("follow".to_string()).into());
    }
    Ok(Json(StatusResponse {
        status: "unfollowed".to_string(),
    }))
}

pub async fn favourite_producer(
    State(ctx): State<ApiContext>,
    Path((user_id, producer_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusResponse> {
    ensure_user(&ctx, user_id).await?;

    ctx.producer_repo
        .set_favourite(user_id, producer_id, true)
        .await
        .map_err(RepositoryError::from)?;
    Ok(Json(StatusResponse {
        status: "favourited".to_string(),
    }))
}

pub async fn unfavourite_producer(
    State(ctx): State<ApiContext>,
    Path((user_id, producer_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusResponse> {
    ensure_user(&ctx, user_id).await?;

    ctx.producer_repo
        .set_favourite(user_id, producer_id, false)
        .await
        .map_err(RepositoryError::from)?;
    Ok(Json(StatusResponse {
        status: "unfavourited".to_string(),
    }))
}

pub async fn get_playlists(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Vec<Playlist>> {
    ensure_user(&ctx, user_id).await?;
    Ok(Json(ctx.playlist_repo.find_for_user(user_id).await?))
}

pub async fn get_notifications(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<NotificationsQuery>,
) -> ApiResult<Vec<Notification>> {
    ensure_user(&ctx, user_id).await?;

    let unread_only = query.unread.unwrap_or(false);
    let limit = query.limit.unwrap_or(50).clamp(1, 200);

    let notifications = ctx
        .notification_repo
        .find_for_user(user_id, unread_only, limit)
        .await?;
    Ok(Json(notifications))
}

pub async fn mark_notification_read(
    State(ctx): State<ApiContext>,
    Path((user_id, notification_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusResponse> {
    ensure_user(&ctx, user_id).await?;

    let updated = ctx
        .notification_repo
        .mark_read(notification_id, user_id)
        .await?;
    if !updated {
        return Err(AppError::NotFound("notification".to_string()).into());
    }
    Ok(Json(StatusResponse {
        status: "read".to_string(),
    }))
}

pub async fn search_producers(
    State(ctx): State<ApiContext>,
    Query(query): Query<ProducerSearchQuery>,
) -> ApiResult<Vec<Producer>> {
    let q = query.q.unwrap_or_default();
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    Ok(Json(ctx.producer_repo.search_by_name(&q, limit).await?))
}

pub async fn get_producer(
    State(ctx): State<ApiContext>,
    Path(producer_id): Path<Uuid>,
) -> ApiResult<ProducerDetail> {
    let producer = option_to_result(
        ctx.producer_repo.find_by_id(producer_id).await?,
        "producer",
    )?;
    let tracks = ctx.producer_repo.tracks_of(producer_id, 100).await?;

    Ok(Json(ProducerDetail { producer, tracks }))
}

pub async fn get_collaborations(
    State(ctx): State<ApiContext>,
    Path(producer_id): Path<Uuid>,
) -> ApiResult<CollaborationGraph> {
    Ok(Json(ctx.analytics.collaboration_graph(producer_id).await?))
}

// ============================================================================
// Helpers
// ============================================================================

async fn ensure_user(ctx: &ApiContext, user_id: Uuid) -> Result<(), ApiError> {
    option_to_result(ctx.user_repo.find_by_id(user_id).await?, "user")?;
    Ok(())
}
