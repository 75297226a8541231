//! HTTP server setup and routing.
//!
//! Builds the Axum router with all JSON routes and serves it. Handlers
//! receive the shared [`ApiContext`] through Axum state.

use crate::error::{AppError, AppResult};
use crate::repositories::{
    ListeningHistoryRepository, NotificationRepository, PlaylistRepository, ProducerRepository,
    UserRepository,
};
use crate::services::AnalyticsService;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct ApiContext {
    pub user_repo: Arc<UserRepository>,
    pub history_repo: Arc<ListeningHistoryRepository>,
    pub producer_repo: Arc<ProducerRepository>,
    pub playlist_repo: Arc<PlaylistRepository>,
    pub notification_repo: Arc<NotificationRepository>,
    pub analytics: Arc<AnalyticsService>,
}

/// Build the router with all routes
pub fn router(ctx: ApiContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health))
        // Listening history and per-user analytics
        .route("/users/:user_id/history", get(handlers::get_history))
        .route("/users/:user_id/stats/genres", get(handlers::get_genre_stats))
        .route(
            "/users/:user_id/stats/producers",
            get(handlers::get_top_producers),
        )
        .route(
            "/users/:user_id/producers/followed",
            get(handlers::get_followed_producers),
        )
        // Follow / favourite management
        .route(
            "/users/:user_id/producers/:producer_id/follow",
            put(handlers::follow_producer).delete(handlers::unfollow_producer),
        )
        .route(
            "/users/:user_id/producers/:producer_id/favourite",
            put(handlers::favourite_producer).delete(handlers::unfavourite_producer),
        )
        // Playlists
        .route("/users/:user_id/playlists", get(handlers::get_playlists))
        // Notifications
        .route(
            "/users/:user_id/notifications",
            get(handlers::get_notifications),
        )
        .route(
            "/users/:user_id/notifications/:notification_id/read",
            post(handlers::mark_notification_read),
        )
        // Producers
        .route("/producers", get(handlers::search_producers))
        .route("/producers/:producer_id", get(handlers::get_producer))
        .route(
            "/producers/:producer_id/collaborations",
            get(handlers::get_collaborations),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Run the HTTP API server until it fails or the process exits
pub async fn run(ctx: ApiContext, port: u16) -> AppResult<()> {
    let addr: SocketAddr = format!("0.0.0.0:{port}")
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid HTTP address: {e}")))?;

    let app = router(ctx);

    info!("HTTP API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind HTTP server: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Message(format!("HTTP server error: {e}")))?;

    Ok(())
}
