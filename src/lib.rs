//! TrackCer Backend Library
//!
//! This module exposes the backend components for use by tests and other
//! consumers.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod matching;
pub mod models;
pub mod repositories;
pub mod services;
pub mod sources;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use database::Database;
use repositories::*;
use std::sync::Arc;

/// Application state containing all repositories
pub struct AppState {
    pub database: Database,
    pub user_repo: Arc<UserRepository>,
    pub history_repo: Arc<ListeningHistoryRepository>,
    pub producer_repo: Arc<ProducerRepository>,
    pub artist_image_repo: Arc<ArtistImageRepository>,
    pub playlist_repo: Arc<PlaylistRepository>,
    pub notification_repo: Arc<NotificationRepository>,
    pub unmatched_repo: Arc<UnmatchedTrackRepository>,
}

impl AppState {
    /// Create a new AppState with initialized repositories
    pub fn new(pool: sqlx::PgPool) -> Self {
        let database = Database::new(pool.clone());

        Self {
            database: database.clone(),
            user_repo: Arc::new(UserRepository::new(pool.clone())),
            history_repo: Arc::new(ListeningHistoryRepository::new(pool.clone())),
            producer_repo: Arc::new(ProducerRepository::new(pool.clone())),
            artist_image_repo: Arc::new(ArtistImageRepository::new(pool.clone())),
            playlist_repo: Arc::new(PlaylistRepository::new(pool.clone())),
            notification_repo: Arc::new(NotificationRepository::new(pool.clone())),
            unmatched_repo: Arc::new(UnmatchedTrackRepository::new(pool)),
        }
    }
}
