pub mod artist_image_repository;
pub mod listening_history_repository;
pub mod notification_repository;
pub mod playlist_repository;
pub mod producer_repository;
pub mod unmatched_track_repository;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use artist_image_repository::ArtistImageRepository;
pub use listening_history_repository::{GenreCount, ListeningHistoryRepository, NewPlay};
pub use notification_repository::NotificationRepository;
pub use playlist_repository::PlaylistRepository;
pub use producer_repository::{CollaborationEdge, FollowedProducer, ProducerPlayCount, ProducerRepository};
pub use unmatched_track_repository::UnmatchedTrackRepository;
pub use user_repository::UserRepository;
