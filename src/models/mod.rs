//! Domain models for the TrackCer backend.
//!
//! This module contains all database-backed models representing
//! the core entities of the listening-history platform.

pub mod artist_image;
pub mod listening_history;
pub mod notification;
pub mod playlist;
pub mod producer;
pub mod unmatched_track;
pub mod user;

// Re-export all models for convenient access
pub use artist_image::ArtistImage;
pub use listening_history::{ListeningHistory, PlaySource};
pub use notification::Notification;
pub use playlist::Playlist;
pub use producer::{CreditSource, Producer, ProducerFollow, ProducerTrack};
pub use unmatched_track::UnmatchedTrack;
pub use user::User;
