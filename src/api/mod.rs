//! HTTP API surface.
//!
//! JSON endpoints consumed by the TrackCer frontend: listening history,
//! producer follow/favourite management, analytics, playlists, and
//! notifications.

pub mod handlers;
pub mod server;

pub use server::{run, ApiContext};
