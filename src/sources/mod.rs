//! Clients for the external source APIs.
//!
//! Spotify and Apple Music supply listening history; Genius and Discogs
//! supply producer credits. All clients wrap a shared `reqwest::Client`
//! and surface failures as [`SourceError`] values so batch callers can
//! log and skip per item.

pub mod apple_music;
pub mod discogs;
pub mod genius;
pub mod spotify;

pub use apple_music::AppleMusicClient;
pub use discogs::DiscogsClient;
pub use genius::GeniusClient;
pub use spotify::SpotifyClient;

use std::time::Duration;
use thiserror::Error;

/// User agent sent on every outbound API call
pub const USER_AGENT: &str = concat!("trackcer/", env!("CARGO_PKG_VERSION"));

/// Timeout applied to every outbound API call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors surfaced by the source API clients
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP transport or non-auth status failure
    #[error("{source_name} request failed: {message}")]
    Http {
        source_name: &'static str,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("{source_name} response parse failed: {message}")]
    Parse {
        source_name: &'static str,
        message: String,
    },

    /// Token rejected (401/403); caller may refresh and retry once
    #[error("{0} rejected the access token")]
    Unauthorized(&'static str),

    /// Rate limited (429)
    #[error("{0} rate limit hit")]
    RateLimited(&'static str),

    /// The source has no credentials configured
    #[error("{0} is not configured")]
    Disabled(&'static str),
}

impl SourceError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SourceError::Unauthorized(_))
    }
}

/// Result type alias for source client operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Build the shared outbound HTTP client
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("failed to build HTTP client")
}

/// Map an error status to the right variant; pass successful responses through
pub(crate) fn check_status(
    response: reqwest::Response,
    source_name: &'static str,
) -> SourceResult<reqwest::Response> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(SourceError::Unauthorized(source_name));
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited(source_name));
    }
    if !status.is_success() {
        return Err(SourceError::Http {
            source_name,
            message: format!("unexpected status {status}"),
        });
    }
    Ok(response)
}

pub(crate) fn transport_error(source_name: &'static str, err: reqwest::Error) -> SourceError {
    SourceError::Http {
        source_name,
        message: err.to_string(),
    }
}

pub(crate) fn parse_error(source_name: &'static str, err: reqwest::Error) -> SourceError {
    SourceError::Parse {
        source_name,
        message: err.to_string(),
    }
}
