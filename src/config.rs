use std::env;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Spotify Web API credentials
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_base: String,
    pub accounts_base: String,
}

/// Apple Music API credentials
#[derive(Debug, Clone)]
pub struct AppleMusicConfig {
    pub developer_token: String,
    pub api_base: String,
}

/// Genius API credentials
#[derive(Debug, Clone)]
pub struct GeniusConfig {
    pub access_token: String,
    pub api_base: String,
}

/// Discogs API credentials
#[derive(Debug, Clone)]
pub struct DiscogsConfig {
    pub token: String,
    pub api_base: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub log_level: String,
    pub http_port: u16,
    pub environment: String,
    /// None when SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET are unset;
    /// the Spotify fetch and image-cache passes are skipped in that case.
    pub spotify: Option<SpotifyConfig>,
    pub apple_music: Option<AppleMusicConfig>,
    pub genius: Option<GeniusConfig>,
    pub discogs: Option<DiscogsConfig>,
    pub fetch_interval_secs: u64,
    pub image_cache_interval_secs: u64,
    pub attribution_interval_secs: u64,
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let acquire_timeout_secs = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_secs = env::var("DATABASE_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600); // 10 minutes

        let max_lifetime_secs = env::var("DATABASE_MAX_LIFETIME_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1800); // 30 minutes

        let test_before_acquire = env::var("DATABASE_TEST_BEFORE_ACQUIRE")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        // Validate configuration
        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/trackcer".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl SpotifyConfig {
    /// Returns None when either credential is missing
    pub fn from_env() -> Option<Self> {
        let client_id = env::var("SPOTIFY_CLIENT_ID").ok()?;
        let client_secret = env::var("SPOTIFY_CLIENT_SECRET").ok()?;

        Some(Self {
            client_id,
            client_secret,
            api_base: env::var("SPOTIFY_API_BASE")
                .unwrap_or_else(|_| "https://api.spotify.com".to_string()),
            accounts_base: env::var("SPOTIFY_ACCOUNTS_BASE")
                .unwrap_or_else(|_| "https://accounts.spotify.com".to_string()),
        })
    }
}

impl AppleMusicConfig {
    pub fn from_env() -> Option<Self> {
        let developer_token = env::var("APPLE_MUSIC_DEVELOPER_TOKEN").ok()?;

        Some(Self {
            developer_token,
            api_base: env::var("APPLE_MUSIC_API_BASE")
                .unwrap_or_else(|_| "https://api.music.apple.com".to_string()),
        })
    }
}

impl GeniusConfig {
    pub fn from_env() -> Option<Self> {
        let access_token = env::var("GENIUS_ACCESS_TOKEN").ok()?;

        Some(Self {
            access_token,
            api_base: env::var("GENIUS_API_BASE")
                .unwrap_or_else(|_| "https://api.genius.com".to_string()),
        })
    }
}

impl DiscogsConfig {
    pub fn from_env() -> Option<Self> {
        let token = env::var("DISCOGS_TOKEN").ok()?;

        Some(Self {
            token,
            api_base: env::var("DISCOGS_API_BASE")
                .unwrap_or_else(|_| "https://api.discogs.com".to_string()),
        })
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string());

        let http_port = env::var("HTTP_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        let fetch_interval_secs = env::var("FETCH_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600);

        let image_cache_interval_secs = env::var("IMAGE_CACHE_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(3600);

        let attribution_interval_secs = env::var("ATTRIBUTION_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1800);

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        if fetch_interval_secs == 0 {
            return Err("FETCH_INTERVAL_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            database,
            log_level: log_level.to_lowercase(),
            http_port,
            environment: environment.to_lowercase(),
            spotify: SpotifyConfig::from_env(),
            apple_music: AppleMusicConfig::from_env(),
            genius: GeniusConfig::from_env(),
            discogs: DiscogsConfig::from_env(),
            fetch_interval_secs,
            image_cache_interval_secs,
            attribution_interval_secs,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Get database URL (convenience method)
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_secs)
    }

    pub fn image_cache_interval(&self) -> Duration {
        Duration::from_secs(self.image_cache_interval_secs)
    }

    pub fn attribution_interval(&self) -> Duration {
        Duration::from_secs(self.attribution_interval_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            log_level: "info".to_string(),
            http_port: 8080,
            environment: "development".to_string(),
            spotify: None,
            apple_music: None,
            genius: None,
            discogs: None,
            fetch_interval_secs: 600,
            image_cache_interval_secs: 3600,
            attribution_interval_secs: 1800,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout_secs, 30);
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.http_port, 8080);
        assert!(config.is_development());
        assert!(!config.is_production());
        assert!(config.spotify.is_none());
    }

    #[test]
    fn test_fetch_interval_duration() {
        let config = AppConfig::default();
        assert_eq!(config.fetch_interval(), Duration::from_secs(600));
    }
}
