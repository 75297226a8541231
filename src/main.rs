//! TrackCer Backend Service
//!
//! Main entry point for the TrackCer listening-history backend.
//! This binary provides:
//! - HTTP JSON API for the frontend
//! - Background pollers for history fetching, artist image caching,
//!   and producer attribution
//! - One-shot console commands mirroring each poller pass

use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info};
use trackcer_backend::api::{self, ApiContext};
use trackcer_backend::config::AppConfig;
use trackcer_backend::database::{create_pool, run_migrations};
use trackcer_backend::error::{AppError, AppResult};
use trackcer_backend::services::{
    AnalyticsService, ArtistImageCache, HistoryFetcher, ProducerAttribution,
};
use trackcer_backend::sources::{AppleMusicClient, DiscogsClient, GeniusClient, SpotifyClient};
use trackcer_backend::AppState;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "trackcer", about = "TrackCer listening-history backend", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API and all background pollers
    Serve,
    /// Fetch Spotify listening history once and exit
    FetchSpotifyHistory {
        /// Restrict the pass to one user
        #[arg(long)]
        user: Option<Uuid>,
    },
    /// Fetch Apple Music listening history once and exit
    FetchAppleHistory {
        /// Restrict the pass to one user
        #[arg(long)]
        user: Option<Uuid>,
    },
    /// Resolve and cache artist images once and exit
    CacheArtistImages,
    /// Attribute tracks to producers once and exit
    AttributeProducers,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "trackcer_backend={},sqlx=warn,tower_http=info",
                    config.log_level
                )
                .into()
            }),
        )
        .init();

    info!("TrackCer backend starting");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    // Run migrations
    info!("Running database migrations...");
    run_migrations(&pool, None).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    let app_state = Arc::new(AppState::new(pool.clone()));
    info!("✓ Application state initialized with repositories");

    let spotify = config.spotify.clone().map(SpotifyClient::new);
    let apple_music = config.apple_music.clone().map(AppleMusicClient::new);
    let genius = config.genius.clone().map(GeniusClient::new);
    let discogs = config.discogs.clone().map(DiscogsClient::new);

    for (name, configured) in [
        ("Spotify", spotify.is_some()),
        ("Apple Music", apple_music.is_some()),
        ("Genius", genius.is_some()),
        ("Discogs", discogs.is_some()),
    ] {
        if configured {
            info!("✓ {} client configured", name);
        } else {
            info!("– {} credentials not set, source disabled", name);
        }
    }

    let fetcher = Arc::new(HistoryFetcher::new(
        spotify.clone(),
        apple_music,
        app_state.user_repo.clone(),
        app_state.history_repo.clone(),
        app_state.playlist_repo.clone(),
    ));

    let image_cache = Arc::new(ArtistImageCache::new(
        spotify,
        app_state.history_repo.clone(),
        app_state.artist_image_repo.clone(),
    ));

    let attribution = Arc::new(ProducerAttribution::new(
        genius,
        discogs,
        app_state.history_repo.clone(),
        app_state.producer_repo.clone(),
        app_state.unmatched_repo.clone(),
        app_state.notification_repo.clone(),
    ));

    match cli.command {
        Command::Serve => serve(config, app_state, fetcher, image_cache, attribution).await,
        Command::FetchSpotifyHistory { user } => {
            let summary = fetcher.run_spotify_pass(user).await?;
            info!(
                users = summary.users_processed,
                failed = summary.users_failed,
                inserted = summary.plays_inserted,
                "Spotify fetch pass finished"
            );
            Ok(())
        }
        Command::FetchAppleHistory { user } => {
            let summary = fetcher.run_apple_pass(user).await?;
            info!(
                users = summary.users_processed,
                failed = summary.users_failed,
                inserted = summary.plays_inserted,
                "Apple Music fetch pass finished"
            );
            Ok(())
        }
        Command::CacheArtistImages => {
            let summary = image_cache.run_pass().await?;
            info!(
                credits = summary.credits_processed,
                failed = summary.credits_failed,
                resolved = summary.artists_resolved,
                missed = summary.artists_missed,
                "Image cache pass finished"
            );
            Ok(())
        }
        Command::AttributeProducers => {
            let summary = attribution.run_pass().await?;
            info!(
                tracks = summary.tracks_processed,
                failed = summary.tracks_failed,
                attributed = summary.tracks_attributed,
                unmatched = summary.tracks_unmatched,
                "Attribution pass finished"
            );
            Ok(())
        }
    }
}

async fn serve(
    config: AppConfig,
    app_state: Arc<AppState>,
    fetcher: Arc<HistoryFetcher>,
    image_cache: Arc<ArtistImageCache>,
    attribution: Arc<ProducerAttribution>,
) -> AppResult<()> {
    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    info!("Starting background tasks...");

    let fetch_interval = config.fetch_interval();
    let fetcher_handle = tokio::spawn(async move {
        fetcher.start(fetch_interval).await;
    });
    info!("✓ History fetcher started ({:?} interval)", fetch_interval);

    let image_interval = config.image_cache_interval();
    let image_cache_handle = tokio::spawn(async move {
        image_cache.start(image_interval).await;
    });
    info!("✓ Artist image cache started ({:?} interval)", image_interval);

    let attribution_interval = config.attribution_interval();
    let attribution_handle = tokio::spawn(async move {
        attribution.start(attribution_interval).await;
    });
    info!(
        "✓ Producer attribution started ({:?} interval)",
        attribution_interval
    );

    // =========================================================================
    // HTTP API
    // =========================================================================
    let analytics = Arc::new(AnalyticsService::new(
        app_state.history_repo.clone(),
        app_state.producer_repo.clone(),
    ));

    let ctx = ApiContext {
        user_repo: app_state.user_repo.clone(),
        history_repo: app_state.history_repo.clone(),
        producer_repo: app_state.producer_repo.clone(),
        playlist_repo: app_state.playlist_repo.clone(),
        notification_repo: app_state.notification_repo.clone(),
        analytics,
    };

    let http_port = config.http_port;
    let api_handle = tokio::spawn(async move {
        if let Err(e) = api::run(ctx, http_port).await {
            error!("HTTP server error: {}", e);
        }
    });

    info!("TrackCer backend ready on port {}", http_port);
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = api_handle => {
            error!("HTTP server exited unexpectedly");
        }
        _ = fetcher_handle => {
            error!("History fetcher task exited unexpectedly");
        }
        _ = image_cache_handle => {
            error!("Image cache task exited unexpectedly");
        }
        _ = attribution_handle => {
            error!("Attribution task exited unexpectedly");
        }
    }

    info!("TrackCer backend shutdown complete");
    Ok(())
}
