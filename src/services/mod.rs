pub mod analytics;
pub mod artist_image_cache;
pub mod history_fetcher;
pub mod producer_attribution;

pub use analytics::AnalyticsService;
pub use artist_image_cache::ArtistImageCache;
pub use history_fetcher::HistoryFetcher;
pub use producer_attribution::ProducerAttribution;
