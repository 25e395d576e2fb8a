pub mod api;
pub mod config;
pub mod diff_engine;
pub mod dispatcher;
pub mod listing_fetcher;
pub mod logging;
pub mod models;
pub mod plugins;
pub mod poller;
pub mod scraper;
pub mod utils;
pub mod watchlist;
pub mod web;

// Re-export commonly used types
pub use api::{DiscogsClient, PaginationWalker, RateLimiter};
pub use config::AppConfig;
pub use diff_engine::{DiffEngine, Observation};
pub use dispatcher::NotificationDispatcher;
pub use listing_fetcher::ListingFetcher;
pub use poller::{CycleReport, Poller};
pub use scraper::{ListingParser, ListingScraper, WantCriteria};
pub use utils::error::{AppError, Result};
pub use watchlist::{WatchListFilter, WatchListSource};
