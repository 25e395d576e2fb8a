use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use discogs_watcher::config::AppConfig;
use discogs_watcher::logging::init_logging;
use discogs_watcher::models::ConditionRank;
use discogs_watcher::scraper::{ListingScraper, WantCriteria, condition_of};
use discogs_watcher::web::{self, AppState};
use discogs_watcher::{DiscogsClient, NotificationDispatcher, Poller, RateLimiter, plugins};

#[derive(Parser)]
#[command(name = "discogs-watcher", version, about = "Watches Discogs lists for new marketplace listings")]
struct Cli {
    /// Configuration file. Defaults to config/default.toml plus overrides.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll watch-lists and notify on new listings (default)
    Run,
    /// Print the offers on one release's marketplace page
    Scrape {
        release_id: String,
        #[arg(long)]
        max_price: Option<i64>,
        /// Condition label ("Very Good Plus") or rank (1-9)
        #[arg(long, value_parser = parse_condition)]
        min_media: Option<ConditionRank>,
        #[arg(long, value_parser = parse_condition)]
        min_sleeve: Option<ConditionRank>,
        #[arg(long = "blocked-seller")]
        blocked_sellers: Vec<String>,
    },
}

fn parse_condition(value: &str) -> std::result::Result<ConditionRank, String> {
    match condition_of(value) {
        ConditionRank::Unknown => value
            .parse::<u8>()
            .ok()
            .map(ConditionRank::from_rank)
            .filter(|rank| *rank != ConditionRank::Unknown)
            .ok_or_else(|| format!("unknown condition '{}'", value)),
        rank => Ok(rank),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::from_env(),
    }
    .context("Failed to load configuration")?;

    let _log_guard = init_logging(&config.logging)?;

    if config.metrics.enabled {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], config.metrics.port))
            .install()
            .context("Failed to start metrics exporter")?;
        info!("Metrics exporter listening on port {}", config.metrics.port);
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config).await,
        Command::Scrape {
            release_id,
            max_price,
            min_media,
            min_sleeve,
            blocked_sellers,
        } => {
            let criteria = WantCriteria {
                max_price,
                min_media_condition: min_media.unwrap_or_default(),
                min_sleeve_condition: min_sleeve.unwrap_or_default(),
                blocked_sellers,
            };
            scrape(&config, &release_id, &criteria).await
        }
    }
}

async fn run(config: AppConfig) -> Result<()> {
    info!("Starting Discogs Watcher for user '{}'", config.discogs.username);

    let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
    info!("Discogs requests spaced {:?} apart", limiter.interval());
    let client = Arc::new(DiscogsClient::new(&config.discogs, limiter)?);

    let notifier = plugins::notifier_from_config(&config)?;
    match notifier.test_connection().await {
        Ok(true) => info!("Notifications via {}", notifier.name()),
        Ok(false) => warn!("{} could not connect; notifications may fail", notifier.name()),
        Err(e) => warn!("{}: {}", notifier.name(), e),
    }

    let dispatcher = NotificationDispatcher::new(
        notifier,
        config.notifications.queue_size,
        config.notifications.workers,
    );
    let mut poller = Poller::from_config(&config, client, dispatcher.handle())?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    let server = config.server.enabled.then(|| {
        let addr = format!("{}:{}", config.server.host, config.server.port);
        let state = AppState::new(poller.stats(), dispatcher.stats());
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { web::serve(&addr, state, shutdown).await })
    });

    let signal_tx = Arc::clone(&shutdown_tx);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down...");
            signal_tx.send_replace(true);
        }
    });

    let result = poller.run(shutdown_rx).await;
    shutdown_tx.send_replace(true);

    drop(poller);
    let dispatched = dispatcher.shutdown().await;
    info!(
        delivered = dispatched.delivered,
        failed = dispatched.failed,
        "Notification queue drained"
    );

    if let Some(server) = server {
        match server.await {
            Ok(Err(e)) => warn!("Health endpoint failed: {}", e),
            Err(e) => warn!("Health endpoint task panicked: {}", e),
            Ok(Ok(())) => {}
        }
    }

    result.context("Polling stopped")
}

async fn scrape(config: &AppConfig, release_id: &str, criteria: &WantCriteria) -> Result<()> {
    let scraper = ListingScraper::new(&config.scraper)?;
    let listings = scraper.scrape_release(release_id).await?;
    let total = listings.len();

    info!(
        "Wanting media {} or better, sleeve {} or better",
        criteria.min_media_condition.label(),
        criteria.min_sleeve_condition.label()
    );
    let wanted = criteria.filter(listings);
    info!("{} of {} listing(s) match", wanted.len(), total);

    println!("{}", serde_json::to_string_pretty(&wanted)?);
    Ok(())
}
