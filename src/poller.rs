use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::api::DiscogsClient;
use crate::config::{AppConfig, PollerConfig};
use crate::diff_engine::{DiffEngine, Observation};
use crate::dispatcher::DispatchHandle;
use crate::listing_fetcher::ListingFetcher;
use crate::models::{ListItem, WatchList};
use crate::plugins::NotificationEvent;
use crate::utils::error::Result;
use crate::watchlist::{WatchListFilter, WatchListSource};

/// What happened during one pass over the watch-lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub lists: usize,
    pub items: usize,
    pub skipped: usize,
    pub notifications: usize,
    /// Shutdown was requested before every item was checked.
    pub interrupted: bool,
}

#[derive(Debug, Default)]
pub struct PollStats {
    cycles: AtomicU64,
    items_checked: AtomicU64,
    skipped: AtomicU64,
    notifications: AtomicU64,
    last_cycle_at: AtomicI64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSnapshot {
    pub cycles: u64,
    pub items_checked: u64,
    pub skipped: u64,
    pub notifications: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

impl PollStats {
    fn record(&self, report: &CycleReport) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.items_checked.fetch_add(report.items as u64, Ordering::Relaxed);
        self.skipped.fetch_add(report.skipped as u64, Ordering::Relaxed);
        self.notifications.fetch_add(report.notifications as u64, Ordering::Relaxed);
        self.last_cycle_at.store(Utc::now().timestamp(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PollSnapshot {
        let last_cycle_at = match self.last_cycle_at.load(Ordering::Relaxed) {
            0 => None,
            secs => DateTime::from_timestamp(secs, 0),
        };

        PollSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            items_checked: self.items_checked.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
            last_cycle_at,
        }
    }
}

/// Single sequential worker that walks every watched list each cycle and feeds
/// marketplace stats through the diff engine.
pub struct Poller {
    watch_lists: WatchListSource,
    listings: ListingFetcher,
    diff: DiffEngine,
    notifications: DispatchHandle,
    config: PollerConfig,
    stats: Arc<PollStats>,
}

impl Poller {
    pub fn new(
        watch_lists: WatchListSource,
        listings: ListingFetcher,
        notifications: DispatchHandle,
        config: PollerConfig,
    ) -> Self {
        Self {
            watch_lists,
            listings,
            diff: DiffEngine::new(),
            notifications,
            config,
            stats: Arc::new(PollStats::default()),
        }
    }

    pub fn from_config(config: &AppConfig, client: Arc<DiscogsClient>, notifications: DispatchHandle) -> Result<Self> {
        let discogs = &config.discogs;

        let watch_lists = WatchListSource::new(
            Arc::clone(&client),
            &discogs.api_base_url,
            &discogs.username,
            WatchListFilter::new(discogs.notify_tag.clone()),
        )?;
        let listings = ListingFetcher::new(client, &discogs.api_base_url, discogs.currency.clone())?;

        Ok(Self::new(watch_lists, listings, notifications, config.poller.clone()))
    }

    pub fn stats(&self) -> Arc<PollStats> {
        Arc::clone(&self.stats)
    }

    pub fn diff_engine(&self) -> &DiffEngine {
        &self.diff
    }

    /// Poll until `shutdown` turns true. Returns an error only when the
    /// watch-lists cannot be fetched after retrying.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        tracing::info!("Polling watch-lists from {}", self.watch_lists.user_lists_url());

        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = self.run_cycle(&shutdown).await?;
            tracing::info!(
                lists = report.lists,
                items = report.items,
                skipped = report.skipped,
                notifications = report.notifications,
                "Poll cycle finished"
            );

            if report.interrupted {
                break;
            }

            if self.config.cycle_delay_ms > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(self.config.cycle_delay_ms)) => {}
                    _ = shutdown.changed() => {}
                }
            }
        }

        tracing::info!("Poller stopped");
        Ok(())
    }

    pub async fn run_cycle(&mut self, shutdown: &watch::Receiver<bool>) -> Result<CycleReport> {
        let lists = self.fetch_watch_lists().await?;
        let mut report = CycleReport {
            lists: lists.len(),
            ..Default::default()
        };

        'lists: for list in &lists {
            if *shutdown.borrow() {
                report.interrupted = true;
                break;
            }

            let items = match self.listings.items_of(list).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(list_id = list.id, list = %list.name, "Skipping list: {}", e);
                    report.skipped += 1;
                    continue;
                }
            };
            tracing::debug!(list_id = list.id, "Fetched {} item(s) from list '{}'", items.len(), list.name);

            for item in &items {
                if *shutdown.borrow() {
                    report.interrupted = true;
                    break 'lists;
                }

                report.items += 1;
                match self.check_item(list, item).await {
                    Ok(true) => report.notifications += 1,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(
                            list_id = list.id,
                            item_id = item.id,
                            item = %item.title,
                            "Skipping item: {}",
                            e
                        );
                        report.skipped += 1;
                    }
                }
            }
        }

        metrics::counter!("watcher_poll_cycles_total").increment(1);
        metrics::counter!("watcher_skipped_units_total").increment(report.skipped as u64);
        self.stats.record(&report);
        Ok(report)
    }

    /// Returns whether a notification was queued for the item.
    async fn check_item(&mut self, list: &WatchList, item: &ListItem) -> Result<bool> {
        let snapshot = self.listings.market_stats_of(item).await?;
        let previous_num_for_sale = self.diff.previous(snapshot.id).map(|p| p.num_for_sale);

        match self.diff.observe(snapshot.clone()) {
            Observation::FirstSeen => {
                tracing::debug!(item_id = item.id, "First observation of '{}'", item.title);
                Ok(false)
            }
            Observation::Unchanged => Ok(false),
            Observation::Notify => {
                tracing::info!(
                    list_id = list.id,
                    item_id = item.id,
                    num_for_sale = snapshot.num_for_sale,
                    price = %snapshot.formatted_price(),
                    "New listing for '{}'",
                    snapshot.name
                );

                let event = NotificationEvent::new(&snapshot, previous_num_for_sale.unwrap_or_default());
                self.notifications.dispatch(event).await?;
                metrics::counter!("watcher_notifications_enqueued_total").increment(1);
                Ok(true)
            }
        }
    }

    async fn fetch_watch_lists(&self) -> Result<Vec<WatchList>> {
        let factor = (self.config.watchlist_retry_delay_ms / 2).max(1);
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(Duration::from_secs(60))
            .map(jitter)
            .take(self.config.watchlist_retry_attempts);

        let source = &self.watch_lists;
        let mut attempt = 0;
        Retry::start(strategy, || {
            attempt += 1;
            if attempt > 1 {
                tracing::warn!("Retrying watch-list fetch (attempt {})", attempt);
            }
            source.fetch()
        })
        .await
    }
}
