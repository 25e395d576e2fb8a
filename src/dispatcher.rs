use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::plugins::{NotificationEvent, NotifierPlugin};
use crate::utils::error::{AppError, Result};

#[derive(Debug, Default)]
pub struct DispatchStats {
    enqueued: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSnapshot {
    pub enqueued: u64,
    pub delivered: u64,
    pub failed: u64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Sending side of the notification queue, held by the poller.
#[derive(Clone)]
pub struct DispatchHandle {
    sender: mpsc::Sender<NotificationEvent>,
    stats: Arc<DispatchStats>,
}

impl DispatchHandle {
    /// Queue an event for delivery. Waits while the queue is full.
    pub async fn dispatch(&self, event: NotificationEvent) -> Result<()> {
        self.sender
            .send(event)
            .await
            .map_err(|_| AppError::NotificationDelivery("Notification queue is closed".into()))?;

        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Bounded queue drained by a fixed pool of workers sharing one notifier.
/// Delivery failures are logged and counted, never retried.
pub struct NotificationDispatcher {
    handle: DispatchHandle,
    workers: Vec<JoinHandle<()>>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn NotifierPlugin>, queue_size: usize, workers: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_size.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let stats = Arc::new(DispatchStats::default());

        let workers = (0..workers.max(1))
            .map(|worker| {
                let receiver = Arc::clone(&receiver);
                let notifier = Arc::clone(&notifier);
                let stats = Arc::clone(&stats);
                tokio::spawn(async move { run_worker(worker, receiver, notifier, stats).await })
            })
            .collect();

        Self {
            handle: DispatchHandle { sender, stats },
            workers,
        }
    }

    pub fn handle(&self) -> DispatchHandle {
        self.handle.clone()
    }

    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.handle.stats)
    }

    /// Close the queue and wait for queued events to be delivered. Every
    /// `DispatchHandle` must be dropped first or the workers never see the end
    /// of the queue.
    pub async fn shutdown(self) -> DispatchSnapshot {
        let stats = Arc::clone(&self.handle.stats);
        drop(self.handle);

        for result in futures::future::join_all(self.workers).await {
            if let Err(e) = result {
                tracing::error!("Notification worker panicked: {}", e);
            }
        }

        stats.snapshot()
    }
}

async fn run_worker(
    worker: usize,
    receiver: Arc<Mutex<mpsc::Receiver<NotificationEvent>>>,
    notifier: Arc<dyn NotifierPlugin>,
    stats: Arc<DispatchStats>,
) {
    loop {
        let event = receiver.lock().await.recv().await;
        let Some(event) = event else {
            break;
        };

        match notifier.notify(&event).await {
            Ok(result) if result.success => {
                stats.delivered.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("watcher_notifications_delivered_total").increment(1);
                tracing::debug!(
                    "Worker {} delivered notification for '{}' ({:?})",
                    worker,
                    event.name,
                    result.message_id
                );
            }
            Ok(result) => {
                record_failure(&stats);
                tracing::error!(
                    "Failed to notify about '{}': {}",
                    event.name,
                    result.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
            Err(e) => {
                record_failure(&stats);
                tracing::error!("Failed to notify about '{}': {}", event.name, e);
            }
        }
    }

    tracing::debug!("Notification worker {} stopped", worker);
}

fn record_failure(stats: &DispatchStats) {
    stats.failed.fetch_add(1, Ordering::Relaxed);
    metrics::counter!("watcher_notifications_failed_total").increment(1);
}
