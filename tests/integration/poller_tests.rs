use super::*;
use discogs_watcher::{DiscogsClient, NotificationDispatcher, Poller, RateLimiter};
use tokio::sync::watch;

fn build_client(config: &AppConfig) -> Arc<DiscogsClient> {
    let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
    Arc::new(DiscogsClient::new(&config.discogs, limiter).unwrap())
}

async fn mount_marketplace(server: &MockServer) {
    mount_watch_lists(server).await;
    mount_list(server, 7, vec![list_item(1, ""), list_item(2, "40")]).await;
    mount_list(server, 9, vec![list_item(3, "oops 5")]).await;

    mount_stats(server, 1, stats_body(3, 30.0), stats_body(4, 30.0)).await;
    mount_stats(server, 2, stats_body(1, 55.5), stats_body(2, 39.99)).await;
    mount_stats(server, 3, stats_body(1, 1.0), stats_body(9, 1.0)).await;
}

#[tokio::test]
async fn test_first_cycle_walks_all_pages_without_notifying() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_marketplace(&server).await;

    let config = get_test_config(&server.uri());
    let notifier = RecordingNotifier::default();
    let dispatcher = NotificationDispatcher::new(Arc::new(notifier.clone()), 8, 1);
    let mut poller = Poller::from_config(&config, build_client(&config), dispatcher.handle())?;

    let (_tx, shutdown) = watch::channel(false);
    let report = poller.run_cycle(&shutdown).await?;

    // Lists 7 and 9 opted in across both pages; item 3 has an unusable comment.
    assert_eq!(report.lists, 2);
    assert_eq!(report.items, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.notifications, 0);

    drop(poller);
    dispatcher.shutdown().await;
    assert!(notifier.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_run_notifies_once_per_supply_increase() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_marketplace(&server).await;

    let config = get_test_config(&server.uri());
    let notifier = RecordingNotifier::default();
    let dispatcher = NotificationDispatcher::new(Arc::new(notifier.clone()), 8, 1);
    let mut poller = Poller::from_config(&config, build_client(&config), dispatcher.handle())?;
    let poll_stats = poller.stats();

    let (tx, shutdown) = watch::channel(false);
    let task = tokio::spawn(async move { poller.run(shutdown).await });

    let notified = wait_for_condition(|| notifier.events().len() >= 2, 10).await;
    assert!(notified, "expected two notifications");
    // Let a few more cycles pass with unchanged counts.
    let cycles_seen = poll_stats.snapshot().cycles;
    assert!(wait_for_condition(|| poll_stats.snapshot().cycles >= cycles_seen + 2, 10).await);

    tx.send(true)?;
    task.await??;

    let stats = dispatcher.shutdown().await;
    assert_eq!(stats.delivered, 2);

    let mut events = notifier.events();
    events.sort_by_key(|event| event.release_id);
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].release_id, 1);
    assert_eq!(events[0].previous_num_for_sale, 3);
    assert_eq!(events[0].num_for_sale, 4);
    assert!(events[0].threshold.is_none());

    assert_eq!(events[1].release_id, 2);
    assert_eq!(events[1].formatted_price, "39.99 AUD");
    assert_eq!(events[1].threshold.as_deref(), Some("40"));
    assert_eq!(events[1].subject(), "New Test Item 2 listed!");

    Ok(())
}

#[tokio::test]
async fn test_run_fails_when_watch_lists_unavailable() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/digger/lists"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = get_test_config(&server.uri());
    let dispatcher = NotificationDispatcher::new(Arc::new(RecordingNotifier::default()), 8, 1);
    let mut poller = Poller::from_config(&config, build_client(&config), dispatcher.handle())?;

    let (_tx, shutdown) = watch::channel(false);
    let result = poller.run(shutdown).await;

    assert!(matches!(
        result,
        Err(discogs_watcher::AppError::UnexpectedStatus { status: 401, .. })
    ));
    Ok(())
}
