use super::*;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use discogs_watcher::web::{AppState, StatusResponse, create_router};
use discogs_watcher::{DiscogsClient, NotificationDispatcher, Poller, RateLimiter};
use tokio::sync::watch;
use tower::ServiceExt;

#[tokio::test]
async fn test_status_reflects_poll_cycles() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_watch_lists(&server).await;
    mount_list(&server, 7, vec![list_item(1, "")]).await;
    mount_list(&server, 9, Vec::new()).await;
    mount_stats(&server, 1, stats_body(3, 30.0), stats_body(3, 30.0)).await;

    let config = get_test_config(&server.uri());
    let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
    let client = Arc::new(DiscogsClient::new(&config.discogs, limiter)?);
    let dispatcher = NotificationDispatcher::new(Arc::new(RecordingNotifier::default()), 8, 1);
    let mut poller = Poller::from_config(&config, client, dispatcher.handle())?;

    let (_tx, shutdown) = watch::channel(false);
    poller.run_cycle(&shutdown).await?;

    let app = create_router(AppState::new(poller.stats(), dispatcher.stats()));
    let response = app
        .oneshot(Request::builder().uri("/status").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let status: StatusResponse = serde_json::from_slice(&body)?;
    assert_eq!(status.poll.cycles, 1);
    assert_eq!(status.poll.items_checked, 1);
    assert_eq!(status.poll.notifications, 0);
    assert!(status.poll.last_cycle_at.is_some());
    assert_eq!(status.notifications.enqueued, 0);

    Ok(())
}

#[tokio::test]
async fn test_health_endpoint_over_tcp() -> anyhow::Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);

    let dispatcher = NotificationDispatcher::new(Arc::new(RecordingNotifier::default()), 1, 1);
    let state = AppState::new(Default::default(), dispatcher.stats());
    let (tx, shutdown) = watch::channel(false);
    let server = tokio::spawn(async move { discogs_watcher::web::serve(&addr.to_string(), state, shutdown).await });

    let url = format!("http://{}/health", addr);
    let mut body = None;
    for _ in 0..50 {
        if let Ok(response) = reqwest::get(&url).await {
            body = Some(response.text().await?);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(body.as_deref(), Some("OK"));

    tx.send(true)?;
    server.await??;
    Ok(())
}
