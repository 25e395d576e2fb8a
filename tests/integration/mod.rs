// Integration tests for Discogs Watcher
// These tests drive the public API against a mocked Discogs server

pub mod poller_tests;
pub mod scrape_tests;
pub mod status_tests;

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use discogs_watcher::config::{
    AppConfig, DiscogsConfig, LoggingConfig, MetricsConfig, NotificationsConfig, PollerConfig, RateLimitConfig,
    ScraperConfig, ServerConfig, SmtpConfig,
};
use discogs_watcher::plugins::{NotificationEvent, NotificationResult, NotifierPlugin};

/// Test configuration for integration tests
pub fn get_test_config(base_url: &str) -> AppConfig {
    AppConfig {
        discogs: DiscogsConfig {
            api_base_url: base_url.to_string(),
            username: "digger".to_string(),
            token: "MY_TOKEN".to_string(),
            currency: Some("AUD".to_string()),
            user_agent: "DiscogsWatcher-Test/1.0".to_string(),
            request_timeout: 5,
            notify_tag: "notify_me".to_string(),
        },
        rate_limit: RateLimitConfig {
            requests: 1000,
            window_secs: 1,
        },
        poller: PollerConfig {
            cycle_delay_ms: 20,
            watchlist_retry_attempts: 1,
            watchlist_retry_delay_ms: 2,
        },
        notifications: NotificationsConfig {
            queue_size: 8,
            workers: 1,
            to_address: None,
            smtp: SmtpConfig {
                host: String::new(),
                port: 587,
                username: None,
                password: None,
                from_address: None,
                from_name: "Discogs Watcher Test".to_string(),
                use_tls: false,
                implicit_tls: false,
            },
        },
        scraper: ScraperConfig {
            base_url: base_url.to_string(),
            user_agent: "DiscogsWatcher-Test/1.0".to_string(),
            request_timeout: 5,
        },
        server: ServerConfig {
            enabled: false,
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            json: false,
            directory: None,
        },
        metrics: MetricsConfig {
            enabled: false,
            port: 9001,
        },
    }
}

/// Keeps every event it is asked to deliver.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifierPlugin for RecordingNotifier {
    fn name(&self) -> &str {
        "Recording Notifier"
    }

    fn plugin_type(&self) -> &str {
        "recording"
    }

    async fn notify(&self, event: &NotificationEvent) -> discogs_watcher::Result<NotificationResult> {
        self.events.lock().unwrap().push(event.clone());
        Ok(NotificationResult::delivered(event.id.to_string()))
    }

    async fn test_connection(&self) -> discogs_watcher::Result<bool> {
        Ok(true)
    }
}

pub fn list_item(id: u64, comment: &str) -> Value {
    json!({
        "id": id,
        "display_title": format!("Test Item {}", id),
        "uri": format!("https://www.discogs.com/release/{}", id),
        "resource_url": format!("https://api.discogs.com/releases/{}", id),
        "comment": comment,
        "type": "release"
    })
}

pub fn stats_body(num_for_sale: u32, lowest_price: f64) -> Value {
    json!({
        "lowest_price": { "currency": "AUD", "value": lowest_price },
        "num_for_sale": num_for_sale,
        "blocked_from_sale": false
    })
}

/// Two pages of lists: one opted in on each page, plus one that is not.
pub async fn mount_watch_lists(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users/digger/lists"))
        .and(header("Authorization", "Discogs token=MY_TOKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pagination": {
                "page": 1, "pages": 2, "per_page": 2, "items": 3,
                "urls": { "next": format!("{}/users/digger/lists/page2", server.uri()) }
            },
            "lists": [
                { "id": 7, "name": "Wanted", "description": "notify_me",
                  "resource_url": format!("{}/lists/7", server.uri()) },
                { "id": 8, "name": "Collection", "description": "mine",
                  "resource_url": format!("{}/lists/8", server.uri()) }
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/digger/lists/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pagination": { "page": 2, "pages": 2, "urls": { "next": "" } },
            "lists": [
                { "id": 9, "name": "Cheap", "description": "bargains, notify_me please",
                  "resource_url": format!("{}/lists/9", server.uri()) }
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/lists/8"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

pub async fn mount_list(server: &MockServer, list_id: u64, items: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/lists/{}", list_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": list_id,
            "name": format!("List {}", list_id),
            "items": items
        })))
        .mount(server)
        .await;
}

/// Serve `first` once, then `later` for every following request.
pub async fn mount_stats(server: &MockServer, release_id: u64, first: Value, later: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/marketplace/stats/{}", release_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(first))
        .up_to_n_times(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/marketplace/stats/{}", release_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(later))
        .mount(server)
        .await;
}

/// Helper to wait for async operations
pub async fn wait_for_condition<F>(mut condition: F, timeout_seconds: u64) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_secs(timeout_seconds);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    false
}
