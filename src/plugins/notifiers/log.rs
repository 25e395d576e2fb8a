use async_trait::async_trait;

use crate::plugins::traits::{NotificationEvent, NotificationResult, NotifierPlugin};
use crate::utils::error::Result;

/// Writes notifications to the log. Used when no SMTP server is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifierPlugin for LogNotifier {
    fn name(&self) -> &str {
        "Log Notifier"
    }

    fn plugin_type(&self) -> &str {
        "log"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult> {
        tracing::info!(
            release_id = event.release_id,
            num_for_sale = event.num_for_sale,
            price = %event.formatted_price,
            url = %event.url,
            "{}",
            event.subject()
        );

        Ok(NotificationResult::delivered(format!("log-{}", event.id)))
    }

    async fn test_connection(&self) -> Result<bool> {
        Ok(true)
    }
}
