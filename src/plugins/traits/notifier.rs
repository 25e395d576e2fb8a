use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::MarketSnapshot;
use crate::utils::error::Result;

/// A release whose supply grew past its previous count within its price limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub id: Uuid,
    pub release_id: u64,
    pub name: String,
    pub url: String,
    pub num_for_sale: u32,
    pub previous_num_for_sale: u32,
    /// Lowest price with its currency, e.g. "30 AUD".
    pub formatted_price: String,
    /// Threshold read from the list comment, if one was set.
    pub threshold: Option<String>,
    pub detected_at: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(current: &MarketSnapshot, previous_num_for_sale: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            release_id: current.id,
            name: current.name.clone(),
            url: current.url.clone(),
            num_for_sale: current.num_for_sale,
            previous_num_for_sale,
            formatted_price: current.formatted_price(),
            threshold: current
                .has_threshold()
                .then(|| current.minimum_price.normalize().to_string()),
            detected_at: Utc::now(),
        }
    }

    pub fn subject(&self) -> String {
        format!("New {} listed!", self.name)
    }

    pub fn new_listings(&self) -> u32 {
        self.num_for_sale.saturating_sub(self.previous_num_for_sale)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl NotificationResult {
    pub fn delivered(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Trait for implementing notification methods (email, log output)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    fn name(&self) -> &str;
    fn plugin_type(&self) -> &str;

    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult>;
    async fn test_connection(&self) -> Result<bool>;
}
