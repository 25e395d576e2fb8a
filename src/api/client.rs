use reqwest::header::{AUTHORIZATION, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use super::rate_limiter::RateLimiter;
use crate::config::DiscogsConfig;
use crate::utils::error::{AppError, Result};

/// Undecoded body of a successful API call.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub url: String,
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| AppError::Decode {
            url: self.url.clone(),
            message: e.to_string(),
        })
    }
}

/// Authenticated, rate-limited access to the Discogs API.
pub struct DiscogsClient {
    client: Client,
    authorization: String,
    user_agent: String,
    limiter: Arc<RateLimiter>,
}

impl DiscogsClient {
    pub fn new(config: &DiscogsConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| AppError::Transport {
                url: config.api_base_url.clone(),
                source: e,
            })?;

        Ok(Self {
            client,
            authorization: format!("Discogs token={}", config.token),
            user_agent: config.user_agent.clone(),
            limiter,
        })
    }

    /// Issue an authorized GET. A rate-limit slot is only taken once the request
    /// has been built, so malformed requests never cost a slot.
    pub async fn fetch(&self, url: &str) -> Result<RawResponse> {
        let authorization = HeaderValue::from_str(&self.authorization)
            .map_err(|e| AppError::parse(format!("Invalid authorization header: {}", e)))?;

        let request = self
            .client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .header(USER_AGENT, self.user_agent.as_str())
            .build()
            .map_err(|e| AppError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        self.limiter.acquire().await;
        metrics::counter!("watcher_api_requests_total").increment(1);
        tracing::trace!("GET {}", url);

        let response = self.client.execute(request).await.map_err(|e| AppError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            metrics::counter!("watcher_api_errors_total").increment(1);
            return Err(AppError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| AppError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        Ok(RawResponse {
            url: url.to_string(),
            status,
            body,
        })
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.fetch(url).await?.decode()
    }
}
