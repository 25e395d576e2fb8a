use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

use crate::api::{DiscogsClient, join_url};
use crate::models::{ListItem, ListResponse, MarketResponse, MarketSnapshot, WatchList};
use crate::utils::error::{AppError, Result};

/// Reads list contents and per-release marketplace statistics.
pub struct ListingFetcher {
    client: Arc<DiscogsClient>,
    stats_url: Url,
    currency: Option<String>,
}

impl ListingFetcher {
    pub fn new(client: Arc<DiscogsClient>, api_base_url: &str, currency: Option<String>) -> Result<Self> {
        Ok(Self {
            client,
            stats_url: join_url(api_base_url, "marketplace/stats/")?,
            currency,
        })
    }

    /// Items of one list. List contents come back in a single response and are
    /// not paginated, unlike the lists themselves.
    pub async fn items_of(&self, list: &WatchList) -> Result<Vec<ListItem>> {
        let response: ListResponse = self.client.fetch_json(&list.resource_url).await?;
        Ok(response.items)
    }

    pub async fn market_stats_of(&self, item: &ListItem) -> Result<MarketSnapshot> {
        let url = self.stats_url_for(item.id)?;
        let response: MarketResponse = self.client.fetch_json(url.as_str()).await?;

        if response.blocked {
            tracing::debug!("Release {} ('{}') is blocked from sale", item.id, item.title);
        }

        let minimum_price = parse_comment(&item.comment)?;

        Ok(MarketSnapshot::new(item, &response, minimum_price))
    }

    fn stats_url_for(&self, release_id: u64) -> Result<Url> {
        let mut url = self.stats_url.join(&release_id.to_string())?;
        if let Some(currency) = &self.currency {
            url.query_pairs_mut().append_pair("curr_abbr", currency);
        }
        Ok(url)
    }
}

/// Read a minimum price out of a list item comment. An empty comment means no
/// threshold; anything that is not a plain number is rejected.
pub fn parse_comment(comment: &str) -> Result<Decimal> {
    let comment = comment.trim();
    if comment.is_empty() {
        return Ok(Decimal::ZERO);
    }

    Decimal::from_str(comment)
        .or_else(|_| Decimal::from_scientific(comment))
        .map_err(|_| AppError::ThresholdParse {
            comment: comment.to_string(),
        })
}
