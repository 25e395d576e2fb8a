use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

use crate::config::ScraperConfig;
use crate::models::{CONDITION_LABELS, ConditionRank, ListedItem};
use crate::utils::error::{AppError, Result};

static PRICE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(\.[0-9][0-9]?)?").expect("static price pattern"));

/// Rank of the first condition label found in `text`, longest labels first.
pub fn condition_of(text: &str) -> ConditionRank {
    CONDITION_LABELS
        .iter()
        .find(|(label, _)| text.contains(label))
        .map(|(_, rank)| *rank)
        .unwrap_or_default()
}

/// First number in `text` with its decimal point dropped: "€12.50" is 1250.
/// Whole amounts ("€12") stay unscaled, matching how the marketplace pages
/// are read elsewhere.
pub fn price_of(text: &str) -> Result<i64> {
    let matched = PRICE_REGEX
        .find(text)
        .ok_or_else(|| AppError::parse(format!("No price found in '{}'", text.trim())))?;

    matched
        .as_str()
        .replace('.', "")
        .parse::<i64>()
        .map_err(|e| AppError::parse(format!("Invalid price '{}': {}", matched.as_str(), e)))
}

/// Share of the converted total that belongs to the item itself:
/// `raw / (raw + shipping) * converted`, truncated.
pub fn proportional_price(raw: i64, shipping: i64, converted: i64) -> Result<i64> {
    let total = raw as i128 + shipping as i128;
    if total == 0 {
        return Err(AppError::parse("Item and shipping price are both zero"));
    }

    let price = raw as i128 * converted as i128 / total;
    i64::try_from(price).map_err(|_| AppError::parse(format!("Reconstructed price {} out of range", price)))
}

pub fn reconstruct_price(raw_text: &str, shipping_text: &str, converted_text: &str) -> Result<i64> {
    let raw = price_of(raw_text)?;
    let shipping = price_of(shipping_text)?;
    let converted = price_of(converted_text)?;

    proportional_price(raw, shipping, converted)
}

/// Reads seller offers out of a release's marketplace page.
pub struct ListingParser {
    entry: Selector,
    title_link: Selector,
    media_condition: Selector,
    sleeve_condition: Selector,
    price: Selector,
    shipping: Selector,
    converted_price: Selector,
    seller: Selector,
    location: Selector,
}

impl Default for ListingParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingParser {
    pub fn new() -> Self {
        let selector = |css: &str| Selector::parse(css).expect("static listing selector");

        Self {
            entry: selector(".shortcut_navigable:not(.unavailable)"),
            title_link: selector(".item_description_title"),
            media_condition: selector(".item_condition span:nth-child(3)"),
            sleeve_condition: selector(".item_condition span:nth-child(7)"),
            price: selector(".price"),
            shipping: selector(".item_shipping"),
            converted_price: selector(".converted_price"),
            seller: selector(".seller_info li:nth-child(1) strong"),
            location: selector(".seller_info li:nth-child(3)"),
        }
    }

    /// Every available offer on the page, in document order. Offers without an
    /// id link or a usable price are skipped.
    pub fn extract_listings(&self, document: &Html) -> Vec<ListedItem> {
        let mut items = Vec::new();

        for (index, entry) in document.select(&self.entry).enumerate() {
            let Some(href) = entry
                .select(&self.title_link)
                .next()
                .and_then(|link| link.value().attr("href"))
            else {
                tracing::warn!("Missing href when finding item id (entry {})", index);
                continue;
            };

            let id = href.replace("/sell/item/", "");

            let price = match reconstruct_price(
                &text_of(entry, &self.price),
                &text_of(entry, &self.shipping),
                &text_of(entry, &self.converted_price),
            ) {
                Ok(price) => price,
                Err(e) => {
                    tracing::warn!("Skipping listing {}: {}", id, e);
                    continue;
                }
            };

            items.push(ListedItem {
                id,
                seller: text_of(entry, &self.seller).trim().to_string(),
                location: text_of(entry, &self.location)
                    .replace("Ships From:", "")
                    .trim()
                    .to_string(),
                price,
                media_condition: condition_of(&text_of(entry, &self.media_condition)),
                sleeve_condition: condition_of(&text_of(entry, &self.sleeve_condition)),
            });
        }

        items
    }

    pub fn parse_page(&self, html: &str) -> Vec<ListedItem> {
        self.extract_listings(&Html::parse_document(html))
    }
}

fn text_of(entry: ElementRef<'_>, selector: &Selector) -> String {
    entry.select(selector).flat_map(|element| element.text()).collect()
}

/// Limits applied to scraped offers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WantCriteria {
    pub max_price: Option<i64>,
    pub min_media_condition: ConditionRank,
    pub min_sleeve_condition: ConditionRank,
    pub blocked_sellers: Vec<String>,
}

impl WantCriteria {
    pub fn matches(&self, item: &ListedItem) -> bool {
        if self.max_price.is_some_and(|max| item.price > max) {
            return false;
        }

        if item.media_condition < self.min_media_condition || item.sleeve_condition < self.min_sleeve_condition {
            return false;
        }

        !self
            .blocked_sellers
            .iter()
            .any(|seller| seller.eq_ignore_ascii_case(&item.seller))
    }

    pub fn filter(&self, items: Vec<ListedItem>) -> Vec<ListedItem> {
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

/// Fetches marketplace pages over plain HTTP.
pub struct ListingScraper {
    client: Client,
    base_url: String,
    parser: ListingParser,
}

impl ListingScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| AppError::Transport {
                url: config.base_url.clone(),
                source: e,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            parser: ListingParser::new(),
        })
    }

    /// Fetch and parse one page. Anything but a 2xx response is an error.
    pub async fn fetch_document(&self, url: &str) -> Result<Html> {
        let response = self.client.get(url).send().await.map_err(|e| AppError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| AppError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        Ok(Html::parse_document(&body))
    }

    pub async fn scrape_release(&self, release_id: &str) -> Result<Vec<ListedItem>> {
        let url = format!("{}/sell/release/{}", self.base_url, release_id);
        let document = self.fetch_document(&url).await?;

        let items = self.parser.extract_listings(&document);
        tracing::debug!("Scraped {} listing(s) from {}", items.len(), url);
        Ok(items)
    }
}
