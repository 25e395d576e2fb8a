use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ListItem;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowestPrice {
    pub currency: String,
    pub value: Decimal,
}

/// Body of `GET /marketplace/stats/{release_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketResponse {
    #[serde(default)]
    pub lowest_price: Option<LowestPrice>,
    #[serde(default)]
    pub num_for_sale: Option<u32>,
    #[serde(rename = "blocked_from_sale", default)]
    pub blocked: bool,
}

/// Observed marketplace state of one list item during one poll cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarketSnapshot {
    pub id: u64,
    pub num_for_sale: u32,
    /// Zero means no threshold was set on the list item.
    pub minimum_price: Decimal,
    pub lowest_price: Option<Decimal>,
    pub currency: Option<String>,
    pub name: String,
    pub url: String,
}

impl MarketSnapshot {
    pub fn new(item: &ListItem, response: &MarketResponse, minimum_price: Decimal) -> Self {
        Self {
            id: item.id,
            num_for_sale: response.num_for_sale.unwrap_or(0),
            minimum_price,
            lowest_price: response.lowest_price.as_ref().map(|p| p.value),
            currency: response.lowest_price.as_ref().map(|p| p.currency.clone()),
            name: item.title.clone(),
            url: item.url.clone(),
        }
    }

    pub fn has_threshold(&self) -> bool {
        self.minimum_price > Decimal::ZERO
    }

    pub fn formatted_price(&self) -> String {
        match (&self.lowest_price, &self.currency) {
            (Some(price), Some(currency)) => format!("{} {}", price.round_dp(2), currency),
            (Some(price), None) => price.round_dp(2).to_string(),
            _ => "unknown".to_string(),
        }
    }
}
