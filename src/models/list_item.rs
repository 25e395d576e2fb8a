use serde::{Deserialize, Serialize};

use super::null_as_empty;

/// One entry of a user list. `comment` may carry a minimum price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListItem {
    pub id: u64,
    #[serde(rename = "display_title")]
    pub title: String,
    #[serde(rename = "uri", default)]
    pub url: String,
    #[serde(default)]
    pub resource_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub comment: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Body of `GET /lists/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub resource_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(rename = "created_ts", default)]
    pub date_added: Option<String>,
    #[serde(rename = "modified_ts", default)]
    pub date_changed: Option<String>,
    #[serde(default)]
    pub items: Vec<ListItem>,
}
