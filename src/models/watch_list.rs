use serde::{Deserialize, Serialize};

use super::null_as_empty;

/// A user list as returned by `GET /users/{username}/lists`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchList {
    pub id: u64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(rename = "uri", default)]
    pub url: String,
    #[serde(default)]
    pub resource_url: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub date_changed: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationUrls {
    pub first: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub last: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub items: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub urls: PaginationUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListsResponse {
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub lists: Vec<WatchList>,
}
