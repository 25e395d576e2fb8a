use std::sync::Arc;
use url::Url;

use crate::api::{DiscogsClient, PaginationWalker, join_url};
use crate::models::{UserListsResponse, WatchList};
use crate::utils::error::Result;

/// Keeps the lists whose description opts into notifications.
#[derive(Debug, Clone)]
pub struct WatchListFilter {
    marker: String,
}

impl WatchListFilter {
    pub fn new(marker: impl Into<String>) -> Self {
        Self { marker: marker.into() }
    }

    /// Case-sensitive substring match, not a word match.
    pub fn is_opted_in(&self, list: &WatchList) -> bool {
        list.description.contains(&self.marker)
    }

    pub fn filter(&self, lists: Vec<WatchList>) -> Vec<WatchList> {
        lists.into_iter().filter(|list| self.is_opted_in(list)).collect()
    }
}

impl Default for WatchListFilter {
    fn default() -> Self {
        Self::new("notify_me")
    }
}

/// Fetches every page of a user's lists and keeps the opted-in ones.
pub struct WatchListSource {
    client: Arc<DiscogsClient>,
    user_lists_url: Url,
    filter: WatchListFilter,
}

impl WatchListSource {
    pub fn new(client: Arc<DiscogsClient>, api_base_url: &str, username: &str, filter: WatchListFilter) -> Result<Self> {
        let user_lists_url = join_url(api_base_url, &format!("users/{}/lists", username))?;

        Ok(Self {
            client,
            user_lists_url,
            filter,
        })
    }

    pub fn user_lists_url(&self) -> &Url {
        &self.user_lists_url
    }

    pub async fn fetch(&self) -> Result<Vec<WatchList>> {
        let lists = PaginationWalker::new(&self.client)
            .walk_all::<UserListsResponse>(self.user_lists_url.as_str())
            .await?;
        let total = lists.len();

        let watched = self.filter.filter(lists);
        tracing::debug!("{} of {} list(s) opted in for notifications", watched.len(), total);
        Ok(watched)
    }
}
