use serde::de::DeserializeOwned;
use std::collections::HashSet;

use super::client::DiscogsClient;
use crate::models::UserListsResponse;
use crate::utils::error::{AppError, Result};

/// A decoded response page that may link to a following page.
pub trait PagedResponse: DeserializeOwned {
    type Item;

    fn into_page(self) -> (Vec<Self::Item>, Option<String>);
}

impl PagedResponse for UserListsResponse {
    type Item = crate::models::WatchList;

    fn into_page(self) -> (Vec<Self::Item>, Option<String>) {
        (self.lists, self.pagination.urls.next)
    }
}

/// Follows `next` links from a start URL until the last page.
pub struct PaginationWalker<'a> {
    client: &'a DiscogsClient,
}

impl<'a> PaginationWalker<'a> {
    pub fn new(client: &'a DiscogsClient) -> Self {
        Self { client }
    }

    pub async fn walk_all<P: PagedResponse>(&self, start_url: &str) -> Result<Vec<P::Item>> {
        let mut items = Vec::new();
        let mut visited = HashSet::new();
        let mut url = start_url.to_string();
        let mut pages = 0usize;

        loop {
            visited.insert(url.clone());

            let page: P = self.client.fetch_json(&url).await?;
            let (page_items, next) = page.into_page();
            items.extend(page_items);
            pages += 1;

            match next.filter(|next| !next.is_empty()) {
                Some(next) if visited.contains(&next) => {
                    return Err(AppError::Protocol(format!(
                        "pagination made no progress: {} links back to {}",
                        url, next
                    )));
                }
                Some(next) => url = next,
                None => break,
            }
        }

        tracing::debug!("Walked {} page(s) from {}, {} item(s)", pages, start_url, items.len());
        Ok(items)
    }
}
