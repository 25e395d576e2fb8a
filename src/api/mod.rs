pub mod client;
pub mod pagination;
pub mod rate_limiter;

pub use client::{DiscogsClient, RawResponse};
pub use pagination::{PagedResponse, PaginationWalker};
pub use rate_limiter::RateLimiter;

use url::Url;

use crate::utils::error::Result;

/// Join `path` onto `base`, treating `base` as a directory even without a
/// trailing slash.
pub fn join_url(base: &str, path: &str) -> Result<Url> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    Ok(base.join(path.trim_start_matches('/'))?)
}
