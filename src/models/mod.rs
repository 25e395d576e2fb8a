use serde::{Deserialize, Deserializer};

pub mod watch_list;
pub mod list_item;
pub mod market;
pub mod listing;

// Re-exports for convenience
pub use watch_list::*;
pub use list_item::*;
pub use market::*;
pub use listing::*;

/// Discogs sends missing optional text either as `null` or omits it.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
