// src/crawl/fetch.rs
// =============================================================================
// Single-request fetchers built on top of ContentApi.
//
// - fetch_node:    the full record for one item id
// - fetch_listing: one page of an item's children
//
// Both return the error to the caller; deciding whether a failure is fatal
// for the traversal is the crawler's job.
// =============================================================================

use crate::error::FetchError;
use crate::remote::{ContentApi, ItemRecord, ListingPage};

// Fetches the full record for one item
//
// Exactly one item is expected. More than one is logged and the first is
// used; none at all means there is nothing to export.
pub async fn fetch_node<A>(api: &A, id: &str) -> Result<ItemRecord, FetchError>
where
    A: ContentApi + ?Sized,
{
    let envelope = api.fetch_item(id).await?;

    let count = envelope.items().len();
    if count != 1 || envelope.total_count() != 1 {
        tracing::warn!(
            id = id,
            items = count,
            total = envelope.total_count(),
            "wrong number of items returned"
        );
    }

    envelope
        .into_items()
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Missing(id.to_string()))
}

/// Fetches page `page` (zero based) of `parent_id`'s children.
pub async fn fetch_listing<A>(
    api: &A,
    parent_id: &str,
    page: u32,
    page_size: u32,
) -> Result<ListingPage, FetchError>
where
    A: ContentApi + ?Sized,
{
    let envelope = api.fetch_children(parent_id, page, page_size).await?;
    Ok(ListingPage::from_envelope(page, page_size, envelope))
}
