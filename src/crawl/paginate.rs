// src/crawl/paginate.rs
// =============================================================================
// Child enumeration across listing pages.
//
// How it works:
// 1. Request page 0, 1, 2, ... of the parent's children
// 2. The first page that decodes fixes the expected total
// 3. Stop once the children collected reach that total, or as soon as a page
//    brings nothing new (the remote total is not always truthful)
//
// Partial failure:
// - A remote-fault page is logged, counted once, and treated as if it had
//   covered a full page; the next page is still requested
// - A fault before any total is known ends the enumeration (nothing to
//   measure progress against)
// - Transport / decode failures end the enumeration; children collected so
//   far are kept
//
// Rust concepts:
// - Option::get_or_insert: the first decoded page fixes the total for the rest of the loop
// - Match guards (`Err(e) if e.is_remote_fault()`) split one error type by kind
// =============================================================================

use super::fetch::fetch_listing;
use super::stats::CrawlStats;
use crate::remote::{ContentApi, Envelope, ItemRecord};
use std::collections::HashSet;

/// The outcome of paging through one parent's children.
#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    /// Distinct children, in listing order
    pub children: Vec<ItemRecord>,
    /// Total reported by the first page that decoded (0 if none did)
    pub total_count: u64,
    pub pages_requested: u32,
    pub failed_pages: u32,
}

impl Enumeration {
    /// The consolidated child-index document for the output sink.
    pub fn to_listing(&self) -> Envelope {
        Envelope::consolidated(self.total_count, self.children.clone())
    }
}

// Pages through all children of `parent_id`
//
// Parameters:
//   api:       where the pages come from
//   parent_id: the container being enumerated
//   page_size: items requested per page
//   stats:     run totals; one error is added per failing page
pub async fn enumerate_children<A>(
    api: &A,
    parent_id: &str,
    page_size: u32,
    stats: &mut CrawlStats,
) -> Enumeration
where
    A: ContentApi + ?Sized,
{
    let mut result = Enumeration::default();
    let mut total: Option<u64> = None;
    let mut seen_ids: HashSet<String> = HashSet::new();
    // items collected + a full page for every faulted page
    let mut covered: u64 = 0;
    let mut page: u32 = 0;

    loop {
        result.pages_requested += 1;

        match fetch_listing(api, parent_id, page, page_size).await {
            Ok(listing) => {
                let expected = *total.get_or_insert(listing.total_count);
                if listing.result_count != listing.items.len() as u64 {
                    tracing::debug!(
                        parent = parent_id,
                        page = listing.page,
                        page_size = listing.page_size,
                        reported = listing.result_count,
                        received = listing.items.len(),
                        "resultCount does not match items on page"
                    );
                }

                let mut new_items: u64 = 0;
                for item in listing.items {
                    if seen_ids.insert(item.id.clone()) {
                        result.children.push(item);
                        new_items += 1;
                    } else {
                        tracing::debug!(parent = parent_id, page = page, id = %item.id, "duplicate child in listing");
                    }
                }

                if new_items == 0 {
                    break;
                }
                covered += new_items;
                if covered >= expected {
                    break;
                }
            }
            Err(e) if e.is_remote_fault() => {
                tracing::error!(parent = parent_id, page = page, error = %e, "listing page failed");
                stats.record_error();
                result.failed_pages += 1;

                match total {
                    None => break,
                    Some(expected) => {
                        covered += u64::from(page_size);
                        if covered >= expected {
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(parent = parent_id, page = page, error = %e, "unable to fetch listing page");
                stats.record_error();
                result.failed_pages += 1;
                break;
            }
        }

        page += 1;
        tracing::debug!(
            parent = parent_id,
            items = result.children.len(),
            total = total.unwrap_or(0),
            "fetching paged"
        );
    }

    result.total_count = total.unwrap_or(0);
    tracing::debug!(
        parent = parent_id,
        children = result.children.len(),
        pages = result.pages_requested,
        failed = result.failed_pages,
        "enumeration complete"
    );
    result
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why keep a HashSet of ids?
//    - HashSet::insert returns false when the id is already there
//    - So dropping duplicates and noticing a page with nothing new is one call
//
// 2. How is the loop guaranteed to end?
//    - Every page that does not end the loop adds at least one to `covered`
//    - A decoded page adds its new items (zero new items ends the loop)
//    - A faulted page adds a full page_size
//
// 3. Why u64::from(page_size) instead of `page_size as u64`?
//    - From is only implemented where the conversion cannot lose data
//    - `as` compiles for narrowing casts too and truncates silently
// -----------------------------------------------------------------------------
