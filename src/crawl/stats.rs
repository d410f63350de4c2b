// src/crawl/stats.rs
// =============================================================================
// Run totals.
//
// One CrawlStats value is created per run and handed down the recursion as
// `&mut`. Nothing global: the caller owns the totals and prints them at the
// end.
// =============================================================================

use std::collections::HashSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlStats {
    /// Items fetched successfully (included or not)
    pub processed: u64,
    /// Item records handed to the output sink
    pub items_written: u64,
    /// Child listings handed to the output sink
    pub listings_written: u64,
    pub binaries_written: u64,
    pub binaries_skipped: u64,
    pub bytes_downloaded: u64,
    /// Items dropped by the prefix filter
    pub excluded: u64,
    /// Containers whose children were not visited because of --depth
    pub depth_limited: u64,
    pub errors: u64,
    /// Ids whose binary was already handled this run
    pub(crate) binaries_seen: HashSet<String>,
}

impl CrawlStats {
    pub fn record_error(&mut self) {
        self.errors += 1;
    }
}
