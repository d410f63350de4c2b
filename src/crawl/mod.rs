// src/crawl/mod.rs
// =============================================================================
// This module walks the Sitecore content tree.
//
// Submodules:
// - fetch:    one item / one listing page over ContentApi
// - paginate: all children of one item, across pages
// - filter:   the root-anchored path-prefix filter
// - binary:   media download gate for asset items
// - tree:     the recursive crawler that ties the above together
// - stats:    run totals printed at the end
// =============================================================================

mod binary;
mod fetch;
mod filter;
mod paginate;
mod stats;
mod tree;

#[cfg(test)]
mod testing;

pub use stats::CrawlStats;
pub use tree::Crawler;
