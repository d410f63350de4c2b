// src/remote/mod.rs
// =============================================================================
// This module is everything that talks to the Sitecore instance.
//
// Submodules:
// - types:   the JSON envelope and item shapes returned by the item API
// - client:  the reqwest-backed implementation of ContentApi
// - session: the login / logout form posts and session cookie check
//
// The crawler never sees reqwest. It only sees the ContentApi trait below,
// which lets the tests drive the crawler from an in-memory tree.
//
// Rust concepts:
// - Traits as seams: the crawler is generic over ContentApi
// - `pub use` re-exports so callers write remote::SitecoreClient
// =============================================================================

mod client;
mod session;
pub mod types;

pub use client::SitecoreClient;
pub use session::Session;
pub use types::{Envelope, ItemRecord, ListingPage};

use crate::error::FetchError;
use async_trait::async_trait;
use std::path::Path;

/// The three remote queries the exporter needs.
///
/// Implementations report a remote-side fault (envelope statusCode other
/// than 200) as `FetchError::RemoteFault`, never as `Decode`.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// `?sc_itemid=<id>&payload=full`
    async fn fetch_item(&self, id: &str) -> Result<Envelope, FetchError>;

    /// `?sc_itemid=<id>&payload=min&scope=c&page=<page>&pageSize=<page_size>`
    async fn fetch_children(
        &self,
        id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Envelope, FetchError>;

    /// Streams `<media>/<media_key>.<extension>` into `target`, returning the
    /// number of bytes written.
    async fn download_media(
        &self,
        media_key: &str,
        extension: &str,
        target: &Path,
    ) -> Result<u64, FetchError>;
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why #[async_trait]?
//    - Traits with async methods cannot be used as `dyn ContentApi` on their
//      own; async_trait rewrites each method to return a boxed future
//
// 2. Why `Send + Sync` on the trait?
//    - The crawler's boxed futures must be Send, and they hold `&A`, which
//      is only Send when A is Sync
// -----------------------------------------------------------------------------
