// src/crawl/tree.rs
// =============================================================================
// The tree crawler: depth-first descent from a root item.
//
// For every item:
// 1. Fetch the full record (failure = the item and its subtree don't exist)
// 2. Drop it, and everything below it, if its path fails the prefix filter
// 3. Persist the record; download its media if the template is an asset type
// 4. If it has children and we are still above --depth, page through them and
//    visit each one at depth + 1
// 5. Persist the consolidated child listing
//
// A failing child is logged, counted and left out; its siblings and the
// parent are unaffected. Only login problems (handled in main.rs) can stop a
// run; an interrupt cancels the token checked before every item fetch.
//
// Rust concepts:
// - BoxFuture + FutureExt::boxed for a recursive async function
// - Lifetimes on the crawler: it borrows the api, sink and settings for 'a
// =============================================================================

use super::binary::{fetch_binary, BinaryOutcome};
use super::fetch::fetch_node;
use super::filter::passes_prefix;
use super::paginate::enumerate_children;
use super::stats::CrawlStats;
use crate::config::CrawlSettings;
use crate::output::OutputSink;
use crate::progress::Progress;
use crate::remote::{ContentApi, ItemRecord};
use futures::future::{BoxFuture, FutureExt};
use tokio_util::sync::CancellationToken;

/// An exported item and the children that were exported with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub record: ItemRecord,
    pub children: Vec<Node>,
}

impl Node {
    fn new(record: ItemRecord) -> Self {
        Node {
            record,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Ids in depth-first order.
    #[cfg(test)]
    pub fn ids(&self) -> Vec<&str> {
        let mut out = vec![self.record.id.as_str()];
        for child in &self.children {
            out.extend(child.ids());
        }
        out
    }
}

/// Per-call traversal state.
#[derive(Debug, Clone, Copy)]
pub struct CrawlContext<'p> {
    pub depth: u32,
    pub traverse: bool,
    pub force: bool,
    pub prefix: &'p str,
}

impl<'p> CrawlContext<'p> {
    fn child(&self) -> Self {
        CrawlContext {
            depth: self.depth + 1,
            ..*self
        }
    }
}

pub struct Crawler<'a, A: ?Sized, S: ?Sized> {
    api: &'a A,
    sink: &'a S,
    settings: &'a CrawlSettings,
    progress: Progress,
    cancel: CancellationToken,
}

impl<'a, A, S> Crawler<'a, A, S>
where
    A: ContentApi + ?Sized,
    S: OutputSink + ?Sized,
{
    pub fn new(api: &'a A, sink: &'a S, settings: &'a CrawlSettings) -> Self {
        Crawler {
            api,
            sink,
            settings,
            progress: Progress::disabled(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Crawls from `root_id`; returns None when the root itself could not be
    /// fetched or was filtered out.
    pub async fn crawl(&self, root_id: &str, stats: &mut CrawlStats) -> Option<Node> {
        let ctx = CrawlContext {
            depth: 0,
            traverse: true,
            force: self.settings.force,
            prefix: &self.settings.prefix,
        };
        let root = self.visit(root_id.to_string(), ctx, stats).await;
        self.progress.finish();
        root
    }

    fn within_depth(&self, depth: u32) -> bool {
        match self.settings.max_depth {
            None => true,
            Some(max) => depth < max,
        }
    }

    fn visit<'f>(
        &'f self,
        id: String,
        ctx: CrawlContext<'f>,
        stats: &'f mut CrawlStats,
    ) -> BoxFuture<'f, Option<Node>> {
        async move {
            if self.cancel.is_cancelled() {
                tracing::debug!(id = %id, "crawl cancelled, not fetching");
                return None;
            }

            let record = match fetch_node(self.api, &id).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::error!(id = %id, error = %e, "unable to fetch item");
                    stats.record_error();
                    return None;
                }
            };
            stats.processed += 1;
            self.progress.item(&record.path);

            if !passes_prefix(&record.path, ctx.prefix) {
                tracing::debug!(path = %record.path, prefix = ctx.prefix, "path outside prefix, skipping subtree");
                stats.excluded += 1;
                return None;
            }

            if self.settings.persist_nodes {
                match self.sink.write_node(&record).await {
                    Ok(path) => {
                        stats.items_written += 1;
                        tracing::trace!(path = %path.display(), "wrote item");
                    }
                    Err(e) => {
                        tracing::error!(id = %record.id, error = %e, "unable to write item");
                        stats.record_error();
                    }
                }
            }

            if self.settings.persist_binaries
                && self.settings.is_asset_template(&record.template_name)
            {
                match fetch_binary(
                    self.api,
                    &record,
                    &self.settings.binaries_dir,
                    ctx.force,
                    stats,
                )
                .await
                {
                    BinaryOutcome::Downloaded { path, bytes } => {
                        tracing::trace!(path = %path.display(), bytes = bytes, "binary downloaded")
                    }
                    BinaryOutcome::Skipped(path) => {
                        tracing::trace!(path = %path.display(), "binary already on disk")
                    }
                    BinaryOutcome::Duplicate | BinaryOutcome::Failed => {}
                }
            }

            let mut node = Node::new(record);
            if !node.record.has_children || !ctx.traverse {
                return Some(node);
            }
            if !self.within_depth(ctx.depth) {
                stats.depth_limited += 1;
                return Some(node);
            }

            let enumeration =
                enumerate_children(self.api, &node.record.id, self.settings.page_size, stats)
                    .await;

            for child in &enumeration.children {
                match self.visit(child.id.clone(), ctx.child(), stats).await {
                    Some(child_node) => node.children.push(child_node),
                    None => tracing::debug!(id = %child.id, "ignoring child that was not exported"),
                }
            }

            if self.settings.persist_nodes {
                match self
                    .sink
                    .write_children(&node.record.id, &enumeration.to_listing())
                    .await
                {
                    Ok(_) => stats.listings_written += 1,
                    Err(e) => {
                        tracing::error!(id = %node.record.id, error = %e, "unable to write child listing");
                        stats.record_error();
                    }
                }
            }

            Some(node)
        }
        .boxed()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does visit() return a BoxFuture instead of being an `async fn`?
//    - An async fn compiles to a state machine that contains the futures it
//      awaits. A recursive one would have to contain itself, which has no
//      finite size
//    - Boxing the future (FutureExt::boxed) puts each level on the heap, so
//      the outer future only holds a pointer to the inner one
//
// 2. Why pass `&mut CrawlStats` down instead of returning counts?
//    - Children are visited one at a time, so there is only ever one
//      mutable borrow alive
//    - The caller owns the totals and reads them after crawl() returns
//
// 3. What is `?Sized` on A and S?
//    - It lets the crawler take trait objects (`&dyn ContentApi`) as well as
//      concrete types like SitecoreClient or the test fakes
// -----------------------------------------------------------------------------
