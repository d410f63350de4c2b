// src/crawl/testing.rs
// =============================================================================
// In-memory ContentApi and OutputSink used by the crawl tests.
//
// FakeApi holds a small content tree and serves it the way the item API
// would: full records for fetch_item, pages of minimal records for
// fetch_children. Individual items, pages and media can be made to fail, and
// every call is recorded so tests can assert on what was (not) requested.
// =============================================================================

use crate::error::{FetchError, SinkError};
use crate::output::{binary_file_name, children_file_name, node_file_name, OutputSink};
use crate::remote::types::{Field, RemoteMessage, ResultSet};
use crate::remote::{ContentApi, Envelope, ItemRecord};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
struct FakeItem {
    path: String,
    template: String,
    fields: BTreeMap<String, Field>,
    children: Vec<String>,
}

#[derive(Debug, Clone)]
struct ScriptedListing {
    total: u64,
    pages: Vec<Vec<String>>,
}

#[derive(Default)]
pub struct FakeApi {
    items: HashMap<String, FakeItem>,
    empty_items: HashSet<String>,
    duplicated: HashSet<String>,
    failing_items: HashSet<String>,
    failing_pages: HashSet<(String, u32)>,
    broken_pages: HashSet<(String, u32)>,
    cancel_after: Option<(usize, CancellationToken)>,
    scripted: HashMap<String, ScriptedListing>,
    media: HashMap<String, Vec<u8>>,
    failing_media: HashSet<String>,
    pub item_calls: Mutex<Vec<String>>,
    pub page_calls: Mutex<Vec<(String, u32)>>,
    pub media_calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, id: &str, path: &str, template: &str, children: &[&str]) {
        self.items.insert(
            id.to_string(),
            FakeItem {
                path: path.to_string(),
                template: template.to_string(),
                fields: BTreeMap::new(),
                children: children.iter().map(|c| c.to_string()).collect(),
            },
        );
    }

    pub fn set_field(&mut self, id: &str, name: &str, value: &str) {
        if let Some(item) = self.items.get_mut(id) {
            item.fields.insert(
                format!("{{FIELD-{}}}", name),
                Field {
                    name: name.to_string(),
                    field_type: "Single-Line Text".to_string(),
                    value: value.to_string(),
                    extra: BTreeMap::new(),
                },
            );
        }
    }

    pub fn set_media(&mut self, id: &str, bytes: &[u8]) {
        self.media.insert(crate::remote::types::media_key(id), bytes.to_vec());
    }

    pub fn fail_media(&mut self, id: &str) {
        self.failing_media.insert(crate::remote::types::media_key(id));
    }

    pub fn add_empty_item(&mut self, id: &str) {
        self.empty_items.insert(id.to_string());
    }

    pub fn duplicate_full_payload(&mut self, id: &str) {
        self.duplicated.insert(id.to_string());
    }

    pub fn fail_item(&mut self, id: &str) {
        self.failing_items.insert(id.to_string());
    }

    pub fn fail_page(&mut self, parent: &str, page: u32) {
        self.failing_pages.insert((parent.to_string(), page));
    }

    /// The page fails below the envelope (connection dropped), not with a
    /// remote fault.
    pub fn break_page(&mut self, parent: &str, page: u32) {
        self.broken_pages.insert((parent.to_string(), page));
    }

    /// Cancels `token` as soon as the `calls`-th item fetch has been served.
    pub fn cancel_after(&mut self, calls: usize, token: CancellationToken) {
        self.cancel_after = Some((calls, token));
    }

    /// Serves `parent`'s listing from explicit pages instead of slicing its
    /// children by page size. Pages past the end come back empty.
    pub fn script_pages(&mut self, parent: &str, total: u64, pages: &[&[&str]]) {
        self.scripted.insert(
            parent.to_string(),
            ScriptedListing {
                total,
                pages: pages
                    .iter()
                    .map(|p| p.iter().map(|id| id.to_string()).collect())
                    .collect(),
            },
        );
    }

    pub fn item_calls(&self) -> Vec<String> {
        self.item_calls.lock().unwrap().clone()
    }

    pub fn page_calls_for(&self, parent: &str) -> Vec<u32> {
        self.page_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == parent)
            .map(|(_, page)| *page)
            .collect()
    }

    pub fn media_calls(&self) -> Vec<String> {
        self.media_calls.lock().unwrap().clone()
    }

    fn record(&self, id: &str, full: bool) -> ItemRecord {
        let item = self.items.get(id);
        ItemRecord {
            id: id.to_string(),
            path: item.map(|i| i.path.clone()).unwrap_or_default(),
            template_name: item.map(|i| i.template.clone()).unwrap_or_default(),
            has_children: item.map(|i| self.child_ids(id, i).next().is_some()).unwrap_or(false),
            fields: if full {
                Some(item.map(|i| i.fields.clone()).unwrap_or_default())
            } else {
                None
            },
            extra: BTreeMap::from([(
                "DisplayName".to_string(),
                serde_json::Value::from(id.trim_matches(|c| c == '{' || c == '}')),
            )]),
        }
    }

    fn child_ids<'a>(&'a self, id: &str, item: &'a FakeItem) -> Box<dyn Iterator<Item = &'a String> + 'a> {
        match self.scripted.get(id) {
            Some(listing) => Box::new(listing.pages.iter().flatten()),
            None => Box::new(item.children.iter()),
        }
    }

    fn fault(url: String) -> FetchError {
        FetchError::RemoteFault {
            url,
            code: 500,
            message: "internal error".to_string(),
        }
    }

    fn envelope(total: u64, items: Vec<ItemRecord>) -> Envelope {
        Envelope {
            status_code: 200,
            error: Some(RemoteMessage::default()),
            result: Some(ResultSet {
                total_count: total,
                result_count: items.len() as u64,
                items,
            }),
        }
    }
}

#[async_trait]
impl ContentApi for FakeApi {
    async fn fetch_item(&self, id: &str) -> Result<Envelope, FetchError> {
        let calls = {
            let mut item_calls = self.item_calls.lock().unwrap();
            item_calls.push(id.to_string());
            item_calls.len()
        };
        if let Some((after, token)) = &self.cancel_after {
            if calls >= *after {
                token.cancel();
            }
        }

        if self.failing_items.contains(id) {
            return Err(Self::fault(format!("item/{}", id)));
        }
        if self.empty_items.contains(id) {
            return Ok(Self::envelope(0, Vec::new()));
        }
        if !self.items.contains_key(id) {
            return Err(FetchError::transport(&format!("item/{}", id), "connection refused"));
        }

        let mut items = vec![self.record(id, true)];
        if self.duplicated.contains(id) {
            let mut other = self.record(id, true);
            other.id = format!("{}-copy", id);
            items.push(other);
        }
        Ok(Self::envelope(items.len() as u64, items))
    }

    async fn fetch_children(
        &self,
        id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Envelope, FetchError> {
        self.page_calls.lock().unwrap().push((id.to_string(), page));

        if self.failing_pages.contains(&(id.to_string(), page)) {
            return Err(Self::fault(format!("children/{}/{}", id, page)));
        }
        if self.broken_pages.contains(&(id.to_string(), page)) {
            return Err(FetchError::transport(
                &format!("children/{}/{}", id, page),
                "connection closed before message completed",
            ));
        }

        if let Some(listing) = self.scripted.get(id) {
            let ids = listing.pages.get(page as usize).cloned().unwrap_or_default();
            let items = ids.iter().map(|c| self.record(c, false)).collect();
            return Ok(Self::envelope(listing.total, items));
        }

        let children = self
            .items
            .get(id)
            .map(|i| i.children.clone())
            .unwrap_or_default();
        let start = (page as usize) * (page_size as usize);
        let items = children
            .iter()
            .skip(start)
            .take(page_size as usize)
            .map(|c| self.record(c, false))
            .collect();
        Ok(Self::envelope(children.len() as u64, items))
    }

    async fn download_media(
        &self,
        media_key: &str,
        extension: &str,
        target: &Path,
    ) -> Result<u64, FetchError> {
        self.media_calls
            .lock()
            .unwrap()
            .push(format!("{}.{}", media_key, extension));

        if self.failing_media.contains(media_key) {
            return Err(FetchError::transport(media_key, "connection reset"));
        }
        let bytes = self.media.get(media_key).cloned().unwrap_or_else(|| b"binary".to_vec());
        std::fs::write(target, &bytes).map_err(|source| FetchError::Filesystem {
            path: target.to_path_buf(),
            source,
        })?;
        Ok(bytes.len() as u64)
    }
}

/// Records what would have been written, keyed by file name.
#[derive(Default)]
pub struct MemorySink {
    pub nodes: Mutex<Vec<ItemRecord>>,
    pub listings: Mutex<Vec<(String, Envelope)>>,
    failing: HashSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&mut self, id: &str) {
        self.failing.insert(id.to_string());
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.lock().unwrap().iter().map(|r| r.id.clone()).collect()
    }

    pub fn listing_for(&self, parent: &str) -> Option<Envelope> {
        self.listings
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == parent)
            .map(|(_, e)| e.clone())
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn write_node(&self, record: &ItemRecord) -> Result<PathBuf, SinkError> {
        let path = PathBuf::from(node_file_name(&record.id));
        if self.failing.contains(&record.id) {
            return Err(SinkError::Write {
                path,
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.nodes.lock().unwrap().push(record.clone());
        Ok(path)
    }

    async fn write_children(
        &self,
        parent_id: &str,
        listing: &Envelope,
    ) -> Result<PathBuf, SinkError> {
        self.listings
            .lock()
            .unwrap()
            .push((parent_id.to_string(), listing.clone()));
        Ok(PathBuf::from(children_file_name(parent_id)))
    }
}

pub fn binary_path(dir: &Path, id: &str, extension: &str) -> PathBuf {
    dir.join(binary_file_name(id, extension))
}
