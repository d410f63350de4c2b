// src/output/mod.rs
// =============================================================================
// Where exported documents end up.
//
// Layout on disk (ids are written without their surrounding braces):
//   <output-dir>/<id>.json            the item record
//   <output-dir>/<id>-children.json   the consolidated child listing
//   <binaries-dir>/<id>.<ext>         the media asset (see crawl::binary)
//
// The crawler only knows the OutputSink trait, so tests can record writes in
// memory instead of touching the filesystem.
//
// Rust concepts:
// - async_trait: the sink is awaited inside the crawl like every other I/O
// - Generic helper (write_json<T: Serialize>) shared by both document kinds
// =============================================================================

use crate::error::SinkError;
use crate::remote::types::strip_braces;
use crate::remote::{Envelope, ItemRecord};
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Persists one item record, returning where it went.
    async fn write_node(&self, record: &ItemRecord) -> Result<PathBuf, SinkError>;

    /// Persists the consolidated child listing of a container.
    async fn write_children(
        &self,
        parent_id: &str,
        listing: &Envelope,
    ) -> Result<PathBuf, SinkError>;
}

pub fn node_file_name(id: &str) -> String {
    format!("{}.json", strip_braces(id))
}

pub fn children_file_name(id: &str) -> String {
    format!("{}-children.json", strip_braces(id))
}

pub fn binary_file_name(id: &str, extension: &str) -> String {
    format!("{}.{}", strip_braces(id), extension)
}

/// Pretty-printed JSON files under one directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileSink { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write_json<T: Serialize + Sync>(
        &self,
        id: &str,
        file_name: String,
        doc: &T,
    ) -> Result<PathBuf, SinkError> {
        let json = serde_json::to_vec_pretty(doc).map_err(|source| SinkError::Serialize {
            id: id.to_string(),
            source,
        })?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| SinkError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

#[async_trait]
impl OutputSink for JsonFileSink {
    async fn write_node(&self, record: &ItemRecord) -> Result<PathBuf, SinkError> {
        self.write_json(&record.id, node_file_name(&record.id), record)
            .await
    }

    async fn write_children(
        &self,
        parent_id: &str,
        listing: &Envelope,
    ) -> Result<PathBuf, SinkError> {
        self.write_json(parent_id, children_file_name(parent_id), listing)
            .await
    }
}
