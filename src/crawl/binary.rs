// src/crawl/binary.rs
// =============================================================================
// The binary gate: decides whether an asset item's media gets downloaded.
//
// Rules:
// - the file is <binaries-dir>/<id>.<ext>, where ext is the item's
//   "Extension" field (or "bin" when that is missing or blank)
// - an existing non-empty file is left alone, so re-runs are cheap
// - each id is handled at most once per run
// - failures are logged and counted; the item itself still counts as
//   exported
//
// Rust concepts:
// - Enums with data: BinaryOutcome carries the path and byte count when there is one
// - tokio::fs: file checks that do not block the runtime thread
// =============================================================================

use super::stats::CrawlStats;
use crate::output::binary_file_name;
use crate::remote::types::media_key;
use crate::remote::{ContentApi, ItemRecord};
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSION: &str = "bin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    /// A non-empty file was already on disk
    Skipped(PathBuf),
    /// Already handled earlier in this run
    Duplicate,
    Failed,
}

// Characters that would move the file out of the binaries folder or change
// the media URL's path
const UNSAFE_EXTENSION_CHARS: [char; 4] = ['/', '\\', '?', '#'];

pub fn binary_extension(record: &ItemRecord) -> String {
    match record.field_value("Extension").map(str::trim) {
        Some(ext) if !ext.is_empty() && !ext.contains(&UNSAFE_EXTENSION_CHARS[..]) => ext.to_string(),
        Some(ext) if !ext.is_empty() => {
            tracing::warn!(id = %record.id, extension = ext, "unusable extension, using default");
            DEFAULT_EXTENSION.to_string()
        }
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

#[cfg(test)]
pub fn binary_target(dir: &Path, record: &ItemRecord) -> PathBuf {
    dir.join(binary_file_name(&record.id, &binary_extension(record)))
}

// Downloads the media for an asset item unless it is already on disk
//
// Parameters:
//   api:    where the media comes from
//   record: an item whose template was classified as asset-bearing
//   dir:    the binaries folder
//   force:  download even when a non-empty file exists
//   stats:  run totals
pub async fn fetch_binary<A>(
    api: &A,
    record: &ItemRecord,
    dir: &Path,
    force: bool,
    stats: &mut CrawlStats,
) -> BinaryOutcome
where
    A: ContentApi + ?Sized,
{
    if !stats.binaries_seen.insert(record.id.clone()) {
        return BinaryOutcome::Duplicate;
    }

    let extension = binary_extension(record);
    let target = dir.join(binary_file_name(&record.id, &extension));

    if !force {
        if let Ok(meta) = tokio::fs::metadata(&target).await {
            if meta.len() > 0 {
                tracing::debug!(path = %target.display(), "not reimporting existing binary file");
                stats.binaries_skipped += 1;
                return BinaryOutcome::Skipped(target);
            }
        }
    }

    tracing::debug!(path = %record.path, target = %target.display(), "fetching binary");

    match api
        .download_media(&media_key(&record.id), &extension, &target)
        .await
    {
        Ok(bytes) => {
            tracing::debug!(path = %target.display(), bytes = bytes, "wrote binary");
            stats.binaries_written += 1;
            stats.bytes_downloaded += bytes;
            BinaryOutcome::Downloaded {
                path: target,
                bytes,
            }
        }
        Err(e) => {
            tracing::error!(id = %record.id, path = %record.path, error = %e, "unable to fetch binary");
            stats.record_error();
            BinaryOutcome::Failed
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why return BinaryOutcome instead of a bool?
//    - The caller gets the target path and size without recomputing them
//    - Tests can assert exactly which branch was taken
//
// 2. What is `&UNSAFE_EXTENSION_CHARS[..]`?
//    - A slice of chars works as a string pattern
//    - str::contains then matches if any one of those chars appears
//
// 3. Why does binaries_seen live in CrawlStats?
//    - It has the same lifetime as the run totals: one per run
//    - The crawler already passes `&mut CrawlStats` everywhere it is needed
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::fetch::fetch_node;
    use crate::crawl::testing::FakeApi;

    const ID: &str = "{0DE95AE4-41AB-4D01-9EB0-67441B7C2450}";

    fn image_api(extension: Option<&str>) -> FakeApi {
        let mut api = FakeApi::new();
        api.add_item(ID, "/sitecore/media library/logo", "Image", &[]);
        if let Some(ext) = extension {
            api.set_field(ID, "Extension", ext);
        }
        api.set_media(ID, b"\x89PNG....");
        api
    }

    #[tokio::test]
    async fn test_extension_defaults_to_bin() {
        let api = image_api(None);
        let record = fetch_node(&api, ID).await.unwrap();
        assert_eq!(binary_extension(&record), "bin");

        let api = image_api(Some("   "));
        let record = fetch_node(&api, ID).await.unwrap();
        assert_eq!(binary_extension(&record), "bin");

        let api = image_api(Some("png"));
        let record = fetch_node(&api, ID).await.unwrap();
        assert_eq!(binary_extension(&record), "png");
    }

    #[tokio::test]
    async fn test_extension_with_path_characters_falls_back() {
        for ext in ["x/../../escaped", "..\\evil", "png?x=1", "png#frag"] {
            let api = image_api(Some(ext));
            let record = fetch_node(&api, ID).await.unwrap();
            assert_eq!(binary_extension(&record), "bin", "extension {:?}", ext);
        }
    }

    #[tokio::test]
    async fn test_hostile_extension_stays_inside_binaries_dir() {
        let dir = tempfile::tempdir().unwrap();
        let api = image_api(Some("x/../../escaped"));
        let record = fetch_node(&api, ID).await.unwrap();
        let mut stats = CrawlStats::default();

        fetch_binary(&api, &record, dir.path(), false, &mut stats).await;

        assert!(dir
            .path()
            .join("0DE95AE4-41AB-4D01-9EB0-67441B7C2450.bin")
            .exists());
        assert_eq!(api.media_calls(), vec!["0DE95AE441AB4D019EB067441B7C2450.bin"]);
    }

    #[tokio::test]
    async fn test_downloads_to_id_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let api = image_api(None);
        let record = fetch_node(&api, ID).await.unwrap();
        let mut stats = CrawlStats::default();

        let outcome = fetch_binary(&api, &record, dir.path(), false, &mut stats).await;

        let expected = dir.path().join("0DE95AE4-41AB-4D01-9EB0-67441B7C2450.bin");
        assert_eq!(
            outcome,
            BinaryOutcome::Downloaded {
                path: expected.clone(),
                bytes: 8
            }
        );
        assert!(expected.exists());
        assert_eq!(api.media_calls(), vec!["0DE95AE441AB4D019EB067441B7C2450.bin"]);
        assert_eq!(stats.binaries_written, 1);
    }

    #[tokio::test]
    async fn test_existing_file_is_not_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let api = image_api(Some("png"));
        let record = fetch_node(&api, ID).await.unwrap();
        let target = binary_target(dir.path(), &record);
        std::fs::write(&target, b"already here").unwrap();
        let mut stats = CrawlStats::default();

        let outcome = fetch_binary(&api, &record, dir.path(), false, &mut stats).await;

        assert_eq!(outcome, BinaryOutcome::Skipped(target.clone()));
        assert!(api.media_calls().is_empty());
        assert_eq!(std::fs::read(&target).unwrap(), b"already here");
        assert_eq!(stats.binaries_skipped, 1);
    }

    #[tokio::test]
    async fn test_empty_file_is_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let api = image_api(None);
        let record = fetch_node(&api, ID).await.unwrap();
        std::fs::write(binary_target(dir.path(), &record), b"").unwrap();
        let mut stats = CrawlStats::default();

        let outcome = fetch_binary(&api, &record, dir.path(), false, &mut stats).await;

        assert!(matches!(outcome, BinaryOutcome::Downloaded { bytes: 8, .. }));
    }

    #[tokio::test]
    async fn test_force_refetches_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let api = image_api(None);
        let record = fetch_node(&api, ID).await.unwrap();
        std::fs::write(binary_target(dir.path(), &record), b"stale").unwrap();
        let mut stats = CrawlStats::default();

        let outcome = fetch_binary(&api, &record, dir.path(), true, &mut stats).await;

        assert!(matches!(outcome, BinaryOutcome::Downloaded { .. }));
        assert_eq!(api.media_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_same_id_handled_once_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let api = image_api(None);
        let record = fetch_node(&api, ID).await.unwrap();
        let mut stats = CrawlStats::default();

        fetch_binary(&api, &record, dir.path(), true, &mut stats).await;
        let second = fetch_binary(&api, &record, dir.path(), true, &mut stats).await;

        assert_eq!(second, BinaryOutcome::Duplicate);
        assert_eq!(api.media_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_counted_not_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = image_api(None);
        api.fail_media(ID);
        let record = fetch_node(&api, ID).await.unwrap();
        let mut stats = CrawlStats::default();

        let outcome = fetch_binary(&api, &record, dir.path(), false, &mut stats).await;

        assert_eq!(outcome, BinaryOutcome::Failed);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.binaries_written, 0);
    }
}
