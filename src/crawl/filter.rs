// src/crawl/filter.rs
// =============================================================================
// The path-prefix filter.
//
// Item paths are absolute (/sitecore/content/Home/...). Users give prefixes
// relative to the content or media-library root (Home/Products), so the root
// part is stripped before comparing. The stored record keeps its full path.
//
// The filter is root-anchored: an item that fails it is dropped together with
// its whole subtree, even if some descendant would have matched. Crawling
// from a root whose own path does not start with the prefix therefore exports
// nothing.
// =============================================================================

const MEDIA_ROOT: &str = "/sitecore/media library";
const CONTENT_ROOT: &str = "/sitecore/content";

/// Strips the media-library or content root and any leading slash.
pub fn normalize_path(path: &str) -> &str {
    let relative = path
        .strip_prefix(MEDIA_ROOT)
        .or_else(|| path.strip_prefix(CONTENT_ROOT))
        .unwrap_or(path);
    relative.trim_start_matches('/')
}

/// True when the item at `path` is inside the configured prefix.
///
/// An empty prefix lets everything through; so does an empty normalized
/// path (the content / media-library roots themselves).
pub fn passes_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_start_matches('/');
    if prefix.is_empty() {
        return true;
    }
    let relative = normalize_path(path);
    relative.is_empty() || relative.starts_with(prefix)
}
