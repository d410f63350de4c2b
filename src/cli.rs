// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Everything the exporter needs to know comes from here: which host to talk
// to, which credentials to log in with, where to start in the content tree,
// how deep to go, and what to write to disk.
//
// Host and credentials may also come from the environment (SITECORE_HOST,
// SITECORE_USER, SITECORE_PASS), which main.rs can populate from a .env file.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

/// The id of the Sitecore tree root, used when --root is not given.
pub const DEFAULT_ROOT_ID: &str = "{11111111-1111-1111-1111-111111111111}";

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sitecore-export",
    version = "0.1.0",
    about = "Export a Sitecore content tree (items, child listings and media) to local files",
    long_about = "sitecore-export logs into a Sitecore instance, walks the content tree from a root item \
                  and stores one JSON document per item, one child listing per container and \
                  the binary media attached to asset items."
)]
pub struct Cli {
    /// Item id to start from (braced GUID)
    #[arg(long, default_value = DEFAULT_ROOT_ID)]
    pub root: String,

    /// Limit traversal depth from the root (-1 = unbounded)
    ///
    /// Depth 0 = only the root item
    /// Depth 1 = root + its direct children
    #[arg(short = 'd', long = "depth", default_value_t = -1, allow_negative_numbers = true)]
    pub depth: i64,

    /// Only process items whose path (below /sitecore/content or
    /// /sitecore/media library) starts with this prefix
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Output folder for item JSON and child listings
    #[arg(short = 'o', long = "output", default_value = "output")]
    pub output: PathBuf,

    /// Output folder for binary media
    #[arg(short = 'b', long = "binaries", default_value = "binaries")]
    pub binaries: PathBuf,

    /// Store item data
    #[arg(short = 'w', long = "write")]
    pub write: bool,

    /// Store binary data
    #[arg(long = "wb", alias = "write-binaries")]
    pub write_binaries: bool,

    /// Re-download binaries even when a non-empty file already exists
    #[arg(long)]
    pub force: bool,

    /// Sitecore hostname or ip address (https:// is assumed when no scheme is given)
    #[arg(long, env = "SITECORE_HOST", default_value = "")]
    pub host: String,

    /// Sitecore username
    #[arg(long, env = "SITECORE_USER", default_value = "")]
    pub user: String,

    /// Sitecore password
    #[arg(long = "pass", env = "SITECORE_PASS", default_value = "", hide_env_values = true)]
    pub pass: String,

    /// Accept invalid TLS certificates (self-signed development instances)
    #[arg(long)]
    pub insecure: bool,

    /// Number of children requested per listing page
    #[arg(long = "page-size", default_value_t = 100)]
    pub page_size: u32,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
