// src/config.rs
// =============================================================================
// Validated run configuration.
//
// The CLI hands us raw strings and numbers; this module turns them into a
// Config the rest of the program can trust:
// - the host becomes a base URL, and every remote endpoint is derived from it
// - the depth sentinel (-1) becomes Option<u32> (None = unbounded)
// - missing credentials are reported before we ever touch the network
//
// Rust concepts:
// - Result<T, E> with `?` for early returns on invalid input
// - Struct update syntax (`..CrawlSettings::default()`)
// =============================================================================

use crate::cli::Cli;
use crate::error::ConfigError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use url::Url;

// Template names whose items carry a binary asset (compared lowercase)
pub const ASSET_TEMPLATES: [&str; 12] = [
    "audio", "doc", "document", "docx", "file", "flash", "image", "jpeg", "movie", "mp3", "pdf",
    "zip",
];

/// Every remote URL the exporter talks to, derived from one base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base: Url,
    pub login: Url,
    pub logout: Url,
    pub item_api: Url,
    pub media: Url,
}

impl Endpoints {
    /// Builds the endpoint set for a host.
    ///
    /// `cms.example.com` is treated as `https://cms.example.com`; a host that
    /// already carries a scheme is used as given.
    pub fn for_host(host: &str) -> Result<Self, ConfigError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(ConfigError::Missing("--host"));
        }

        let raw = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        let mut base = Url::parse(&raw).map_err(|e| ConfigError::InvalidHost {
            host: host.to_string(),
            reason: e.to_string(),
        })?;
        if base.host_str().is_none() {
            return Err(ConfigError::InvalidHost {
                host: host.to_string(),
                reason: "no host name".to_string(),
            });
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Self::from_base(base, host)
    }

    fn from_base(base: Url, host: &str) -> Result<Self, ConfigError> {
        let join = |path: &str| {
            base.join(path).map_err(|e| ConfigError::InvalidHost {
                host: host.to_string(),
                reason: e.to_string(),
            })
        };

        Ok(Endpoints {
            login: join("sitecore/login")?,
            logout: join("api/sitecore/Authentication/Logout?sc_database=master")?,
            item_api: join("-/item/v99")?,
            media: join("~/media/")?,
            base,
        })
    }
}

/// Settings consumed by the crawler (no network or credential details).
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// None = unbounded
    pub max_depth: Option<u32>,
    pub prefix: String,
    pub page_size: u32,
    pub persist_nodes: bool,
    pub persist_binaries: bool,
    pub binaries_dir: PathBuf,
    /// Re-download binaries that already exist on disk
    pub force: bool,
    pub asset_templates: BTreeSet<String>,
}

impl CrawlSettings {
    pub fn is_asset_template(&self, template_name: &str) -> bool {
        self.asset_templates
            .contains(&template_name.to_lowercase())
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        CrawlSettings {
            max_depth: None,
            prefix: String::new(),
            page_size: 100,
            persist_nodes: false,
            persist_binaries: false,
            binaries_dir: PathBuf::from("binaries"),
            force: false,
            asset_templates: ASSET_TEMPLATES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoints: Endpoints,
    pub username: String,
    pub password: String,
    pub root_id: String,
    pub output_dir: PathBuf,
    pub insecure: bool,
    pub crawl: CrawlSettings,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let endpoints = Endpoints::for_host(&cli.host)?;

        if cli.user.is_empty() {
            return Err(ConfigError::Missing("--user"));
        }
        if cli.pass.is_empty() {
            return Err(ConfigError::Missing("--pass"));
        }
        if cli.root.trim().is_empty() {
            return Err(ConfigError::Missing("--root"));
        }
        if cli.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }

        let max_depth = parse_depth(cli.depth)?;

        Ok(Config {
            endpoints,
            username: cli.user.clone(),
            password: cli.pass.clone(),
            root_id: cli.root.trim().to_string(),
            output_dir: cli.output.clone(),
            insecure: cli.insecure,
            crawl: CrawlSettings {
                max_depth,
                prefix: cli.prefix.clone(),
                page_size: cli.page_size,
                persist_nodes: cli.write,
                persist_binaries: cli.write_binaries,
                binaries_dir: cli.binaries.clone(),
                force: cli.force,
                ..CrawlSettings::default()
            },
        })
    }

    /// Creates the output folders that the enabled persist flags will write to.
    pub fn prepare_directories(&self) -> Result<(), ConfigError> {
        if self.crawl.persist_nodes {
            create_dir(&self.output_dir)?;
        }
        if self.crawl.persist_binaries {
            create_dir(&self.crawl.binaries_dir)?;
        }
        Ok(())
    }
}

fn parse_depth(depth: i64) -> Result<Option<u32>, ConfigError> {
    match depth {
        -1 => Ok(None),
        d if d >= 0 => u32::try_from(d)
            .map(Some)
            .map_err(|_| ConfigError::InvalidDepth(d)),
        d => Err(ConfigError::InvalidDepth(d)),
    }
}

fn create_dir(path: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(path).map_err(|source| ConfigError::Directory {
        path: path.to_path_buf(),
        source,
    })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Option<u32> for the depth?
//    - The -1 sentinel becomes None at the edge of the program
//    - The rest of the code cannot see a negative depth at all
//
// 2. What does `..CrawlSettings::default()` do?
//    - Fills every field not listed explicitly from the default value
//    - New settings only need a default to stay compatible with this code
//
// 3. Why `&'static str` in ConfigError::Missing?
//    - The values are flag names written as literals in this file
//    - No allocation is needed to build the error
// -----------------------------------------------------------------------------
