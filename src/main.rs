// src/main.rs
// =============================================================================
// This is the entry point of the exporter.
//
// What happens here:
// 1. Load .env, parse command-line arguments, set up logging
// 2. Validate the configuration and create the output directories
// 3. Log in to the Sitecore instance
// 4. Crawl from the root item, racing the crawl against Ctrl+C / SIGTERM
// 5. Log out (also interruptible) and print a summary
// 6. Exit with proper code (0 = finished, 1 = interrupted, 2 = setup error)
//
// Individual item failures never change the exit code; they are counted and
// reported in the summary.
//
// Rust concepts:
// - anyhow::Context: adds a human sentence to whatever error bubbles up
// - let-else: leave early when the crawl was interrupted
// - std::process::exit: the exit code is the script-facing result
// =============================================================================

mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - validated run configuration
mod crawl;    // src/crawl/ - tree traversal, pagination, filtering
mod error;    // src/error.rs - error types per layer
mod logging;  // src/logging.rs - tracing subscriber
mod output;   // src/output/ - JSON files on disk
mod progress; // src/progress.rs - single-line progress display
mod remote;   // src/remote/ - Sitecore HTTP client and session
mod shutdown; // src/shutdown.rs - signal handling

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::Config;
use crawl::{CrawlStats, Crawler};
use output::JsonFileSink;
use progress::Progress;
use remote::{Session, SitecoreClient};
use shutdown::{until_cancelled, EXIT_INTERRUPTED};
use std::time::Instant;

const EXIT_OK: i32 = 0;
const EXIT_SETUP_FAILED: i32 = 2;

#[tokio::main]
async fn main() {
    // A missing .env is fine; the flags and real environment still apply
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_SETUP_FAILED
        }
    };

    std::process::exit(exit_code);
}

// Runs one export
// Returns:
//   Ok(0) = crawl finished (possibly with counted item errors)
//   Ok(1) = interrupted by a signal
//   Err   = configuration, directory, or login failure (exit code 2)
async fn run(cli: Cli) -> Result<i32> {
    let started = Instant::now();

    let config = Config::from_cli(&cli).context("invalid configuration")?;
    config.prepare_directories()?;

    let client = SitecoreClient::new(config.endpoints.clone(), config.insecure)?;
    let session = client.session();

    println!("🔐 Logging in to {}", client.endpoints().base);
    session
        .login(&config.username, &config.password)
        .await
        .context("login failed")?;

    let cancel = shutdown::listen();
    let sink = JsonFileSink::new(&config.output_dir);
    let crawler = Crawler::new(&client, &sink, &config.crawl)
        .with_progress(Progress::terminal())
        .with_cancellation(cancel.clone());

    println!(
        "🔍 Exporting from {} (depth: {})",
        config.root_id,
        describe_depth(config.crawl.max_depth)
    );

    let mut stats = CrawlStats::default();
    let root = until_cancelled(&cancel, crawler.crawl(&config.root_id, &mut stats)).await;

    let Some(root) = root else {
        println!();
        println!("⚠️  Interrupted, logging out");
        // The token has fired already; a second signal exits from shutdown.rs
        end_session(&session).await;
        return Ok(EXIT_INTERRUPTED);
    };

    if until_cancelled(&cancel, end_session(&session)).await.is_none() {
        println!("⚠️  Interrupted during logout");
        return Ok(EXIT_INTERRUPTED);
    }

    let exported = root.as_ref().map(|node| node.count()).unwrap_or(0);
    if root.is_none() {
        eprintln!("⚠️  Root item {} was not exported", config.root_id);
    }

    print_summary(&stats, exported, &sink, started);
    Ok(EXIT_OK)
}

// Logs out; failure only warrants a warning since the export is already done
async fn end_session(session: &Session) {
    match session.logout().await {
        Ok(()) => tracing::debug!("logged out"),
        Err(e) => tracing::warn!(error = %e, "logout failed"),
    }
}

fn describe_depth(max_depth: Option<u32>) -> String {
    match max_depth {
        Some(depth) => depth.to_string(),
        None => "unlimited".to_string(),
    }
}

// Prints the run totals
// Parameters:
//   stats:    counters collected during the crawl
//   exported: nodes in the returned tree
//   sink:     where item files went
//   started:  when the run began, for the elapsed time
fn print_summary(stats: &CrawlStats, exported: usize, sink: &JsonFileSink, started: Instant) {
    println!();
    println!("📊 Summary:");
    println!("   📄 Items processed: {}", stats.processed);
    println!("   🌳 Items in tree: {}", exported);
    println!(
        "   💾 Wrote {} items, {} listings to {}",
        stats.items_written,
        stats.listings_written,
        sink.dir().display()
    );
    println!(
        "   🖼️  Binaries: {} written ({} bytes), {} skipped",
        stats.binaries_written, stats.bytes_downloaded, stats.binaries_skipped
    );
    if stats.excluded > 0 {
        println!("   🚫 Excluded by prefix: {}", stats.excluded);
    }
    if stats.depth_limited > 0 {
        eprintln!(
            "   ⛔ Depth traversal was halted by the depth limit {} time(s)",
            stats.depth_limited
        );
    }
    if stats.errors > 0 {
        eprintln!("   ❌ {} error(s) during processing", stats.errors);
    } else {
        println!("   ✅ No errors");
    }
    println!("   ⏱️  Took {:.2?}", started.elapsed());
}
