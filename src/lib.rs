//! # Runnel
//!
//! Fetch RSS 1.0, RSS 2.0 and Atom feeds, normalize them into one model, and
//! merge new entries into a feed's history without admitting an item twice.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Parser (classify → transcode) → Updater → Feed history
//! ```
//!
//! - [`fetcher`]: transport, with typed certificate and login failures
//! - [`parser`]: format classification and the three dialect transcoders
//! - [`updater`]: `update` (rate limited, de-duplicating) and `get_new`
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a feed
//! runnel add https://blog.rust-lang.org/feed.xml
//!
//! # Merge new items into every feed that is due
//! runnel update
//!
//! # Print every feed's current items without merging
//! runnel update --new
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires the fetcher, parser and
/// updater from a [`Config`](config::Config).
pub mod app;

/// Configuration loaded from `~/.config/runnel/config.toml`.
pub mod config;

/// Command-line interface using clap.
///
/// - `add <url>` - Subscribe to a feed
/// - `remove <url>` - Unsubscribe
/// - `update [--new]` - Update all feeds
/// - `list [--items]` - List feeds or items
/// - `fetch <url>` / `parse <path>` - One-off inspection
pub mod cli;

/// Core domain models.
///
/// - [`Feed`](domain::Feed): a feed's metadata, item history and identifier ledger
/// - [`Item`](domain::Item): a single entry
pub mod domain;

/// Feed fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): async transport trait
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`FnFetcher`](fetcher::func_fetcher::FnFetcher): caller-supplied function
pub mod fetcher;

/// Format classification and RSS 1.0 / RSS 2.0 / Atom transcoding.
pub mod parser;

/// JSON state file for the CLI.
pub mod store;

/// Merging fetched snapshots into feed histories.
///
/// - [`Updater`](updater::Updater): `update` and `get_new` for one feed
/// - [`ParallelUpdater`](updater::parallel::ParallelUpdater): concurrent updates with a semaphore
pub mod updater;
