//! # Trawler
//!
//! Scrapes marketplace search listings (Mercari, Vinted) by driving a real
//! browser, and writes each task's items to a JSON file as it goes.
//!
//! ## Architecture
//!
//! ```text
//! tasks.toml → TaskRunner → BrowserSession → SiteAdapter → DedupIndex → ResultStore
//! ```
//!
//! - [`engine`]: the per-task loop, pacing and content waits
//! - [`sites`]: where each marketplace searches and how its cards are read
//! - [`browser`]: Chrome automation behind a small trait
//! - [`store`]: JSON snapshots, one file per task
//!
//! ## Quick Start
//!
//! ```bash
//! # Preview the URL a task would open
//! trawler url --site mercari T-Shirt -f Dress -f Long
//!
//! # Run a task file
//! trawler run tasks.toml --results-dir results --logs-dir logs
//!
//! # Inspect a result
//! trawler summary results/mercari-shirts.json
//! ```

/// Application context, error types and logging setup.
///
/// The [`AppContext`](app::AppContext) struct wires configuration, the Chrome
/// launcher, the JSON store and the site adapters into a runner.
pub mod app;

/// Browser automation.
///
/// - [`BrowserSession`](browser::BrowserSession): one tab, driven step by step
/// - [`BrowserLauncher`](browser::BrowserLauncher): opens fresh sessions
/// - [`ChromeLauncher`](browser::ChromeLauncher): chromiumoxide implementation
pub mod browser;

/// Command-line interface using clap.
///
/// - `run <tasks.toml>` - Run a task file
/// - `url --site <site> <keyword> [-f <filter>]...` - Print a search URL
/// - `summary <result.json>` - Print counts from a result file
pub mod cli;

/// Configuration loaded from `~/.config/trawler/config.toml`.
pub mod config;

/// Core domain models: [`Task`](domain::Task), [`Item`](domain::Item),
/// [`TaskResult`](domain::TaskResult).
pub mod domain;

/// Task execution.
pub mod engine;

/// Per-site extraction adapters.
pub mod sites;

/// Result persistence.
///
/// - [`ResultStore`](store::ResultStore): checkpoint trait
/// - [`JsonStore`](store::JsonStore): one indented JSON file per task
pub mod store;
