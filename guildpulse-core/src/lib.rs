//! # guildpulse-core
//!
//! Read-side analytics over the pre-aggregated activity tables of a chat
//! community bot.
//!
//! This library provides:
//! - Typed, window-scoped reads over the aggregate SQLite store
//! - Pure metric assemblers (distribution, temporal, latency, content, engagement)
//! - A single facade that combines them into an [`ActivityReport`]
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use guildpulse_core::{get_activity_report, AggregateStore, Config};
//!
//! let config = Config::load().expect("failed to load config");
//! let store = AggregateStore::from_config(&config);
//!
//! let report = get_activity_report(&store, 1234, 30).expect("failed to build report");
//! println!("{}", serde_json::to_string_pretty(&report).unwrap());
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{get_activity_report, get_activity_report_at, ActivityReport, GuildTimeWindow};
pub use config::Config;
pub use db::{AggregateReader, AggregateStore};
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod types;
