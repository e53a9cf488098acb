//! Archive access layer: CDX index discovery, resilient snapshot fetching,
//! and archive URL helpers.
//!
//! This crate provides:
//! - [`cdx`]: index queries and the monthly snapshot reduction
//! - [`Fetcher`]: HTTP fetch with bounded retries and exponential backoff
//! - [`wayback`]: snapshot URL construction and wrapper stripping

pub mod cdx;
pub mod fetch;
pub mod wayback;

pub use cdx::{discover_snapshots, reduce_monthly};
pub use fetch::Fetcher;
pub use wayback::{snapshot_url, unwrap_archive_url};
