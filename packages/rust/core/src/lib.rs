//! Pipeline orchestration: ties index discovery, fetching, extraction,
//! classification, and deduplication into one scrape run.

pub mod dedup;
pub mod pipeline;

pub use dedup::{assign_teams, deduplicate, organize_by_team};
pub use pipeline::{
    SampleReport, ScrapeConfig, ScrapeProgress, ScrapeReport, SilentProgress, run_scrape,
    sample_snapshot,
};
