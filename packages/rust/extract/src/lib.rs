//! Job-listing extraction from archived HTML.
//!
//! Three tiers run in fixed priority order: the structural card scan,
//! the link-list fallback, and the raw regex pattern sweep. The first
//! tier that produces any records wins for a given document; tiers are
//! never mixed.

pub mod classify;
pub mod fallback;
pub mod scanner;

use tracing::{debug, warn};

use waybackjobs_shared::JobRecord;

pub use classify::{classify_team, team_from_url};
pub use fallback::{links_fallback, pattern_fallback};
pub use scanner::{ScanOutcome, SideLink, scan_listing};

/// One extraction tier.
pub trait ExtractStrategy {
    /// Stable name, used in logs and reports.
    fn name(&self) -> &'static str;
    fn extract(&self, html: &str) -> Vec<JobRecord>;
}

/// Tier 1: the depth-tracked card scan.
pub struct StructuralStrategy;

impl ExtractStrategy for StructuralStrategy {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn extract(&self, html: &str) -> Vec<JobRecord> {
        let outcome = scan_listing(html);
        if let Some(reason) = outcome.aborted {
            warn!(%reason, "structural scan stopped early");
        }
        outcome.jobs
    }
}

/// Tier 2: records rebuilt from the side list of job-like links.
pub struct LinkStrategy;

impl ExtractStrategy for LinkStrategy {
    fn name(&self) -> &'static str {
        "links"
    }

    fn extract(&self, html: &str) -> Vec<JobRecord> {
        links_fallback(&scan_listing(html).links)
    }
}

/// Tier 3: raw regex sweep over the markup.
pub struct PatternStrategy;

impl ExtractStrategy for PatternStrategy {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn extract(&self, html: &str) -> Vec<JobRecord> {
        pattern_fallback(html)
    }
}

/// The ordered tier chain. Documents are handed to each tier in turn;
/// the first non-empty result is returned along with the tier's name.
pub struct ExtractorChain {
    strategies: Vec<Box<dyn ExtractStrategy + Send + Sync>>,
}

impl Default for ExtractorChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorChain {
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(StructuralStrategy),
                Box::new(LinkStrategy),
                Box::new(PatternStrategy),
            ],
        }
    }

    /// Run the chain over one document. Returns the winning tier's
    /// records and its name, or an empty vector and `"none"` when every
    /// tier comes up empty.
    pub fn extract(&self, html: &str) -> (Vec<JobRecord>, &'static str) {
        for strategy in &self.strategies {
            let jobs = strategy.extract(html);
            if !jobs.is_empty() {
                debug!(tier = strategy.name(), count = jobs.len(), "extraction tier matched");
                return (jobs, strategy.name());
            }
        }
        (Vec::new(), "none")
    }
}
