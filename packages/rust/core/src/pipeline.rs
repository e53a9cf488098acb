//! The end-to-end scrape driver: index discovery, monthly reduction,
//! even sampling, sequential fetching with throttling, extraction,
//! subpage mining, classification, and deduplication.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use waybackjobs_archive::{
    Fetcher, discover_snapshots, reduce_monthly, snapshot_url, unwrap_archive_url,
};
use waybackjobs_extract::ExtractorChain;
use waybackjobs_shared::{JobRecord, Result, SnapshotDescriptor, WaybackJobsError};

use crate::dedup::{assign_teams, deduplicate, organize_by_team};

/// How many already-fetched listing pages to mine for subpage links.
const SUBPAGE_SOURCE_PAGES: usize = 3;

/// Overall subpage snapshot budget when no snapshot cap was given.
const DEFAULT_SUBPAGE_BUDGET: usize = 50;

/// Everything one scrape run needs to know. Built by the caller from
/// loaded configuration plus command-line overrides.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// The listing URL to look up in the index (host + path, no scheme).
    pub target_url: String,
    pub cdx_api_url: String,
    pub wayback_base: String,
    /// Inclusive date range bounds, `YYYYMMDD`.
    pub from: String,
    pub to: String,
    /// Cap on main-target snapshots to fetch; `None` fetches every
    /// monthly survivor.
    pub max_snapshots: Option<usize>,
    /// Pause between consecutive fetches. Zero disables throttling.
    pub request_delay_secs: f64,
    pub request_timeout_secs: u64,
    pub skip_subpages: bool,
    pub no_dedup: bool,
}

/// What a completed scrape produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub target_url: String,
    pub from: String,
    pub to: String,
    /// Raw index hits before monthly reduction.
    pub snapshots_discovered: usize,
    /// Snapshot pages fetched successfully (main target and subpages).
    pub snapshots_processed: usize,
    pub fetch_failures: usize,
    /// Subpages that contributed at least one fetched snapshot.
    pub subpages_scraped: usize,
    /// Record count before deduplication.
    pub total_jobs_found: usize,
    /// Record count after deduplication (equal to the above with `--no-dedup`).
    pub total_unique_jobs: usize,
    pub jobs_by_team: BTreeMap<String, Vec<JobRecord>>,
}

/// Receives coarse progress signals during a run. The CLI renders these
/// on a spinner; library callers can pass [`SilentProgress`].
pub trait ScrapeProgress: Send + Sync {
    fn stage(&self, _message: &str) {}
    fn snapshot(&self, _current: usize, _total: usize, _timestamp: &str) {}
}

/// No-op progress sink.
pub struct SilentProgress;

impl ScrapeProgress for SilentProgress {}

/// Run a full scrape.
///
/// Terminal failures are [`WaybackJobsError::NoSnapshots`] (the index had
/// nothing for the target in range) and [`WaybackJobsError::NoJobs`]
/// (every snapshot and tier came up empty). Individual snapshot fetch
/// failures are logged and counted, never fatal.
#[instrument(skip_all, fields(target = %config.target_url, from = %config.from, to = %config.to))]
pub async fn run_scrape(
    config: &ScrapeConfig,
    progress: &dyn ScrapeProgress,
) -> Result<ScrapeReport> {
    let fetcher = Fetcher::new(config.request_timeout_secs)?;
    let chain = ExtractorChain::new();

    progress.stage("querying the snapshot index");
    let discovered = discover_snapshots(
        &fetcher,
        &config.cdx_api_url,
        &config.target_url,
        &config.from,
        &config.to,
    )
    .await;
    if discovered.is_empty() {
        return Err(WaybackJobsError::NoSnapshots);
    }
    let snapshots_discovered = discovered.len();

    let reduced = reduce_monthly(discovered);
    let selected = sample_evenly(&reduced, config.max_snapshots);
    info!(
        discovered = snapshots_discovered,
        monthly = reduced.len(),
        selected = selected.len(),
        "snapshot selection"
    );

    progress.stage("fetching snapshots");
    let mut jobs: Vec<JobRecord> = Vec::new();
    let mut source_pages: Vec<String> = Vec::new();
    let mut snapshots_processed = 0usize;
    let mut fetch_failures = 0usize;

    for (i, snap) in selected.iter().enumerate() {
        progress.snapshot(i + 1, selected.len(), &snap.timestamp);
        match scrape_snapshot(&fetcher, &chain, &config.wayback_base, snap).await {
            Ok((html, mut found)) => {
                snapshots_processed += 1;
                jobs.append(&mut found);
                if source_pages.len() < SUBPAGE_SOURCE_PAGES {
                    source_pages.push(html);
                }
            }
            Err(e) => {
                fetch_failures += 1;
                warn!(timestamp = %snap.timestamp, error = %e, "snapshot fetch failed, continuing");
            }
        }
        throttle(config.request_delay_secs).await;
    }

    let mut subpages_scraped = 0usize;
    if !config.skip_subpages {
        let subpages = discover_subpages(&source_pages, &config.target_url);
        if !subpages.is_empty() {
            progress.stage("scraping team subpages");
            let per_page = subpage_budget(config.max_snapshots, subpages.len());
            let sub_from = range_bound(selected.first(), &config.from);
            let sub_to = range_bound(selected.last(), &config.to);
            info!(count = subpages.len(), per_page, "mined subpage links");

            for subpage in &subpages {
                let found = discover_snapshots(
                    &fetcher,
                    &config.cdx_api_url,
                    subpage,
                    &sub_from,
                    &sub_to,
                )
                .await;
                let mut contributed = false;
                for snap in reduce_monthly(found).iter().take(per_page) {
                    match scrape_snapshot(&fetcher, &chain, &config.wayback_base, snap).await {
                        Ok((_, mut found)) => {
                            snapshots_processed += 1;
                            contributed = true;
                            jobs.append(&mut found);
                        }
                        Err(e) => {
                            fetch_failures += 1;
                            warn!(subpage, timestamp = %snap.timestamp, error = %e, "subpage fetch failed, continuing");
                        }
                    }
                    throttle(config.request_delay_secs).await;
                }
                if contributed {
                    subpages_scraped += 1;
                }
                // The index query above was a network call too; a subpage
                // with zero snapshots must not make the next query fire
                // back-to-back.
                throttle(config.request_delay_secs).await;
            }
        }
    }

    if jobs.is_empty() {
        return Err(WaybackJobsError::NoJobs);
    }

    progress.stage("classifying and deduplicating");
    let total_jobs_found = jobs.len();
    assign_teams(&mut jobs);
    let jobs = if config.no_dedup {
        jobs
    } else {
        deduplicate(jobs)
    };
    let total_unique_jobs = jobs.len();
    let jobs_by_team = organize_by_team(jobs);

    info!(
        total_jobs_found,
        total_unique_jobs,
        teams = jobs_by_team.len(),
        "scrape complete"
    );

    Ok(ScrapeReport {
        target_url: config.target_url.clone(),
        from: config.from.clone(),
        to: config.to.clone(),
        snapshots_discovered,
        snapshots_processed,
        fetch_failures,
        subpages_scraped,
        total_jobs_found,
        total_unique_jobs,
        jobs_by_team,
    })
}

/// What a sample run produced.
#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    pub timestamp: String,
    pub snapshot_date: Option<String>,
    pub saved_to: PathBuf,
    pub bytes: usize,
    pub jobs_found: usize,
    /// Winning extraction tier name, or `"none"`.
    pub tier: String,
}

/// Fetch one representative snapshot (the middle of the monthly-reduced
/// range), save its raw HTML next to the other outputs, and trial-run
/// the extraction chain over it. Used to eyeball markup before
/// committing to a long scrape.
#[instrument(skip_all, fields(target = %config.target_url))]
pub async fn sample_snapshot(
    config: &ScrapeConfig,
    output_dir: &Path,
    progress: &dyn ScrapeProgress,
) -> Result<SampleReport> {
    let fetcher = Fetcher::new(config.request_timeout_secs)?;

    progress.stage("querying the snapshot index");
    let discovered = discover_snapshots(
        &fetcher,
        &config.cdx_api_url,
        &config.target_url,
        &config.from,
        &config.to,
    )
    .await;
    if discovered.is_empty() {
        return Err(WaybackJobsError::NoSnapshots);
    }

    let reduced = reduce_monthly(discovered);
    let snap = reduced[reduced.len() / 2].clone();

    progress.stage("fetching one snapshot");
    let page_url = snapshot_url(&config.wayback_base, &snap.timestamp, &snap.original);
    let html = fetcher.fetch_text(&page_url).await?;

    std::fs::create_dir_all(output_dir).map_err(|e| WaybackJobsError::io(output_dir, e))?;
    let date = snap
        .snapshot_date()
        .unwrap_or_else(|| snap.timestamp.clone());
    let saved_to = output_dir.join(format!("sample_{date}.html"));
    std::fs::write(&saved_to, &html).map_err(|e| WaybackJobsError::io(&saved_to, e))?;

    let (jobs, tier) = ExtractorChain::new().extract(&html);
    info!(path = %saved_to.display(), jobs = jobs.len(), tier, "saved sample snapshot");

    Ok(SampleReport {
        timestamp: snap.timestamp.clone(),
        snapshot_date: snap.snapshot_date(),
        saved_to,
        bytes: html.len(),
        jobs_found: jobs.len(),
        tier: tier.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Fetch one snapshot page, extract records, and annotate each with the
/// snapshot date, the archive fetch URL, and the unwrapped posting URL.
async fn scrape_snapshot(
    fetcher: &Fetcher,
    chain: &ExtractorChain,
    wayback_base: &str,
    snap: &SnapshotDescriptor,
) -> Result<(String, Vec<JobRecord>)> {
    let page_url = snapshot_url(wayback_base, &snap.timestamp, &snap.original);
    let html = fetcher.fetch_text(&page_url).await?;

    let (mut jobs, tier) = chain.extract(&html);
    debug!(timestamp = %snap.timestamp, tier, count = jobs.len(), "extracted records");

    let date = snap.snapshot_date();
    for job in &mut jobs {
        job.snapshot_date = date.clone();
        job.wayback_url = Some(page_url.clone());
        if let Some(u) = job.url.as_deref() {
            job.original_url = Some(unwrap_archive_url(u));
        }
    }
    Ok((html, jobs))
}

async fn throttle(delay_secs: f64) {
    if delay_secs > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(delay_secs)).await;
    }
}

/// Pick at most `max` descriptors spread evenly across the list, always
/// including the first. `None` or a cap at or above the length keeps
/// everything.
fn sample_evenly(
    snapshots: &[SnapshotDescriptor],
    max: Option<usize>,
) -> Vec<SnapshotDescriptor> {
    match max {
        Some(n) if n > 0 && snapshots.len() > n => {
            let step = (snapshots.len() / n).max(1);
            snapshots.iter().step_by(step).take(n).cloned().collect()
        }
        _ => snapshots.to_vec(),
    }
}

/// Per-subpage snapshot cap: the overall budget split across the mined
/// subpages, floored at 5 so every team gets meaningful coverage.
fn subpage_budget(max_snapshots: Option<usize>, subpage_count: usize) -> usize {
    let overall = max_snapshots.unwrap_or(DEFAULT_SUBPAGE_BUDGET);
    (overall / subpage_count.max(1)).max(5)
}

/// `YYYYMMDD` bound from a descriptor's timestamp, falling back to the
/// configured bound.
fn range_bound(snap: Option<&SnapshotDescriptor>, fallback: &str) -> String {
    snap.and_then(|s| s.timestamp.get(..8))
        .unwrap_or(fallback)
        .to_string()
}

static SUBPAGE_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href=["']([^"']*teamworkonline\.com/basketball-jobs/[^"']+)["']"#)
        .expect("subpage href regex")
});

/// Mine already-fetched listing pages for links to per-team job pages.
///
/// Hrefs are unwrapped from the archive wrapper first. A link qualifies
/// when its path is at most three segments deep (team hubs and direct
/// postings, not archive chrome) and it is not the main target itself.
/// Results are deduplicated and sorted, as scheme-less host + path
/// strings ready for index queries.
fn discover_subpages(pages: &[String], target_url: &str) -> Vec<String> {
    let target = target_url.trim_end_matches('/');
    let mut found: BTreeSet<String> = BTreeSet::new();

    for html in pages {
        for caps in SUBPAGE_HREF_RE.captures_iter(html) {
            let href = unwrap_archive_url(&caps[1]);
            let Ok(url) = Url::parse(&href) else {
                continue;
            };
            let segments = url
                .path()
                .trim_matches('/')
                .split('/')
                .filter(|s| !s.is_empty())
                .count();
            if segments > 3 {
                continue;
            }
            let canonical = format!(
                "{}{}",
                url.host_str().unwrap_or_default(),
                url.path().trim_end_matches('/')
            );
            if canonical == target {
                continue;
            }
            found.insert(canonical);
        }
    }

    found.into_iter().collect()
}
