//! Output writers for completed scrape runs.
//!
//! Four artifacts land in the output directory: `jobs_by_team.json`
//! (grouped records), `all_jobs.csv` (flat spreadsheet view),
//! `summary.md` (human-readable digest), and `full_export.json`
//! (records plus run metadata). Plus a stdout digest for the terminal.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use waybackjobs_shared::{JobRecord, Result, WaybackJobsError};

/// Run metadata stamped into the summary and the full export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportMeta {
    /// The listing URL that was scraped.
    pub source: String,
    /// Inclusive `YYYYMMDD` bounds of the run.
    pub from: String,
    pub to: String,
    pub snapshots_processed: usize,
    /// Record count before deduplication.
    pub total_jobs_found: usize,
}

/// Write the grouped records as pretty-printed JSON.
pub fn write_json(
    output_dir: &Path,
    jobs_by_team: &BTreeMap<String, Vec<JobRecord>>,
) -> Result<PathBuf> {
    let path = output_dir.join("jobs_by_team.json");
    let body = serde_json::to_string_pretty(jobs_by_team)
        .map_err(|e| WaybackJobsError::parse(format!("serializing grouped records: {e}")))?;
    std::fs::write(&path, body).map_err(|e| WaybackJobsError::io(&path, e))?;
    info!(path = %path.display(), "wrote grouped JSON");
    Ok(path)
}

/// Write every record as one flat CSV, sorted by team then snapshot
/// date, one posting per row.
pub fn write_csv(
    output_dir: &Path,
    jobs_by_team: &BTreeMap<String, Vec<JobRecord>>,
) -> Result<PathBuf> {
    let path = output_dir.join("all_jobs.csv");
    let mut writer = csv::Writer::from_path(&path).map_err(|e| csv_error(&path, e))?;

    writer
        .write_record([
            "team",
            "title",
            "location",
            "snapshot_date",
            "original_url",
            "wayback_url",
        ])
        .map_err(|e| csv_error(&path, e))?;

    for (team, jobs) in jobs_by_team {
        let mut jobs: Vec<&JobRecord> = jobs.iter().collect();
        jobs.sort_by_key(|j| j.snapshot_date.as_deref().unwrap_or("").to_string());
        for job in jobs {
            writer
                .write_record([
                    team.as_str(),
                    job.title.as_deref().unwrap_or(""),
                    job.location.as_deref().unwrap_or(""),
                    job.snapshot_date.as_deref().unwrap_or(""),
                    job.original_url.as_deref().unwrap_or(""),
                    job.wayback_url.as_deref().unwrap_or(""),
                ])
                .map_err(|e| csv_error(&path, e))?;
        }
    }

    writer.flush().map_err(|e| WaybackJobsError::io(&path, e))?;
    info!(path = %path.display(), "wrote CSV");
    Ok(path)
}

/// Write the human-readable Markdown digest.
pub fn write_summary(
    output_dir: &Path,
    jobs_by_team: &BTreeMap<String, Vec<JobRecord>>,
    meta: &ExportMeta,
) -> Result<PathBuf> {
    let path = output_dir.join("summary.md");
    let total_unique: usize = jobs_by_team.values().map(Vec::len).sum();

    let mut out = String::new();
    out.push_str("# WNBA Team Jobs: Historical Snapshot Summary\n\n");
    out.push_str(&format!(
        "Generated: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!("Source: {}\n", meta.source));
    out.push_str(&format!("Date range: {} to {}\n", meta.from, meta.to));
    out.push_str(&format!(
        "Snapshots processed: {}\n",
        meta.snapshots_processed
    ));
    out.push_str(&format!("Teams with postings: {}\n", jobs_by_team.len()));
    out.push_str(&format!("Unique job listings: {total_unique}\n"));

    for (team, jobs) in jobs_by_team {
        out.push_str(&format!("\n## {team} ({})\n\n", jobs.len()));
        let mut jobs: Vec<&JobRecord> = jobs.iter().collect();
        jobs.sort_by_key(|j| j.snapshot_date.as_deref().unwrap_or("").to_string());
        for job in jobs {
            let title = job.title.as_deref().unwrap_or("(untitled)");
            let date = job.snapshot_date.as_deref().unwrap_or("undated");
            match job.location.as_deref() {
                Some(loc) if !loc.is_empty() => {
                    out.push_str(&format!("- **{title}** ({date} | {loc})\n"));
                }
                _ => out.push_str(&format!("- **{title}** ({date})\n")),
            }
        }
    }

    std::fs::write(&path, out).map_err(|e| WaybackJobsError::io(&path, e))?;
    info!(path = %path.display(), "wrote summary");
    Ok(path)
}

#[derive(Serialize)]
struct FullExport<'a> {
    metadata: FullExportMeta<'a>,
    jobs_by_team: &'a BTreeMap<String, Vec<JobRecord>>,
}

#[derive(Serialize)]
struct FullExportMeta<'a> {
    source: &'a str,
    date_range: DateRange<'a>,
    snapshots_processed: usize,
    total_jobs_found: usize,
    total_unique_jobs: usize,
    generated_utc: String,
}

#[derive(Serialize)]
struct DateRange<'a> {
    from: &'a str,
    to: &'a str,
}

/// Write the complete machine-readable export: run metadata plus every
/// grouped record.
pub fn write_full_export(
    output_dir: &Path,
    jobs_by_team: &BTreeMap<String, Vec<JobRecord>>,
    meta: &ExportMeta,
) -> Result<PathBuf> {
    let path = output_dir.join("full_export.json");
    let export = FullExport {
        metadata: FullExportMeta {
            source: &meta.source,
            date_range: DateRange {
                from: &meta.from,
                to: &meta.to,
            },
            snapshots_processed: meta.snapshots_processed,
            total_jobs_found: meta.total_jobs_found,
            total_unique_jobs: jobs_by_team.values().map(Vec::len).sum(),
            generated_utc: Utc::now().to_rfc3339(),
        },
        jobs_by_team,
    };
    let body = serde_json::to_string_pretty(&export)
        .map_err(|e| WaybackJobsError::parse(format!("serializing full export: {e}")))?;
    std::fs::write(&path, body).map_err(|e| WaybackJobsError::io(&path, e))?;
    info!(path = %path.display(), "wrote full export");
    Ok(path)
}

/// How many example titles the stdout digest prints per team.
const DIGEST_EXAMPLES: usize = 3;

/// Print the terminal digest of a completed run.
pub fn print_summary(jobs_by_team: &BTreeMap<String, Vec<JobRecord>>, meta: &ExportMeta) {
    let total_unique: usize = jobs_by_team.values().map(Vec::len).sum();

    println!();
    println!("{}", "=".repeat(50));
    println!("Scrape complete: {}", meta.source);
    println!("{}", "=".repeat(50));
    println!("Snapshots processed: {}", meta.snapshots_processed);
    println!("Job sightings found: {}", meta.total_jobs_found);
    println!("Unique job listings: {total_unique}");
    println!("Teams with postings: {}", jobs_by_team.len());

    for (team, jobs) in jobs_by_team {
        println!();
        println!("{team}: {} listing(s)", jobs.len());
        for job in jobs.iter().take(DIGEST_EXAMPLES) {
            println!("  - {}", job.title.as_deref().unwrap_or("(untitled)"));
        }
        if jobs.len() > DIGEST_EXAMPLES {
            println!("  ... and {} more", jobs.len() - DIGEST_EXAMPLES);
        }
    }
    println!();
}

fn csv_error(path: &Path, e: csv::Error) -> WaybackJobsError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => WaybackJobsError::io(path, io),
        other => WaybackJobsError::validation(format!("csv write failed: {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, team: &str, date: &str, location: Option<&str>) -> JobRecord {
        JobRecord {
            title: Some(title.into()),
            team: Some(team.into()),
            snapshot_date: Some(date.into()),
            location: location.map(String::from),
            original_url: Some(format!("https://example.com/{title}")),
            wayback_url: Some("https://web.archive.org/web/20240110id_/x".into()),
            ..Default::default()
        }
    }

    fn sample_data() -> (BTreeMap<String, Vec<JobRecord>>, ExportMeta) {
        let mut by_team = BTreeMap::new();
        by_team.insert(
            "Chicago Sky".to_string(),
            vec![
                job("Head Coach", "Chicago Sky", "2024-03-01", Some("Chicago, IL")),
                job("Trainer", "Chicago Sky", "2023-11-02", None),
            ],
        );
        by_team.insert(
            "Atlanta Dream".to_string(),
            vec![job("Analyst", "Atlanta Dream", "2024-01-15", None)],
        );
        let meta = ExportMeta {
            source: "www.teamworkonline.com/basketball-jobs/wnbateamjobs/wnba-team-jobs".into(),
            from: "20230101".into(),
            to: "20241231".into(),
            snapshots_processed: 12,
            total_jobs_found: 5,
        };
        (by_team, meta)
    }

    #[test]
    fn json_round_trips_grouped_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (by_team, _) = sample_data();

        let path = write_json(dir.path(), &by_team).expect("write");
        let body = std::fs::read_to_string(&path).expect("read");
        let parsed: BTreeMap<String, Vec<JobRecord>> =
            serde_json::from_str(&body).expect("parse");
        assert_eq!(parsed, by_team);
    }

    #[test]
    fn csv_has_header_and_date_sorted_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (by_team, _) = sample_data();

        let path = write_csv(dir.path(), &by_team).expect("write");
        let body = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = body.lines().collect();

        assert_eq!(
            lines[0],
            "team,title,location,snapshot_date,original_url,wayback_url"
        );
        assert_eq!(lines.len(), 4);
        // Teams alphabetical, then dates ascending within a team.
        assert!(lines[1].starts_with("Atlanta Dream,Analyst"));
        assert!(lines[2].starts_with("Chicago Sky,Trainer"));
        assert!(lines[3].starts_with("Chicago Sky,Head Coach"));
    }

    #[test]
    fn summary_lists_teams_with_counts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (by_team, meta) = sample_data();

        let path = write_summary(dir.path(), &by_team, &meta).expect("write");
        let body = std::fs::read_to_string(&path).expect("read");

        assert!(body.contains("## Atlanta Dream (1)"));
        assert!(body.contains("## Chicago Sky (2)"));
        assert!(body.contains("- **Head Coach** (2024-03-01 | Chicago, IL)"));
        assert!(body.contains("- **Trainer** (2023-11-02)"));
        assert!(body.contains("Unique job listings: 3"));
        assert!(body.contains("Date range: 20230101 to 20241231"));
    }

    #[test]
    fn full_export_carries_metadata() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (by_team, meta) = sample_data();

        let path = write_full_export(dir.path(), &by_team, &meta).expect("write");
        let body = std::fs::read_to_string(&path).expect("read");
        let parsed: serde_json::Value = serde_json::from_str(&body).expect("parse");

        assert_eq!(parsed["metadata"]["snapshots_processed"], 12);
        assert_eq!(parsed["metadata"]["total_jobs_found"], 5);
        assert_eq!(parsed["metadata"]["total_unique_jobs"], 3);
        assert_eq!(parsed["metadata"]["date_range"]["from"], "20230101");
        assert!(parsed["metadata"]["generated_utc"].is_string());
        assert!(parsed["jobs_by_team"]["Chicago Sky"].is_array());
    }
}
