//! Team assignment, cross-snapshot deduplication, and team grouping.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use waybackjobs_extract::classify_team;
use waybackjobs_shared::JobRecord;

/// Give every record a definitive team label. After this pass `team` is
/// always `Some` and never empty; unmatched records carry the sentinel.
pub fn assign_teams(jobs: &mut [JobRecord]) {
    for job in jobs.iter_mut() {
        job.team = Some(classify_team(job));
    }
}

/// Sort key used when no snapshot date is present: sorts after every
/// real `YYYY-MM-DD` date, so dated sightings always win.
const UNDATED: &str = "9999";

/// Collapse the same posting seen across multiple snapshots.
///
/// Identity is the pair (trimmed lower-cased title, lower-cased team).
/// Among duplicates the record with the earliest snapshot date survives,
/// i.e. the first time the posting was observed; records without a date
/// lose to any dated sighting, and exact date ties keep the first-seen
/// record. Input order is otherwise preserved.
pub fn deduplicate(jobs: Vec<JobRecord>) -> Vec<JobRecord> {
    let before = jobs.len();
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut kept: Vec<JobRecord> = Vec::with_capacity(jobs.len());

    for job in jobs {
        let key = (
            job.title.as_deref().unwrap_or("").trim().to_lowercase(),
            job.team.as_deref().unwrap_or("").to_lowercase(),
        );
        match index.get(&key) {
            Some(&at) => {
                let held = kept[at].snapshot_date.as_deref().unwrap_or(UNDATED);
                let candidate = job.snapshot_date.as_deref().unwrap_or(UNDATED);
                if candidate < held {
                    kept[at] = job;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(job);
            }
        }
    }

    debug!(before, after = kept.len(), "deduplicated job records");
    kept
}

/// Group records by team name, alphabetically, preserving record order
/// within each team.
pub fn organize_by_team(jobs: Vec<JobRecord>) -> BTreeMap<String, Vec<JobRecord>> {
    let mut by_team: BTreeMap<String, Vec<JobRecord>> = BTreeMap::new();
    for job in jobs {
        let team = job.team.clone().unwrap_or_else(|| {
            waybackjobs_shared::heuristics::UNCLASSIFIED_TEAM.to_string()
        });
        by_team.entry(team).or_default().push(job);
    }
    by_team
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, team: &str, date: Option<&str>) -> JobRecord {
        JobRecord {
            title: Some(title.into()),
            team: Some(team.into()),
            snapshot_date: date.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn earliest_sighting_survives() {
        let jobs = vec![
            job("Head Coach", "Chicago Sky", Some("2024-01-10")),
            job("Head Coach", "Chicago Sky", Some("2023-11-02")),
        ];
        let kept = deduplicate(jobs);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].snapshot_date.as_deref(), Some("2023-11-02"));
    }

    #[test]
    fn identity_is_case_and_whitespace_insensitive() {
        let jobs = vec![
            job("  Head Coach ", "Chicago Sky", Some("2024-01-10")),
            job("head coach", "CHICAGO SKY", Some("2024-03-01")),
        ];
        assert_eq!(deduplicate(jobs).len(), 1);
    }

    #[test]
    fn same_title_different_team_is_distinct() {
        let jobs = vec![
            job("Head Coach", "Chicago Sky", None),
            job("Head Coach", "Atlanta Dream", None),
        ];
        assert_eq!(deduplicate(jobs).len(), 2);
    }

    #[test]
    fn undated_record_loses_to_dated() {
        let jobs = vec![
            job("Analyst", "WNBA", None),
            job("Analyst", "WNBA", Some("2024-06-01")),
        ];
        let kept = deduplicate(jobs);
        assert_eq!(kept[0].snapshot_date.as_deref(), Some("2024-06-01"));
    }

    #[test]
    fn date_tie_keeps_first_seen() {
        let mut first = job("Analyst", "WNBA", Some("2024-06-01"));
        first.location = Some("New York, NY".into());
        let second = job("Analyst", "WNBA", Some("2024-06-01"));

        let kept = deduplicate(vec![first, second]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].location.as_deref(), Some("New York, NY"));
    }

    #[test]
    fn assign_teams_fills_every_record() {
        let mut jobs = vec![
            JobRecord {
                title: Some("Seattle Storm Trainer".into()),
                ..Default::default()
            },
            JobRecord {
                title: Some("Barista".into()),
                ..Default::default()
            },
        ];
        assign_teams(&mut jobs);
        assert_eq!(jobs[0].team.as_deref(), Some("Seattle Storm"));
        assert_eq!(jobs[1].team.as_deref(), Some("unclassified"));
    }

    #[test]
    fn grouping_is_alphabetical() {
        let grouped = organize_by_team(vec![
            job("A", "Seattle Storm", None),
            job("B", "Atlanta Dream", None),
            job("C", "Seattle Storm", None),
        ]);
        let teams: Vec<&String> = grouped.keys().collect();
        assert_eq!(teams, ["Atlanta Dream", "Seattle Storm"]);
        assert_eq!(grouped["Seattle Storm"].len(), 2);
    }
}
