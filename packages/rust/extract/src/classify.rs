//! Resolve job records to known organizations.

use std::sync::LazyLock;

use regex::Regex;

use waybackjobs_shared::JobRecord;
use waybackjobs_shared::heuristics::{TEAM_ROSTER, UNCLASSIFIED_TEAM};

/// Captures the path segment after the job-path marker, when a deeper
/// path follows it (i.e. the link points at a specific posting).
static TEAM_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/basketball-jobs/([^/]+)/").expect("team segment regex"));

/// Path segments that name the league-wide hub pages, never a team.
const NON_TEAM_SEGMENTS: &[&str] = &["wnbateamjobs", "wnba-team", "wnba-team-jobs"];

/// Classify a record to an organization name. Never empty.
///
/// Resolution order, first match wins:
/// 1. an explicit non-empty `team` is returned unchanged;
/// 2. the lower-cased concatenation of title + original URL + fetch URL
///    is searched for each roster entry in roster order, by name and then
///    by space-to-hyphen slug;
/// 3. otherwise the fixed sentinel.
///
/// Deterministic and roster-order-sensitive: text matching two roster
/// entries resolves to whichever appears first.
pub fn classify_team(job: &JobRecord) -> String {
    if let Some(team) = job.team.as_deref() {
        if !team.is_empty() {
            return team.to_string();
        }
    }

    let text = format!(
        "{} {} {}",
        job.title.as_deref().unwrap_or(""),
        job.original_url.as_deref().unwrap_or(""),
        job.url.as_deref().unwrap_or(""),
    )
    .to_lowercase();

    for team in TEAM_ROSTER {
        if text.contains(&team.to_lowercase()) {
            return (*team).to_string();
        }
        let slug = team.to_lowercase().replace(' ', "-");
        if text.contains(&slug) {
            return (*team).to_string();
        }
    }

    UNCLASSIFIED_TEAM.to_string()
}

/// Try to infer an organization name from a job URL's path segment,
/// e.g. `/basketball-jobs/chicago-sky/some-posting` → `Chicago Sky`.
/// Hub-page segments and empty leftovers infer nothing.
pub fn team_from_url(url: &str) -> Option<String> {
    let caps = TEAM_SEGMENT_RE.captures(url)?;
    let raw = caps[1].trim_matches('-').to_lowercase();

    // Reject hub segments before suffix stripping, so "wnbateamjobs"
    // cannot slip through as "Wnbateam".
    if raw.is_empty() || NON_TEAM_SEGMENTS.contains(&raw.as_str()) {
        return None;
    }

    let slug = raw
        .strip_suffix("jobs")
        .or_else(|| raw.strip_suffix("team"))
        .unwrap_or(&raw)
        .trim_matches('-');

    if slug.is_empty() {
        return None;
    }
    Some(slug_to_name(slug))
}

/// Convert a URL slug like `chicago-sky` to `Chicago Sky`.
fn slug_to_name(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
