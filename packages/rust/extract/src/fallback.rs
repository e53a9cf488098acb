//! Lower-confidence extraction passes, used only when the structural
//! scan comes up empty for a document.

use std::sync::LazyLock;

use regex::Regex;

use waybackjobs_shared::JobRecord;
use waybackjobs_shared::heuristics::is_nav_text;

use crate::classify::team_from_url;
use crate::scanner::SideLink;
use crate::scanner::tokens::normalize_ws;

/// Matches an anchor whose href contains the job-path marker, capturing
/// the href and the (possibly tag-laden) inner text.
static JOB_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a[^>]+href=["']([^"']*/basketball-jobs/[^"']+)["'][^>]*>(.*?)</a>"#)
        .expect("job anchor regex")
});

/// Build records from the side list of job-like links: any link with
/// non-empty anchor text that is not navigation chrome becomes a record,
/// with the team inferred from the URL when possible.
///
/// Pure and order-stable with respect to the input list.
pub fn links_fallback(links: &[SideLink]) -> Vec<JobRecord> {
    links
        .iter()
        .filter(|link| !link.text.is_empty() && !is_nav_text(&link.text))
        .map(|link| JobRecord {
            title: Some(link.text.clone()),
            url: Some(link.href.clone()),
            team: team_from_url(&link.href),
            ..Default::default()
        })
        .collect()
}

/// Last-resort pass over the raw markup: regex out every job-path anchor,
/// strip nested tags from its inner text, and keep texts longer than
/// three characters. Tolerates documents too malformed for the tag-stack
/// scanner to track.
pub fn pattern_fallback(html: &str) -> Vec<JobRecord> {
    JOB_ANCHOR_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let href = caps[1].to_string();
            let text = normalize_ws(&strip_tags(&caps[2]));
            if text.len() <= 3 {
                return None;
            }
            Some(JobRecord {
                title: Some(text),
                url: Some(href.clone()),
                team: team_from_url(&href),
                ..Default::default()
            })
        })
        .collect()
}

/// Remove every `<...>` span from the string.
fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(href: &str, text: &str) -> SideLink {
        SideLink {
            href: href.into(),
            text: text.into(),
        }
    }

    #[test]
    fn link_fallback_keeps_titled_non_nav_links() {
        let links = vec![
            link("/basketball-jobs/chicago-sky/rep", "Ticket Sales Rep"),
            link("/basketball-jobs/wnbateamjobs/all", ""),
            link("/basketball-jobs/account/login", "Sign in to apply"),
        ];
        let jobs = links_fallback(&links);

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title.as_deref(), Some("Ticket Sales Rep"));
        assert_eq!(jobs[0].url.as_deref(), Some("/basketball-jobs/chicago-sky/rep"));
        assert_eq!(jobs[0].team.as_deref(), Some("Chicago Sky"));
    }

    #[test]
    fn link_fallback_leaves_team_unset_when_uninferrable() {
        let links = vec![link("/basketball-jobs/wnbateamjobs/listing", "Coordinator")];
        let jobs = links_fallback(&links);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].team, None);
    }

    #[test]
    fn pattern_fallback_extracts_from_raw_markup() {
        let html = r#"
            junk <table><a href="/basketball-jobs/dallas-wings/manager">
            <b>Team</b> Operations Manager</a> more junk
        "#;
        let jobs = pattern_fallback(html);

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title.as_deref(), Some("Team Operations Manager"));
        assert_eq!(jobs[0].team.as_deref(), Some("Dallas Wings"));
    }

    #[test]
    fn pattern_fallback_discards_short_texts() {
        let html = r#"<a href="/basketball-jobs/chicago-sky/x">Go</a>"#;
        assert!(pattern_fallback(html).is_empty());
    }

    #[test]
    fn pattern_fallback_is_order_stable() {
        let html = r#"
            <a href="/basketball-jobs/a-team/one">First Posting</a>
            <a href="/basketball-jobs/b-team/two">Second Posting</a>
        "#;
        let first = pattern_fallback(html);
        let second = pattern_fallback(html);
        assert_eq!(first, second);
        assert_eq!(first[0].title.as_deref(), Some("First Posting"));
        assert_eq!(first[1].title.as_deref(), Some("Second Posting"));
    }

    #[test]
    fn strip_tags_drops_nested_markup() {
        assert_eq!(strip_tags("<span>Data</span> <em>Analyst</em>"), "Data Analyst");
    }
}
