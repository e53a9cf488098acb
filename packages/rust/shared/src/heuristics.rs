//! Fixed heuristic tables used by the extraction pipeline.
//!
//! These are configuration data, not behavior: the archived HTML spans
//! several site redesigns with inconsistent markup, so matching is
//! deliberately permissive (case-insensitive substring tests against
//! these lists). Extend the lists, not the scanning logic.

/// Known WNBA organizations, in matching order. The classifier scans this
/// list front to back and the first substring hit wins, so ordering is a
/// deliberate tie-break policy; do not reorder without evidence.
pub const TEAM_ROSTER: &[&str] = &[
    "Atlanta Dream",
    "Chicago Sky",
    "Connecticut Sun",
    "Dallas Wings",
    "Golden State Valkyries",
    "Indiana Fever",
    "Las Vegas Aces",
    "Los Angeles Sparks",
    "Minnesota Lynx",
    "New York Liberty",
    "Phoenix Mercury",
    "Portland",
    "Seattle Storm",
    "Washington Mystics",
    "WNBA League Office",
    "WNBA",
];

/// Sentinel returned when no roster entry matches a record.
pub const UNCLASSIFIED_TEAM: &str = "unclassified";

/// Block-level tags that can open a job-card container.
pub const JOB_CARD_TAGS: &[&str] = &["div", "li", "article", "section"];

/// Class-attribute fragments that mark a job-card container.
pub const JOB_CARD_CLASS_FRAGMENTS: &[&str] = &[
    "organization-portal__job",
    "opportunitysearchresult",
    "search-result",
    "job-listing",
    "job-card",
    "job-item",
    "opportunity-listing",
];

/// Class-attribute fragments that mark a team/organization name element.
pub const TEAM_CLASS_FRAGMENTS: &[&str] = &[
    "organization-portal__profile",
    "organization-name",
    "team-name",
    "employer",
    "company",
    "org-name",
];

/// Class-attribute fragments that mark a location element.
pub const LOCATION_CLASS_FRAGMENTS: &[&str] = &["location", "city", "job-location"];

/// Anchor texts that are navigation chrome, never job titles.
pub const NAV_TEXT_DENYLIST: &[&str] = &[
    "sign in", "log in", "register", "home", "about", "contact", "privacy", "terms",
];

/// True when an href looks like a link to a job posting or job listing.
pub fn is_job_link(href: &str) -> bool {
    let href = href.to_lowercase();
    href.contains("/basketball-jobs/")
        || (href.contains("teamworkonline.com") && href.contains("/jobs/"))
        || href.contains("/opening/")
}

/// True when the tag + class pair marks the start of a job card.
pub fn is_job_card(tag: &str, class: &str) -> bool {
    if !JOB_CARD_TAGS.contains(&tag) {
        return false;
    }
    let class = class.to_lowercase();
    JOB_CARD_CLASS_FRAGMENTS.iter().any(|p| class.contains(p))
}

/// True when the class attribute marks a team/organization name element.
pub fn is_team_element(class: &str) -> bool {
    let class = class.to_lowercase();
    TEAM_CLASS_FRAGMENTS.iter().any(|p| class.contains(p))
}

/// True when the class attribute marks a location element.
pub fn is_location_element(class: &str) -> bool {
    let class = class.to_lowercase();
    LOCATION_CLASS_FRAGMENTS.iter().any(|p| class.contains(p))
}

/// True when anchor text is navigational chrome per the denylist.
pub fn is_nav_text(text: &str) -> bool {
    let text = text.to_lowercase();
    NAV_TEXT_DENYLIST.iter().any(|t| text.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_link_patterns() {
        assert!(is_job_link("/basketball-jobs/chicago-sky/ticket-rep"));
        assert!(is_job_link(
            "https://www.teamworkonline.com/jobs/account-exec"
        ));
        assert!(is_job_link("/opening/12345"));
        assert!(is_job_link("/Basketball-Jobs/ATLANTA-DREAM/coach"));
        assert!(!is_job_link("https://example.com/about"));
    }

    #[test]
    fn job_card_requires_block_tag_and_class() {
        assert!(is_job_card("div", "OpportunitySearchResult__item"));
        assert!(is_job_card("li", "search-result compact"));
        assert!(!is_job_card("span", "job-card"));
        assert!(!is_job_card("div", "hero-banner"));
    }

    #[test]
    fn field_element_detection() {
        assert!(is_team_element("organization-portal__profile-link"));
        assert!(is_team_element("Employer-Badge"));
        assert!(!is_team_element("job-title"));

        assert!(is_location_element("job-location"));
        assert!(is_location_element("City-tag"));
        assert!(!is_location_element("salary"));
    }

    #[test]
    fn nav_denylist_matches_case_insensitively() {
        assert!(is_nav_text("Sign In"));
        assert!(is_nav_text("PRIVACY policy"));
        assert!(!is_nav_text("Director of Basketball Operations"));
    }
}
