//! Core domain types for the snapshot extraction pipeline.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SnapshotDescriptor
// ---------------------------------------------------------------------------

/// One archived capture as reported by the CDX index API.
///
/// Immutable once built from an index row; consumed by the fetcher and
/// never persisted beyond a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDescriptor {
    /// Capture instant in sortable `YYYYMMDDhhmmss` form.
    pub timestamp: String,
    /// The real-world URL that was captured.
    pub original: String,
    /// HTTP status code recorded by the archive (as reported, e.g. "200").
    pub status_code: String,
    /// MIME type recorded by the archive.
    pub mime_type: String,
    /// Content digest used by the index to collapse identical captures.
    pub digest: String,
}

impl SnapshotDescriptor {
    /// The `YYYYMM` calendar-month key of this capture.
    pub fn month_key(&self) -> &str {
        let end = self.timestamp.len().min(6);
        &self.timestamp[..end]
    }

    /// The capture date as `YYYY-MM-DD`, or `None` if the timestamp is
    /// too short to carry a full date.
    pub fn snapshot_date(&self) -> Option<String> {
        if self.timestamp.len() < 8 || !self.timestamp.is_char_boundary(8) {
            return None;
        }
        let (y, rest) = self.timestamp.split_at(4);
        let (m, rest) = rest.split_at(2);
        let d = &rest[..2];
        Some(format!("{y}-{m}-{d}"))
    }
}

// ---------------------------------------------------------------------------
// JobRecord
// ---------------------------------------------------------------------------

/// One candidate job posting extracted from a snapshot.
///
/// A record is only kept when it has a non-empty title or url (see
/// [`JobRecord::is_viable`]). `team` is the single field mutated after
/// extraction (by the classifier); the snapshot annotations are written
/// once per snapshot by the pipeline driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Posting title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Posting link as found in the markup (may still carry the archive wrapper).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Resolved organization name. `None` until classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Location text, when the markup carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// `YYYY-MM-DD` date of the snapshot this record came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_date: Option<String>,
    /// The archive URL the snapshot was fetched from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wayback_url: Option<String>,
    /// The posting link with the archive wrapper stripped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
}

impl JobRecord {
    /// A record is worth keeping when it carries a non-empty title or url.
    pub fn is_viable(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
            || self.url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(ts: &str) -> SnapshotDescriptor {
        SnapshotDescriptor {
            timestamp: ts.into(),
            original: "https://example.com/jobs".into(),
            status_code: "200".into(),
            mime_type: "text/html".into(),
            digest: "ABCDEF".into(),
        }
    }

    #[test]
    fn month_key_takes_first_six_digits() {
        assert_eq!(descriptor("20240115123000").month_key(), "202401");
        assert_eq!(descriptor("2024").month_key(), "2024");
    }

    #[test]
    fn snapshot_date_from_timestamp() {
        assert_eq!(
            descriptor("20231102090000").snapshot_date(),
            Some("2023-11-02".into())
        );
        assert_eq!(descriptor("202311").snapshot_date(), None);
    }

    #[test]
    fn viability_requires_title_or_url() {
        let empty = JobRecord::default();
        assert!(!empty.is_viable());

        let titled = JobRecord {
            title: Some("Ticket Sales Associate".into()),
            ..Default::default()
        };
        assert!(titled.is_viable());

        let linked = JobRecord {
            url: Some("/basketball-jobs/chicago-sky/ticket-sales".into()),
            ..Default::default()
        };
        assert!(linked.is_viable());

        let blank = JobRecord {
            title: Some(String::new()),
            url: Some(String::new()),
            ..Default::default()
        };
        assert!(!blank.is_viable());
    }

    #[test]
    fn optional_fields_stay_out_of_serialized_form() {
        let record = JobRecord {
            title: Some("Coach".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains("title"));
        assert!(!json.contains("location"));
        assert!(!json.contains("wayback_url"));
    }
}
