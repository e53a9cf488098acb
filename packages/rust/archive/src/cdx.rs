//! CDX index client: discover archived captures of a target URL.

use std::collections::HashMap;

use tracing::{info, warn};
use url::Url;

use waybackjobs_shared::SnapshotDescriptor;

use crate::fetch::Fetcher;

/// Fields requested from the index, in column order.
const CDX_FIELDS: &str = "timestamp,original,statuscode,mimetype,digest";

/// Query the CDX index for all captures of `target` between `from` and
/// `to` (inclusive, `YYYYMMDD`), filtered server-side to successful HTML
/// responses and collapsed by content digest.
///
/// Fails softly: an unreachable index, a malformed response, or an empty
/// result all yield an empty list with a warning. Zero snapshots is a
/// valid terminal state for a query; only the pipeline decides whether
/// it is fatal for the primary target.
pub async fn discover_snapshots(
    fetcher: &Fetcher,
    cdx_api_url: &str,
    target: &str,
    from: &str,
    to: &str,
) -> Vec<SnapshotDescriptor> {
    let query_url = match build_query_url(cdx_api_url, target, from, to) {
        Ok(url) => url,
        Err(e) => {
            warn!(cdx_api_url, error = %e, "invalid CDX endpoint");
            return Vec::new();
        }
    };

    info!(url = %query_url, "querying CDX index");

    let body = match fetcher.fetch_text(query_url.as_str()).await {
        Ok(body) => body,
        Err(e) => {
            warn!(target, error = %e, "CDX query failed");
            return Vec::new();
        }
    };

    let snapshots = parse_cdx_response(&body);
    if snapshots.is_empty() {
        warn!(target, from, to, "CDX index returned no snapshots");
    } else {
        info!(target, count = snapshots.len(), "discovered unique snapshots");
    }
    snapshots
}

/// Build the index query URL. The `filter` key repeats.
fn build_query_url(
    cdx_api_url: &str,
    target: &str,
    from: &str,
    to: &str,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(cdx_api_url)?;
    url.query_pairs_mut()
        .append_pair("url", target)
        .append_pair("output", "json")
        .append_pair("fl", CDX_FIELDS)
        .append_pair("filter", "statuscode:200")
        .append_pair("filter", "mimetype:text/html")
        .append_pair("from", from)
        .append_pair("to", to)
        .append_pair("collapse", "digest");
    Ok(url)
}

/// Parse the CDX array-of-arrays response. Row 0 names the columns;
/// each later row is zipped positionally against that header.
fn parse_cdx_response(body: &str) -> Vec<SnapshotDescriptor> {
    let rows: Vec<Vec<String>> = match serde_json::from_str(body) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, "malformed CDX response");
            return Vec::new();
        }
    };

    if rows.len() < 2 {
        return Vec::new();
    }

    let header: HashMap<&str, usize> = rows[0]
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let field = |row: &[String], name: &str| -> String {
        header
            .get(name)
            .and_then(|&i| row.get(i))
            .cloned()
            .unwrap_or_default()
    };

    rows[1..]
        .iter()
        .filter_map(|row| {
            let timestamp = field(row, "timestamp");
            let original = field(row, "original");
            if timestamp.is_empty() || original.is_empty() {
                return None;
            }
            Some(SnapshotDescriptor {
                timestamp,
                original,
                status_code: field(row, "statuscode"),
                mime_type: field(row, "mimetype"),
                digest: field(row, "digest"),
            })
        })
        .collect()
}

/// Keep at most one descriptor per calendar month (the earliest-timestamped
/// one) and return the survivors sorted by timestamp ascending.
///
/// Pure and input-order independent: the same set of descriptors always
/// reduces to the same list. Bounds total fetch volume for multi-year
/// ranges while preserving longitudinal coverage.
pub fn reduce_monthly(snapshots: Vec<SnapshotDescriptor>) -> Vec<SnapshotDescriptor> {
    let mut by_month: HashMap<String, SnapshotDescriptor> = HashMap::new();
    for snap in snapshots {
        match by_month.get(snap.month_key()) {
            Some(existing) if existing.timestamp <= snap.timestamp => {}
            _ => {
                by_month.insert(snap.month_key().to_string(), snap);
            }
        }
    }

    let mut reduced: Vec<SnapshotDescriptor> = by_month.into_values().collect();
    reduced.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    reduced
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn snap(ts: &str) -> SnapshotDescriptor {
        SnapshotDescriptor {
            timestamp: ts.into(),
            original: "https://example.com/jobs".into(),
            status_code: "200".into(),
            mime_type: "text/html".into(),
            digest: format!("D{ts}"),
        }
    }

    const CDX_BODY: &str = r#"[
        ["timestamp","original","statuscode","mimetype","digest"],
        ["20240110120000","https://example.com/jobs","200","text/html","AAA"],
        ["20240215080000","https://example.com/jobs","200","text/html","BBB"]
    ]"#;

    #[tokio::test]
    async fn discovers_snapshots_from_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cdx"))
            .and(query_param("url", "example.com/jobs"))
            .and(query_param("output", "json"))
            .and(query_param("collapse", "digest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CDX_BODY))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(10).expect("fetcher");
        let snapshots = discover_snapshots(
            &fetcher,
            &format!("{}/cdx", server.uri()),
            "example.com/jobs",
            "20240101",
            "20241231",
        )
        .await;

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].timestamp, "20240110120000");
        assert_eq!(snapshots[0].digest, "AAA");
        assert_eq!(snapshots[1].snapshot_date(), Some("2024-02-15".into()));
    }

    #[tokio::test]
    async fn malformed_response_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cdx"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<not json>"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(10).expect("fetcher");
        let snapshots = discover_snapshots(
            &fetcher,
            &format!("{}/cdx", server.uri()),
            "example.com/jobs",
            "20240101",
            "20241231",
        )
        .await;
        assert!(snapshots.is_empty());
    }

    #[tokio::test]
    async fn header_only_response_is_zero_snapshots() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cdx"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[["timestamp","original","statuscode","mimetype","digest"]]"#,
            ))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(10).expect("fetcher");
        let snapshots = discover_snapshots(
            &fetcher,
            &format!("{}/cdx", server.uri()),
            "example.com/jobs",
            "20240101",
            "20241231",
        )
        .await;
        assert!(snapshots.is_empty());
    }

    #[test]
    fn query_url_repeats_filter_key() {
        let url = build_query_url(
            "https://web.archive.org/cdx/search/cdx",
            "example.com/jobs",
            "20230101",
            "20240101",
        )
        .expect("build url");

        let query = url.query().expect("query string");
        assert!(query.contains("filter=statuscode%3A200"));
        assert!(query.contains("filter=mimetype%3Atext%2Fhtml"));
        assert!(query.contains("from=20230101"));
        assert!(query.contains("to=20240101"));
    }

    #[test]
    fn monthly_reduction_keeps_earliest_per_month() {
        let input = vec![
            snap("20240215080000"),
            snap("20240110120000"),
            snap("20240201000000"),
            snap("20240120000000"),
        ];
        let reduced = reduce_monthly(input);

        assert_eq!(reduced.len(), 2);
        assert_eq!(reduced[0].timestamp, "20240110120000");
        assert_eq!(reduced[1].timestamp, "20240201000000");
    }

    #[test]
    fn monthly_reduction_is_input_order_independent() {
        let a = vec![snap("20240110120000"), snap("20240120000000")];
        let b = vec![snap("20240120000000"), snap("20240110120000")];
        assert_eq!(reduce_monthly(a), reduce_monthly(b));
    }

    #[test]
    fn monthly_reduction_of_empty_is_empty() {
        assert!(reduce_monthly(Vec::new()).is_empty());
    }
}
