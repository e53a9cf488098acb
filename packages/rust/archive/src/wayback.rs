//! Archive URL construction and unwrapping.

use std::sync::LazyLock;

use regex::Regex;

/// Matches the archive wrapper: `.../web/<digits>[id_]/<realUrl>`.
static WRAPPER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/web/\d+(?:id_)?/(https?://.+)").expect("wrapper regex"));

/// Build the fetch URL for one snapshot: `<base>/<timestamp>id_/<original>`.
///
/// The `id_` suffix asks the archive for the raw captured bytes without
/// its replay toolbar injected into the markup.
pub fn snapshot_url(base: &str, timestamp: &str, original: &str) -> String {
    format!("{base}/{timestamp}id_/{original}")
}

/// Strip the archive wrapper from a URL, returning the real-world URL.
/// URLs without the wrapper pattern pass through unchanged (idempotent).
pub fn unwrap_archive_url(url: &str) -> String {
    match WRAPPER_RE.captures(url) {
        Some(caps) => caps[1].to_string(),
        None => url.to_string(),
    }
}
