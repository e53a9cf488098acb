//! Resilient HTTP fetcher with bounded retries and exponential backoff.
//!
//! All terminal failures here are non-fatal to the pipeline: the caller
//! treats a failed snapshot as "zero job records contributed".

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, warn};

use waybackjobs_shared::{Result, WaybackJobsError};

/// User-Agent string for archive requests; a descriptive UA is required
/// by the upstream service's acceptable-use policy.
const USER_AGENT: &str = concat!(
    "waybackjobs/",
    env!("CARGO_PKG_VERSION"),
    " (historical job posting research)"
);

/// Total attempts per URL, all statuses included.
const DEFAULT_RETRIES: u32 = 3;

/// HTTP client wrapper applying the retry/backoff policy:
/// - 429 → wait `2^(attempt+2)` seconds, retry up to the ceiling
/// - any other error (HTTP or transport) → wait `2^(attempt+1)` seconds
///   while attempts remain, then fail
/// - success → decode the body as UTF-8 with replacement, return immediately
pub struct Fetcher {
    client: Client,
    retries: u32,
    backoff_unit: Duration,
}

impl Fetcher {
    /// Create a fetcher with the given per-request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                WaybackJobsError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            retries: DEFAULT_RETRIES,
            backoff_unit: Duration::from_secs(1),
        })
    }

    /// Shrink the backoff unit so retry tests run in milliseconds.
    #[cfg(test)]
    fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Fetch a URL and return the response body as text.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let mut last_err = WaybackJobsError::Network(format!("{url}: no attempts made"));

        for attempt in 0..self.retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let bytes = response.bytes().await.map_err(|e| {
                            WaybackJobsError::Network(format!("{url}: body read failed: {e}"))
                        })?;
                        debug!(%url, len = bytes.len(), "fetched");
                        return Ok(String::from_utf8_lossy(&bytes).into_owned());
                    }

                    if status.as_u16() == 429 {
                        let wait = self.backoff_unit * (1 << (attempt + 2));
                        warn!(%url, wait_secs = wait.as_secs_f64(), "rate limited (429), backing off");
                        tokio::time::sleep(wait).await;
                        last_err =
                            WaybackJobsError::Network(format!("{url}: HTTP 429 Too Many Requests"));
                        continue;
                    }

                    last_err = WaybackJobsError::Network(format!("{url}: HTTP {status}"));
                    if attempt + 1 < self.retries {
                        let wait = self.backoff_unit * (1 << (attempt + 1));
                        warn!(%url, %status, wait_secs = wait.as_secs_f64(), "fetch failed, retrying");
                        tokio::time::sleep(wait).await;
                    }
                }
                Err(e) => {
                    last_err = WaybackJobsError::Network(format!("{url}: {e}"));
                    if attempt + 1 < self.retries {
                        let wait = self.backoff_unit * (1 << (attempt + 1));
                        warn!(%url, error = %e, wait_secs = wait.as_secs_f64(), "network error, retrying");
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        error!(%url, error = %last_err, "giving up after {} attempts", self.retries);
        Err(last_err)
    }
}
