//! Application configuration for waybackjobs.
//!
//! User config lives at `~/.waybackjobs/waybackjobs.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WaybackJobsError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "waybackjobs.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".waybackjobs";

// ---------------------------------------------------------------------------
// Config structs (matching waybackjobs.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Archive endpoints and target page.
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output directory for exports.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Seconds to wait between consecutive archive requests.
    #[serde(default = "default_request_delay")]
    pub request_delay_secs: f64,

    /// How far back the default date range reaches.
    #[serde(default = "default_years_back")]
    pub years_back: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            request_delay_secs: default_request_delay(),
            years_back: default_years_back(),
        }
    }
}

fn default_output_dir() -> String {
    "wnba_jobs_data".into()
}
fn default_request_delay() -> f64 {
    2.0
}
fn default_years_back() -> u32 {
    3
}

/// `[archive]` section. Kept configurable so integration tests can point
/// the pipeline at a mock server instead of the live archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// CDX index API endpoint.
    #[serde(default = "default_cdx_api_url")]
    pub cdx_api_url: String,

    /// Base URL for snapshot fetches (`<base>/<timestamp>id_/<original>`).
    #[serde(default = "default_wayback_base")]
    pub wayback_base: String,

    /// The target page queried against the index (host + path, no scheme).
    #[serde(default = "default_target_url")]
    pub target_url: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            cdx_api_url: default_cdx_api_url(),
            wayback_base: default_wayback_base(),
            target_url: default_target_url(),
        }
    }
}

fn default_cdx_api_url() -> String {
    "https://web.archive.org/cdx/search/cdx".into()
}
fn default_wayback_base() -> String {
    "https://web.archive.org/web".into()
}
fn default_target_url() -> String {
    "www.teamworkonline.com/basketball-jobs/wnbateamjobs/wnba-team-jobs".into()
}

// ---------------------------------------------------------------------------
// Date-range defaults
// ---------------------------------------------------------------------------

/// Compute the default `(from, to)` date bounds as `YYYYMMDD` strings:
/// today minus `years_back * 365` days, through today (UTC).
pub fn default_date_range(years_back: u32) -> (String, String) {
    let now = chrono::Utc::now();
    let from = now - chrono::Duration::days(i64::from(years_back) * 365);
    (
        from.format("%Y%m%d").to_string(),
        now.format("%Y%m%d").to_string(),
    )
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.waybackjobs/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| WaybackJobsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.waybackjobs/waybackjobs.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WaybackJobsError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        WaybackJobsError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WaybackJobsError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WaybackJobsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WaybackJobsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
