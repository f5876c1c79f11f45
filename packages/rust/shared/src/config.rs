//! Application configuration for nsrecords.
//!
//! User config lives at `~/.nsrecords/nsrecords.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NsRecordsError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "nsrecords.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".nsrecords";

/// Records Browser page crawls start from by default.
pub const DEFAULT_START_URL: &str = "https://system.netsuite.com/help/helpcenter/en_US/srbrowser/Browser2025_2/script/record/amortizationtemplate.html";

// ---------------------------------------------------------------------------
// Config structs (matching nsrecords.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Navigation timeout and settle/pacing delays.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Link discovery filters.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Debug artifact capture.
    #[serde(default)]
    pub debug: DebugSection,
}

/// How rendered HTML is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSourceKind {
    /// Plain HTTP GET; the HTML as served.
    #[default]
    Http,
    /// Headless Chrome; the HTML after scripts ran.
    Browser,
}

impl std::str::FromStr for PageSourceKind {
    type Err = NsRecordsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "browser" => Ok(Self::Browser),
            other => Err(NsRecordsError::config(format!(
                "unknown page source '{other}': expected 'http' or 'browser'"
            ))),
        }
    }
}

impl std::fmt::Display for PageSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Browser => f.write_str("browser"),
        }
    }
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Page whose navigation lists every record.
    #[serde(default = "default_start_url")]
    pub start_url: String,

    /// Where the JSON result is written.
    #[serde(default = "default_output")]
    pub output: String,

    /// Page source used when the CLI does not pick one.
    #[serde(default)]
    pub page_source: PageSourceKind,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            start_url: default_start_url(),
            output: default_output(),
            page_source: PageSourceKind::default(),
        }
    }
}

fn default_start_url() -> String {
    DEFAULT_START_URL.into()
}
fn default_output() -> String {
    "netsuite_records.json".into()
}

/// `[timing]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Upper bound on a single page load.
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Render-settle delay after loading the start page.
    #[serde(default = "default_start_settle")]
    pub start_settle_ms: u64,

    /// Render-settle delay after loading each record page.
    #[serde(default = "default_settle")]
    pub settle_ms: u64,

    /// Courtesy pause between record pages.
    #[serde(default = "default_pacing")]
    pub pacing_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: default_navigation_timeout(),
            start_settle_ms: default_start_settle(),
            settle_ms: default_settle(),
            pacing_ms: default_pacing(),
        }
    }
}

fn default_navigation_timeout() -> u64 {
    30
}
fn default_start_settle() -> u64 {
    2000
}
fn default_settle() -> u64 {
    1000
}
fn default_pacing() -> u64 {
    500
}

/// `[discovery]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Keep only links on the start URL's host.
    #[serde(default = "default_true")]
    pub same_host_only: bool,

    /// URL path globs; if non-empty a link must match one.
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// URL path globs; a matching link is dropped.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            same_host_only: true,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// `[debug]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugSection {
    /// Capture debug artifacts.
    #[serde(default)]
    pub enabled: bool,

    /// Directory the artifacts are written to.
    #[serde(default = "default_debug_dir")]
    pub dir: String,

    /// How many pages get a raw HTML snapshot.
    #[serde(default = "default_snapshot_limit")]
    pub snapshot_limit: usize,
}

impl Default for DebugSection {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_debug_dir(),
            snapshot_limit: default_snapshot_limit(),
        }
    }
}

fn default_debug_dir() -> String {
    "debug".into()
}
fn default_snapshot_limit() -> usize {
    3
}

// ---------------------------------------------------------------------------
// Runtime config (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl timing, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Bound on each navigation.
    pub navigation_timeout: Duration,
    /// Wait after the start page loads.
    pub start_settle: Duration,
    /// Wait after each record page loads.
    pub settle: Duration,
    /// Wait between record pages.
    pub pacing: Duration,
}

impl CrawlConfig {
    /// No waits at all, and a short timeout. Handy for fixture-backed runs.
    pub fn immediate() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(5),
            start_settle: Duration::ZERO,
            settle: Duration::ZERO,
            pacing: Duration::ZERO,
        }
    }
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        let t = &config.timing;
        Self {
            navigation_timeout: Duration::from_secs(t.navigation_timeout_secs),
            start_settle: Duration::from_millis(t.start_settle_ms),
            settle: Duration::from_millis(t.settle_ms),
            pacing: Duration::from_millis(t.pacing_ms),
        }
    }
}

/// Runtime link filter settings.
#[derive(Debug, Clone)]
pub struct LinkFilterConfig {
    /// Keep only links on the start URL's host.
    pub same_host_only: bool,
    /// URL path include globs.
    pub include_patterns: Vec<String>,
    /// URL path exclude globs.
    pub exclude_patterns: Vec<String>,
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for LinkFilterConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            same_host_only: config.discovery.same_host_only,
            include_patterns: config.discovery.include_patterns.clone(),
            exclude_patterns: config.discovery.exclude_patterns.clone(),
        }
    }
}

/// Debug artifact capture, passed explicitly to the crawler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugConfig {
    /// Nothing is written.
    Disabled,
    /// Snapshots and the link list are written under `dir`.
    Enabled {
        /// Output directory.
        dir: PathBuf,
        /// Pages that get a raw HTML snapshot.
        snapshot_limit: usize,
    },
}

impl From<&AppConfig> for DebugConfig {
    fn from(config: &AppConfig) -> Self {
        if config.debug.enabled {
            Self::Enabled {
                dir: PathBuf::from(&config.debug.dir),
                snapshot_limit: config.debug.snapshot_limit,
            }
        } else {
            Self::Disabled
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.nsrecords/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| NsRecordsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.nsrecords/nsrecords.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| NsRecordsError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        NsRecordsError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NsRecordsError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NsRecordsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NsRecordsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
