use serde::Deserialize;

/// Main configuration structure for Climbwatch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub mock: MockConfig,
}

/// Crawl controller configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First page of the ranked listing
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Hard ceiling on the number of pages extracted
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Selector matching one result card
    #[serde(rename = "card-selector", default = "default_card_selector")]
    pub card_selector: String,

    /// Selector for the name inside a result card
    #[serde(rename = "name-selector", default = "default_name_selector")]
    pub name_selector: String,

    /// Selector for the "next page" affordance
    #[serde(rename = "next-selector", default = "default_next_selector")]
    pub next_selector: String,

    /// Initial navigation and idle-wait deadline (milliseconds)
    #[serde(rename = "navigation-timeout", default = "default_navigation_timeout")]
    pub navigation_timeout: u64,

    /// How long to wait for the first result card on a page (milliseconds)
    #[serde(rename = "card-timeout", default = "default_step_timeout")]
    pub card_timeout: u64,

    /// Idle-wait deadline after clicking next (milliseconds)
    #[serde(rename = "idle-timeout", default = "default_step_timeout")]
    pub idle_timeout: u64,

    /// How strictly the next affordance is checked before clicking
    #[serde(rename = "next-check", default)]
    pub next_check: NextCheck,

    /// Extra attempts after a transient pagination failure
    #[serde(rename = "advance-retries", default)]
    pub advance_retries: u32,

    /// Base delay between pagination retries, doubled per attempt (milliseconds)
    #[serde(rename = "retry-backoff", default = "default_retry_backoff")]
    pub retry_backoff: u64,
}

/// Next-affordance availability check
///
/// `Visible` treats a visible control as usable. A control that is visible
/// but disabled then costs one wasted click and idle timeout before the loop
/// stops. `Enabled` also rejects controls marked `aria-disabled="true"` or
/// `disabled`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NextCheck {
    #[default]
    Visible,
    Enabled,
}

/// Randomized delay before each pagination click (milliseconds)
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    #[serde(rename = "min-delay", default = "default_min_delay")]
    pub min_delay: u64,

    #[serde(rename = "max-delay", default = "default_max_delay")]
    pub max_delay: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay: default_min_delay(),
            max_delay: default_max_delay(),
        }
    }
}

/// HTTP page driver configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    /// User-Agent header sent with every page load
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding one `YYYY-MM-DD.json` file per day
    #[serde(rename = "data-dir", default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Configured snapshot source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeSetting {
    /// Mock under CI, live otherwise
    #[default]
    Auto,
    Live,
    Mock,
}

/// Resolved snapshot source for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Live,
    Mock,
}

impl ModeSetting {
    /// Folds the environment's CI signal into a concrete mode
    pub fn resolve(self, ci: bool) -> SourceMode {
        match self {
            Self::Live => SourceMode::Live,
            Self::Mock => SourceMode::Mock,
            Self::Auto if ci => SourceMode::Mock,
            Self::Auto => SourceMode::Live,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub mode: ModeSetting,
}

/// Synthetic data configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MockConfig {
    /// Number of synthetic restaurants per snapshot
    #[serde(default = "default_mock_count")]
    pub count: u32,

    /// Past days to backfill when absent (mock mode only)
    #[serde(rename = "history-days", default = "default_history_days")]
    pub history_days: u32,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            count: default_mock_count(),
            history_days: default_history_days(),
        }
    }
}

fn default_max_pages() -> u32 {
    6
}

fn default_card_selector() -> String {
    ".SearchResult".to_string()
}

fn default_name_selector() -> String {
    "h3".to_string()
}

fn default_next_selector() -> String {
    r#"a[rel="next"]"#.to_string()
}

fn default_navigation_timeout() -> u64 {
    60_000
}

fn default_step_timeout() -> u64 {
    15_000
}

fn default_retry_backoff() -> u64 {
    2_000
}

fn default_min_delay() -> u64 {
    5_000
}

fn default_max_delay() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
        .to_string()
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_mock_count() -> u32 {
    20
}

fn default_history_days() -> u32 {
    7
}
