use serde::Deserialize;

/// Realistic desktop user agent presented by every browsing session
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Public registry listing the known search portal mirrors
pub const DEFAULT_REGISTRY_URL: &str = "https://searx.space/";

/// Hard ceiling on concurrent content extractions
pub const MAX_POOL_WIDTH: usize = 10;

/// Main configuration structure for Searx-Harvest
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub search: SearchConfig,
    pub crawler: CrawlerConfig,
    pub server: ServerConfig,
}

/// Which rendering engine backs the browsing sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Headless Chromium driven over the DevTools protocol
    Chromium,

    /// Plain HTTP fetches, no script execution
    Http,
}

/// Browser engine and session identity configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    pub engine: EngineKind,

    /// Run Chromium without a visible window
    pub headless: bool,

    /// Explicit Chromium binary; auto-detected when unset
    pub executable: Option<String>,

    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Chromium,
            headless: true,
            executable: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport_width: 1920,
            viewport_height: 1080,
        }
    }
}

/// Mirror discovery and query defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Registry page listing the mirrors
    pub registry_url: String,

    /// Whether to consult the registry at all
    pub discover_mirrors: bool,

    /// Mirrors always tried before the discovered ones
    pub mirrors: Vec<String>,

    pub default_max_results: usize,
    pub default_max_content: usize,

    /// Navigation timeout (milliseconds)
    pub timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            discover_mirrors: true,
            mirrors: Vec::new(),
            default_max_results: crate::types::DEFAULT_MAX_RESULTS,
            default_max_content: crate::types::DEFAULT_MAX_CONTENT,
            timeout_ms: 30_000,
        }
    }
}

/// Content extraction behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Upper bound on concurrent extractions (at most 10)
    pub max_workers: usize,

    /// Attempts per link before a diagnostic is recorded
    pub max_attempts: u32,

    /// Fixed pause after navigation before looking at the page (milliseconds)
    pub settle_delay_ms: u64,

    /// How long to wait for network quiescence (milliseconds)
    pub quiescence_timeout_ms: u64,

    /// Lower bound of the randomized pause before a retry (milliseconds)
    pub retry_jitter_min_ms: u64,

    /// Upper bound of the randomized pause before a retry (milliseconds)
    pub retry_jitter_max_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_workers: MAX_POOL_WIDTH,
            max_attempts: 3,
            settle_delay_ms: 2_000,
            quiescence_timeout_ms: 10_000,
            retry_jitter_min_ms: 1_000,
            retry_jitter_max_ms: 3_000,
        }
    }
}

/// HTTP boundary configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Socket address the search endpoint listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:11235".to_string(),
        }
    }
}
