use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Site Cloner
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub limits: LimitsConfig,
    pub timeouts: TimeoutsConfig,
    pub concurrency: ConcurrencyConfig,
    pub http: HttpConfig,
    pub browser: BrowserConfig,
    pub credits: CreditsConfig,
    pub jobs: JobsConfig,
}

/// Output layout configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory under which each job gets `<subdomain>/`
    pub root: PathBuf,

    /// Site-absolute prefix used for local references before finalization
    #[serde(rename = "public-prefix")]
    pub public_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./public/cloned-sites"),
            public_prefix: "/cloned-sites".to_string(),
        }
    }
}

/// Caps that bound the crawl surface of a single job
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    #[serde(rename = "max-subpages")]
    pub max_subpages: usize,

    #[serde(rename = "max-stylesheets")]
    pub max_stylesheets: usize,

    #[serde(rename = "max-scripts")]
    pub max_scripts: usize,

    #[serde(rename = "max-images")]
    pub max_images: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_subpages: 20,
            max_stylesheets: 10,
            max_scripts: 5,
            max_images: 10,
        }
    }
}

/// Per-operation timeouts, in seconds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    #[serde(rename = "home-page-secs")]
    pub home_page_secs: u64,

    #[serde(rename = "subpage-secs")]
    pub subpage_secs: u64,

    #[serde(rename = "asset-secs")]
    pub asset_secs: u64,
}

impl TimeoutsConfig {
    pub fn home_page(&self) -> Duration {
        Duration::from_secs(self.home_page_secs)
    }

    pub fn subpage(&self) -> Duration {
        Duration::from_secs(self.subpage_secs)
    }

    pub fn asset(&self) -> Duration {
        Duration::from_secs(self.asset_secs)
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            home_page_secs: 60,
            subpage_secs: 30,
            asset_secs: 10,
        }
    }
}

/// Worker pool sizes within a single job
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Maximum number of asset downloads in flight
    #[serde(rename = "asset-downloads")]
    pub asset_downloads: usize,

    /// Maximum number of subpages rendered at once on the shared browser
    #[serde(rename = "subpage-renders")]
    pub subpage_renders: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            asset_downloads: 4,
            subpage_renders: 2,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "Mozilla/5.0 (compatible; site-cloner/{})",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Render with a headless browser; when false pages are fetched over HTTP
    pub enabled: bool,

    /// Explicit Chrome/Chromium executable
    #[serde(rename = "chrome-path")]
    pub chrome_path: Option<PathBuf>,

    #[serde(rename = "no-sandbox")]
    pub no_sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chrome_path: None,
            no_sandbox: true,
        }
    }
}

/// Credit removal policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CreditsConfig {
    pub enabled: bool,

    /// Elements whose text is at least this many characters are never removed
    #[serde(rename = "max-text-length")]
    pub max_text_length: usize,

    /// Lower-case phrases that mark an element as attribution
    pub phrases: Vec<String>,

    /// CSS selectors for attribution containers
    pub selectors: Vec<String>,
}

const DEFAULT_CREDIT_PHRASES: &[&str] = &[
    "made by",
    "powered by",
    "designed by",
    "developed by",
    "created by",
    "website by",
    "built by",
    "design by",
    "realizzato da",
    "creato da",
    "sviluppato da",
    "progettato da",
    "sito realizzato da",
    "sito web di",
    "sito creato da",
    "design di",
];

const DEFAULT_CREDIT_SELECTORS: &[&str] = &[
    ".credits",
    ".credit",
    "#credits",
    "#credit",
    ".copyright",
    "#copyright",
    "[class*=\"credit\"]",
    "[id*=\"credit\"]",
    "[class*=\"copyright\"]",
    "[id*=\"copyright\"]",
    "[class*=\"author\"]",
    "[class*=\"designer\"]",
    "[class*=\"developer\"]",
    "[id*=\"designer\"]",
    "[id*=\"developer\"]",
];

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_text_length: 200,
            phrases: DEFAULT_CREDIT_PHRASES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            selectors: DEFAULT_CREDIT_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Job store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Terminal jobs older than this are evicted from the store
    #[serde(rename = "retention-secs")]
    pub retention_secs: u64,
}

impl JobsConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            retention_secs: 24 * 60 * 60,
        }
    }
}
