use serde::Deserialize;
use std::time::Duration;

/// Client configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the catalog backend (no trailing slash required)
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Number of movies requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout handed to the HTTP client
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long a cached page counts as fresh. Zero means every query change refetches.
    #[serde(default)]
    pub stale_time_secs: u64,

    /// Cached pages older than this are evicted
    #[serde(default = "default_gc_time_secs")]
    pub gc_time_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_gc_time_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
            stale_time_secs: 0,
            gc_time_secs: default_gc_time_secs(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("PAGE_SIZE must be greater than zero");
        }
        if self.backend_url.trim().is_empty() {
            anyhow::bail!("BACKEND_URL must not be empty");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_time_secs)
    }
}
