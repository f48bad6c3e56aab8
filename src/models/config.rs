//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Remote endpoints
    #[serde(default)]
    pub sources: SourceConfig,

    /// Name resolution rules
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Store and cursor locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Known fixture for `run --self-test`
    #[serde(default)]
    pub self_test: SelfTestConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        for (key, value) in [
            ("sources.base_url", &self.sources.base_url),
            ("sources.listing_url", &self.sources.listing_url),
            ("sources.search_url", &self.sources.search_url),
        ] {
            Url::parse(value)
                .map_err(|e| AppError::validation(format!("{key} is not a valid URL: {e}")))?;
        }
        if self.resolver.address_type.trim().is_empty() {
            return Err(AppError::validation("resolver.address_type is empty"));
        }
        if self.resolver.similarity > 100 {
            return Err(AppError::validation("resolver.similarity must be <= 100"));
        }
        if self.paths.store_file.trim().is_empty() {
            return Err(AppError::validation("paths.store_file is empty"));
        }
        if self.paths.cursor_file.trim().is_empty() {
            return Err(AppError::validation("paths.cursor_file is empty"));
        }
        Ok(())
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay before each request in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: 0,
        }
    }
}

/// Remote endpoints for the bulletin listing and the search service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Site root used to resolve relative bulletin links
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Paginated bulletin listing (`?page=N` is appended)
    #[serde(default = "defaults::listing_url")]
    pub listing_url: String,

    /// Sanctions search form page
    #[serde(default = "defaults::search_url")]
    pub search_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            listing_url: defaults::listing_url(),
            search_url: defaults::search_url(),
        }
    }
}

/// Entity resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Identification type that marks a tracked address
    #[serde(default = "defaults::address_type")]
    pub address_type: String,

    /// Minimum name similarity submitted with each search (0-100)
    #[serde(default = "defaults::similarity")]
    pub similarity: u8,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            address_type: defaults::address_type(),
            similarity: defaults::similarity(),
        }
    }
}

/// File locations, relative to the storage directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::store_file")]
    pub store_file: String,

    #[serde(default = "defaults::cursor_file")]
    pub cursor_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store_file: defaults::store_file(),
            cursor_file: defaults::cursor_file(),
        }
    }
}

/// Fixture used by the resolver self-test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfTestConfig {
    #[serde(default = "defaults::self_test_name")]
    pub name: String,

    #[serde(default = "defaults::self_test_address")]
    pub expected_address: String,
}

impl Default for SelfTestConfig {
    fn default() -> Self {
        Self {
            name: defaults::self_test_name(),
            expected_address: defaults::self_test_address(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; sanctions-tracker/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    pub fn base_url() -> String {
        "https://ofac.treasury.gov".into()
    }
    pub fn listing_url() -> String {
        "https://ofac.treasury.gov/recent-actions/sanctions-list-updates".into()
    }
    pub fn search_url() -> String {
        "https://sanctionssearch.ofac.treas.gov/".into()
    }

    pub fn address_type() -> String {
        "Digital Currency Address - ETH".into()
    }
    pub fn similarity() -> u8 {
        100
    }

    pub fn store_file() -> String {
        "data.csv".into()
    }
    pub fn cursor_file() -> String {
        "log.txt".into()
    }

    pub fn self_test_name() -> String {
        "FUNNULL TECHNOLOGY INC".into()
    }
    pub fn self_test_address() -> String {
        "0xd5ED34b52AC4ab84d8FA8A231a3218bbF01Ed510".into()
    }
}
