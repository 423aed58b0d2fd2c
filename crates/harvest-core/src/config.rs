//! Configuration management for listing-harvest.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Every value a stage needs (target URL,
//! driver location, header set, selectors, pacing) lives here and is handed
//! to the pipeline at construction time.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/listing-harvest/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Search results page to capture
    pub target: TargetConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Scroll-until-sentinel settings
    pub render: RenderConfig,
    /// Item page HTTP settings
    pub http: HttpConfig,
    /// Inter-request pacing
    pub pacing: PacingConfig,
    /// CSS selectors for the listing and item pages
    pub selectors: SelectorConfig,
    /// Artifact locations
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path. Unlike [`AppConfig::load`],
    /// a missing file is an error.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }
        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `HARVEST_TARGET_URL`: Override the results page URL
    /// - `HARVEST_OUTPUT_DIR`: Override the artifact directory
    /// - `HARVEST_HEADLESS`: Override browser headless mode (true/false)
    /// - `HARVEST_CHROME_PATH`: Override the Chromium executable
    /// - `HARVEST_MAX_SCROLL_ATTEMPTS`: Cap the scroll loop
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("HARVEST_TARGET_URL") {
            tracing::debug!("Override target.url from env: {}", url);
            self.target.url = url;
        }

        if let Some(dir) = lookup("HARVEST_OUTPUT_DIR") {
            tracing::debug!("Override output.dir from env: {}", dir);
            self.output.dir = PathBuf::from(dir);
        }

        if let Some(val) = lookup("HARVEST_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(path) = lookup("HARVEST_CHROME_PATH") {
            tracing::debug!("Override browser.chrome_executable from env: {}", path);
            self.browser.chrome_executable = Some(PathBuf::from(path));
        }

        if let Some(val) = lookup("HARVEST_MAX_SCROLL_ATTEMPTS") {
            if let Ok(attempts) = val.parse() {
                self.render.max_scroll_attempts = Some(attempts);
                tracing::debug!("Override render.max_scroll_attempts from env: {}", attempts);
            }
        }
    }

    /// Check values that would otherwise fail deep inside a stage.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.target.url.starts_with("http://") || self.target.url.starts_with("https://")) {
            return Err(invalid("target.url", "must be an http(s) URL"));
        }
        if self.browser.navigation_timeout_secs == 0 {
            return Err(invalid(
                "browser.navigation_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.render.scroll_step_px == 0 {
            return Err(invalid("render.scroll_step_px", "must be greater than zero"));
        }
        if self.http.timeout_secs == 0 {
            return Err(invalid("http.timeout_secs", "must be greater than zero"));
        }
        if self.http.max_retries == 0 {
            return Err(invalid("http.max_retries", "at least one attempt is required"));
        }
        if self.pacing.base_min_ms > self.pacing.base_max_ms {
            return Err(invalid("pacing.base_min_ms", "must not exceed base_max_ms"));
        }
        if self.pacing.extended_min_ms > self.pacing.extended_max_ms {
            return Err(invalid(
                "pacing.extended_min_ms",
                "must not exceed extended_max_ms",
            ));
        }
        if self.pacing.extended_every == 0 {
            return Err(invalid("pacing.extended_every", "must be greater than zero"));
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/listing-harvest/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "listing-harvest", "listing-harvest")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// The results page the pipeline starts from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Directory search URL, geo/category filters embedded as query parameters
    pub url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: "https://spb.zoon.ru/medical/?search_query_form=1\
                  &m%5B5200e522a0f302f066000055%5D=1\
                  &center%5B%5D=59.91878264665887&center%5B%5D=30.342586983263384&zoom=10"
                .to_string(),
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Chromium executable; auto-detected when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_executable: Option<PathBuf>,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_secs: 30,
        }
    }
}

/// Scroll-until-sentinel settings for the capture stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Pixels scrolled per iteration
    pub scroll_step_px: u32,
    /// Wait between sentinel checks in milliseconds
    pub poll_interval_ms: u64,
    /// Give up after this many scrolls; unset means keep scrolling forever
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scroll_attempts: Option<u32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scroll_step_px: 5000,
            poll_interval_ms: 2000,
            max_scroll_attempts: None,
        }
    }
}

/// Plain HTTP settings for item pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent string
    pub user_agent: String,
    /// Accept header
    pub accept: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Total attempts per item page before recording an empty record
    pub max_retries: u32,
    /// Base delay between attempts in milliseconds, multiplied by the attempt number
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/101.0.4951.41 Safari/537.36"
                .to_string(),
            accept: "*/*".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 2000,
        }
    }
}

/// Randomized delays between item requests.
///
/// Each range is half-open: `[min, max)`. An empty range (`min == max`)
/// yields exactly `min`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Lower bound of the per-request delay
    pub base_min_ms: u64,
    /// Upper bound of the per-request delay
    pub base_max_ms: u64,
    /// Lower bound of the periodic extended pause
    pub extended_min_ms: u64,
    /// Upper bound of the periodic extended pause
    pub extended_max_ms: u64,
    /// Take the extended pause after every this many requests
    pub extended_every: usize,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_min_ms: 2000,
            base_max_ms: 5000,
            extended_min_ms: 5000,
            extended_max_ms: 9000,
            extended_every: 10,
        }
    }
}

/// CSS selectors for the results page and item pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Appears only once the results list is fully expanded
    pub sentinel: String,
    /// One per listing on the results page
    pub listing_title: String,
    /// Anchor inside a listing title
    pub listing_link: String,
    /// Item name element
    pub name: String,
    /// Container of phone links
    pub phones_container: String,
    /// Phone link inside the container
    pub phone_link: String,
    /// Item address element
    pub address: String,
    /// Container of the website link
    pub site_container: String,
    /// Website link inside the container
    pub site_link: String,
    /// Container of social network links
    pub social_container: String,
    /// Social link inside the container
    pub social_link: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            sentinel: ".hasmore-text".to_string(),
            listing_title: "h2.minicard-item__title".to_string(),
            listing_link: "a".to_string(),
            name: r#"span[itemprop="name"]"#.to_string(),
            phones_container: "div.service-phones-list".to_string(),
            phone_link: "a.js-phone-number".to_string(),
            address: "address.iblock".to_string(),
            site_container: "div.service-website-value".to_string(),
            site_link: "a".to_string(),
            social_container: "div.service-description-social-list".to_string(),
            social_link: "a".to_string(),
        }
    }
}

/// Where each stage writes its artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding all artifacts
    pub dir: PathBuf,
    /// Captured results page markup
    pub capture_file: String,
    /// Ordinal to URL index
    pub url_index_file: String,
    /// Final item records
    pub result_file: String,
}

impl OutputConfig {
    /// Path of the captured markup artifact.
    #[must_use]
    pub fn capture_path(&self) -> PathBuf {
        self.dir.join(&self.capture_file)
    }

    /// Path of the URL index artifact.
    #[must_use]
    pub fn url_index_path(&self) -> PathBuf {
        self.dir.join(&self.url_index_file)
    }

    /// Path of the result artifact.
    #[must_use]
    pub fn result_path(&self) -> PathBuf {
        self.dir.join(&self.result_file)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            capture_file: "source-page.html".to_string(),
            url_index_file: "urls.json".to_string(),
            result_file: "result.json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.browser.headless);
        assert_eq!(config.render.scroll_step_px, 5000);
        assert_eq!(config.render.max_scroll_attempts, None);
        assert_eq!(config.pacing.extended_every, 10);
        assert_eq!(config.selectors.sentinel, ".hasmore-text");
        assert!(config.http.user_agent.contains("Mozilla/5.0"));
        assert!(!config.target.url.contains(' '));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[target]"));
        assert!(toml_str.contains("[pacing]"));
        assert!(toml_str.contains("[selectors]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.target.url, config.target.url);
        assert_eq!(parsed.selectors.name, config.selectors.name);
    }

    #[test]
    fn test_load_from_path() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.target.url = "https://example.com/search".to_string();
        config.render.max_scroll_attempts = Some(40);

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.target.url, "https://example.com/search");
        assert_eq!(loaded.render.max_scroll_attempts, Some(40));
    }

    #[test]
    fn test_load_from_missing_path() {
        let tmp = TempDir::new().expect("create temp dir");
        let err = AppConfig::load_from(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("HARVEST_TARGET_URL", "https://example.com/list"),
            ("HARVEST_OUTPUT_DIR", "/tmp/harvest"),
            ("HARVEST_HEADLESS", "false"),
            ("HARVEST_MAX_SCROLL_ATTEMPTS", "12"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.target.url, "https://example.com/list");
        assert_eq!(config.output.dir, PathBuf::from("/tmp/harvest"));
        assert!(!config.browser.headless);
        assert_eq!(config.render.max_scroll_attempts, Some(12));
        assert_eq!(config.browser.chrome_executable, None);
    }

    #[test]
    fn test_unparseable_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| (key == "HARVEST_HEADLESS").then(|| "maybe".to_string()));
        assert!(config.browser.headless);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[target]
url = "https://example.com/catalog"

[pacing]
base_min_ms = 0
base_max_ms = 0
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.target.url, "https://example.com/catalog");
        assert_eq!(config.pacing.base_max_ms, 0);
        // These should be defaults
        assert_eq!(config.pacing.extended_min_ms, 5000);
        assert_eq!(config.output.result_file, "result.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.target.url = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "target.url"
        ));

        let mut config = AppConfig::default();
        config.pacing.base_min_ms = 6000;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pacing.extended_every = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.http.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let mut config = AppConfig::default();
        config.http.timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "http.timeout_secs"
        ));

        let mut config = AppConfig::default();
        config.browser.navigation_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. })
                if field == "browser.navigation_timeout_secs"
        ));
    }

    #[test]
    fn test_output_paths() {
        let output = OutputConfig {
            dir: PathBuf::from("out"),
            ..OutputConfig::default()
        };
        assert_eq!(output.capture_path(), PathBuf::from("out/source-page.html"));
        assert_eq!(output.url_index_path(), PathBuf::from("out/urls.json"));
        assert_eq!(output.result_path(), PathBuf::from("out/result.json"));
    }
}
