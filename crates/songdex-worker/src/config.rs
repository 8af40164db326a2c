use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};

use twyg::Output;

use crate::catalog::CatalogSource;

/// Configuration for songdex.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (SONGDEX_* prefix)
/// 3. Config file (~/.config/songdex/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog location: a JSON file path or an http(s) URL.
    ///
    /// Can be set via:
    /// - CLI: --catalog /path/to/songs.json
    /// - ENV: SONGDEX_CATALOG
    /// - Config: catalog = "..."
    /// - Default: KaraokeList_Auto.json
    #[serde(default = "default_catalog")]
    pub catalog: String,

    /// Maximum number of rows rendered for a result set.
    #[serde(default = "default_display_cap")]
    pub display_cap: usize,

    /// Quiet period after the last keystroke before a search is sent.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Prefix joined with a song code to open a song.
    #[serde(default = "default_link_base")]
    pub link_base: String,

    /// Retries for transient HTTP failures while fetching the catalog.
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_true")]
    pub coloured: bool,

    #[serde(default)]
    pub report_caller: bool,

    /// `stdout`, `stderr`, or a file path.
    #[serde(default = "default_log_output")]
    pub output: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            coloured: true,
            report_caller: false,
            output: default_log_output(),
        }
    }
}

impl LoggingConfig {
    /// The configured destination. Anything other than `stdout` or `stderr`
    /// is taken as a file path.
    pub fn output(&self) -> Output {
        self.output.trim().parse().unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            display_cap: default_display_cap(),
            debounce_ms: default_debounce_ms(),
            link_base: default_link_base(),
            fetch_retries: default_fetch_retries(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/songdex/config.toml
    /// Reads environment variables with SONGDEX_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("songdex");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Apply CLI overrides on top of the loaded configuration.
    #[must_use]
    pub fn with_overrides(mut self, catalog: Option<String>, display_cap: Option<usize>) -> Self {
        if let Some(catalog) = catalog {
            self.catalog = catalog;
        }
        if let Some(cap) = display_cap {
            self.display_cap = cap;
        }
        self
    }

    pub fn catalog_source(&self) -> CatalogSource {
        CatalogSource::parse(&self.catalog)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Link for a song code, e.g. `https://youtu.be/<code>`.
    pub fn song_link(&self, song_code: &str) -> String {
        format!("{}{}", self.link_base, song_code)
    }

    /// Look up a single setting by key, rendered as text.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "catalog" => self.catalog.clone(),
            "display_cap" => self.display_cap.to_string(),
            "debounce_ms" => self.debounce_ms.to_string(),
            "link_base" => self.link_base.clone(),
            "fetch_retries" => self.fetch_retries.to_string(),
            "logging.level" => self.logging.level.clone(),
            "logging.coloured" => self.logging.coloured.to_string(),
            "logging.report_caller" => self.logging.report_caller.to_string(),
            "logging.output" => self.logging.output.clone(),
            _ => anyhow::bail!(
                "Unknown config key: {}\n\nValid keys: {}",
                key,
                CONFIG_KEYS.join(", ")
            ),
        };
        Ok(value)
    }
}

/// Every key understood by [`Config::get`].
pub const CONFIG_KEYS: &[&str] = &[
    "catalog",
    "display_cap",
    "debounce_ms",
    "link_base",
    "fetch_retries",
    "logging.level",
    "logging.coloured",
    "logging.report_caller",
    "logging.output",
];

fn default_catalog() -> String {
    String::from("KaraokeList_Auto.json")
}

fn default_display_cap() -> usize {
    450
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_link_base() -> String {
    String::from("https://youtu.be/")
}

fn default_fetch_retries() -> usize {
    3
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_true() -> bool {
    true
}

fn default_log_output() -> String {
    String::from("stdout")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/songdex/config.toml
/// - macOS: ~/Library/Application Support/songdex/config.toml
/// - Windows: %APPDATA%\songdex\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("songdex")
        .join("config.toml")
}

/// Log file used while the search screen owns the terminal.
///
/// Returns e.g. ~/.cache/songdex/songdex.log on Linux.
pub fn log_file_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("songdex")
        .join("songdex.log")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Songdex Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (SONGDEX_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Song catalog: a JSON file path or an http(s) URL serving a JSON array of
# {"TitleAndArtist": ..., "SongCode": ..., "DateString": ...} objects.
#
# Can also be set via:
# - CLI: songdex --catalog /path/to/songs.json
# - Environment: SONGDEX_CATALOG=https://example.com/KaraokeList_Auto.json
catalog = "KaraokeList_Auto.json"

# Maximum number of rows shown for a search
display_cap = 450

# Milliseconds to wait after the last keystroke before searching
debounce_ms = 300

# Opening a song visits link_base followed by its song code
link_base = "https://youtu.be/"

# Retries for transient failures when downloading the catalog
fetch_retries = 3

[logging]
# One of: trace, debug, info, warn, error
level = "info"
coloured = true
report_caller = false
# stdout, stderr, or a file path. The search screen always logs to a file:
# this one if it is a path, otherwise songdex.log in the cache directory.
output = "stdout"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.catalog, "KaraokeList_Auto.json");
        assert_eq!(config.display_cap, 450);
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config: Config = toml::from_str(example_config()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.catalog, defaults.catalog);
        assert_eq!(config.display_cap, defaults.display_cap);
        assert_eq!(config.debounce_ms, defaults.debounce_ms);
        assert_eq!(config.link_base, defaults.link_base);
        assert_eq!(config.fetch_retries, defaults.fetch_retries);
        assert_eq!(config.logging.level, defaults.logging.level);
        assert_eq!(config.logging.coloured, defaults.logging.coloured);
        assert_eq!(config.logging.output, defaults.logging.output);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: Config = serde_json::from_str(r#"{"display_cap": 25}"#).unwrap();
        assert_eq!(config.display_cap, 25);
        assert_eq!(config.debounce_ms, 300);
        assert!(config.logging.coloured);
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_overrides(Some("https://example.com/songs.json".to_string()), Some(10));
        assert_eq!(config.display_cap, 10);
        assert_eq!(
            config.catalog_source(),
            CatalogSource::Url("https://example.com/songs.json".to_string())
        );

        let unchanged = Config::default().with_overrides(None, None);
        assert_eq!(unchanged.display_cap, 450);
    }

    #[test]
    fn test_song_link() {
        let config = Config::default();
        assert_eq!(config.song_link("dQw4w9WgXcQ"), "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_get_known_and_unknown_keys() {
        let config = Config::default();
        assert_eq!(config.get("debounce_ms").unwrap(), "300");
        assert_eq!(config.get("logging.level").unwrap(), "info");
        assert_eq!(config.get("logging.output").unwrap(), "stdout");
        let err = config.get("volume").unwrap_err();
        assert!(err.to_string().contains("Unknown config key: volume"));
    }

    #[test]
    fn test_logging_output() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.output(), Output::Stdout);

        logging.output = " stderr ".to_string();
        assert_eq!(logging.output(), Output::Stderr);

        logging.output = "/tmp/songdex/songdex.log".to_string();
        assert_eq!(logging.output(), Output::file("/tmp/songdex/songdex.log"));
    }

    #[test]
    fn test_log_file_path() {
        let path = log_file_path();
        assert!(path.ends_with("songdex/songdex.log"));
    }
}
