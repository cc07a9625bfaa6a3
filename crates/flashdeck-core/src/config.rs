//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/flashdeck/config.toml)
//! 3. Environment variables (FLASHDECK_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::theme::{ColorTheme, ThemeMode};

/// Environment variable prefix
const ENV_PREFIX: &str = "FLASHDECK";

/// Default API server
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Keys accepted by [`Config::set_value`]
pub const CONFIG_KEYS: &[&str] = &[
    "api_url",
    "data_dir",
    "production",
    "stale_time_secs",
    "query_retry",
    "theme_mode",
    "color_theme",
    "log_file",
];

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the flashcard API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Directory for local state (session file, logs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Production mode: session credentials are only sent over https
    #[serde(default)]
    pub production: bool,

    /// How long cached lists stay fresh
    #[serde(default = "default_stale_time_secs")]
    pub stale_time_secs: u64,

    /// Retries for failed list fetches
    #[serde(default = "default_query_retry")]
    pub query_retry: u32,

    /// Light, dark or follow the terminal
    #[serde(default)]
    pub theme_mode: ThemeMode,

    /// Accent palette
    #[serde(default)]
    pub color_theme: ColorTheme,

    /// Log file for TUI mode (defaults to {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            data_dir: default_data_dir(),
            production: false,
            stale_time_secs: default_stale_time_secs(),
            query_retry: default_query_retry(),
            theme_mode: ThemeMode::default(),
            color_theme: ColorTheme::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (FLASHDECK_API_URL, FLASHDECK_DATA_DIR, FLASHDECK_PRODUCTION)
    /// 2. Config file (~/.config/flashdeck/config.toml or FLASHDECK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_PRODUCTION", ENV_PREFIX)) {
            self.production = val.eq_ignore_ascii_case("true") || val == "1";
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Set a single value by key, as used by `flashdeck config set`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    bail!("api_url must start with http:// or https://");
                }
                self.api_url = value.trim_end_matches('/').to_string();
            }
            "data_dir" => self.data_dir = value.into(),
            "production" => {
                self.production = value
                    .parse()
                    .context("Invalid value for production. Use 'true' or 'false'.")?;
            }
            "stale_time_secs" => {
                self.stale_time_secs = value
                    .parse()
                    .context("Invalid value for stale_time_secs. Use a number of seconds.")?;
            }
            "query_retry" => {
                self.query_retry = value
                    .parse()
                    .context("Invalid value for query_retry. Use a small integer.")?;
            }
            "theme_mode" => self.theme_mode = value.parse()?,
            "color_theme" => self.color_theme = value.parse()?,
            "log_file" => {
                self.log_file = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(value.into())
                };
            }
            _ => {
                bail!(
                    "Unknown configuration key: '{}'\nValid keys: {}",
                    key,
                    CONFIG_KEYS.join(", ")
                );
            }
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with FLASHDECK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flashdeck")
            .join("config.toml")
    }

    /// Path of the persisted session credentials
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    /// Path of the TUI debug log
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }

    /// Staleness window for cached queries
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_stale_time_secs() -> u64 {
    5 * 60
}

fn default_query_retry() -> u32 {
    1
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flashdeck")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "FLASHDECK_API_URL",
        "FLASHDECK_DATA_DIR",
        "FLASHDECK_PRODUCTION",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert!(!config.production);
        assert_eq!(config.stale_time(), Duration::from_secs(300));
        assert_eq!(config.query_retry, 1);
        assert!(config.data_dir.ends_with("flashdeck"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.session_path().ends_with("session.json"));
        assert!(config.log_path().ends_with("debug.log"));

        let config = Config {
            log_file: Some(PathBuf::from("/tmp/fd.log")),
            ..Config::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/tmp/fd.log"));
    }

    #[test]
    fn test_env_override_api_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("FLASHDECK_API_URL", "https://cards.example.com");
        config.apply_env_overrides();
        assert_eq!(config.api_url, "https://cards.example.com");

        // Empty string keeps the current value
        env::set_var("FLASHDECK_API_URL", "");
        config.apply_env_overrides();
        assert_eq!(config.api_url, "https://cards.example.com");
    }

    #[test]
    fn test_env_override_production() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("FLASHDECK_PRODUCTION", "true");
        config.apply_env_overrides();
        assert!(config.production);

        env::set_var("FLASHDECK_PRODUCTION", "0");
        config.apply_env_overrides();
        assert!(!config.production);
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::default();

        config.set_value("api_url", "https://api.example.com/").unwrap();
        assert_eq!(config.api_url, "https://api.example.com");

        config.set_value("stale_time_secs", "60").unwrap();
        assert_eq!(config.stale_time_secs, 60);

        config.set_value("color_theme", "violet").unwrap();
        assert_eq!(config.color_theme, ColorTheme::Violet);

        config.set_value("log_file", "none").unwrap();
        assert!(config.log_file.is_none());

        assert!(config.set_value("api_url", "ftp://nope").is_err());
        assert!(config.set_value("production", "maybe").is_err());
        assert!(config.set_value("unknown_key", "x").is_err());
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            api_url = "https://cards.example.com"
            data_dir = "/custom/data"
            production = true
            theme_mode = "dark"
            color_theme = "rose"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.api_url, "https://cards.example.com");
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert!(config.production);
        assert_eq!(config.theme_mode, ThemeMode::Dark);
        assert_eq!(config.color_theme, ColorTheme::Rose);
        assert_eq!(config.stale_time_secs, 300);
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = Config {
            api_url: "https://cards.example.com".to_string(),
            data_dir: temp_dir.path().join("data"),
            query_retry: 3,
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.api_url, config.api_url);
        assert_eq!(loaded.query_retry, 3);
        assert!(loaded.data_dir.exists());
    }
}
