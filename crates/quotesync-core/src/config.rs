//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/quotesync/config.toml)
//! 3. Environment variables (QUOTESYNC_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::remote::DEFAULT_FETCH_LIMIT;

/// Environment variable prefix
const ENV_PREFIX: &str = "QUOTESYNC";

/// Default remote feed endpoint
pub const DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Default period between scheduled syncs
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 15;

/// What an import does with the existing collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportPolicy {
    /// Imported quotes become the whole collection
    #[default]
    Replace,
    /// Imported quotes with new texts are appended
    Append,
}

impl std::str::FromStr for ImportPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "replace" => Ok(ImportPolicy::Replace),
            "append" => Ok(ImportPolicy::Append),
            other => bail!("Unknown import policy '{}'. Use 'replace' or 'append'.", other),
        }
    }
}

impl std::fmt::Display for ImportPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportPolicy::Replace => write!(f, "replace"),
            ImportPolicy::Append => write!(f, "append"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the quote collection and preferences
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Remote feed endpoint (GET list, POST item)
    #[serde(default = "default_remote_url")]
    pub remote_url: String,

    /// Whether sync with the remote feed is enabled
    #[serde(default = "default_true")]
    pub sync_enabled: bool,

    /// Seconds between scheduled syncs
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,

    /// Maximum number of remote items used per fetch
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Re-push every local-only quote on each sync cycle
    #[serde(default = "default_true")]
    pub push_local_only: bool,

    /// Still push local-only quotes when the fetch failed
    #[serde(default)]
    pub push_on_fetch_failure: bool,

    /// Behavior of `import`
    #[serde(default)]
    pub import_policy: ImportPolicy,

    /// Log file path (logs go to stderr when unset)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            remote_url: default_remote_url(),
            sync_enabled: true,
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            request_timeout_secs: default_request_timeout(),
            push_local_only: true,
            push_on_fetch_failure: false,
            import_policy: ImportPolicy::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (QUOTESYNC_DATA_DIR, QUOTESYNC_REMOTE_URL, ...)
    /// 2. Config file (~/.config/quotesync/config.toml or QUOTESYNC_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(cli_path: Option<&PathBuf>) -> Result<Self> {
        match cli_path {
            Some(path) => Self::load_from_path(path),
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
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_REMOTE_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.remote_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_SYNC_ENABLED", ENV_PREFIX)) {
            self.sync_enabled = parse_bool(&val);
        }

        if let Ok(val) = std::env::var(format!("{}_SYNC_INTERVAL", ENV_PREFIX)) {
            if let Ok(secs) = val.parse::<u64>() {
                self.sync_interval_secs = secs;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_PUSH_LOCAL_ONLY", ENV_PREFIX)) {
            self.push_local_only = parse_bool(&val);
        }

        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
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
    /// Can be overridden with QUOTESYNC_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quotesync")
            .join("config.toml")
    }

    /// Path of the stored collection
    pub fn quotes_path(&self) -> PathBuf {
        self.data_dir.join("quotes.json")
    }

    /// Period between scheduled syncs
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }
}

fn parse_bool(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quotesync")
}

fn default_remote_url() -> String {
    DEFAULT_REMOTE_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_sync_interval() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

fn default_fetch_limit() -> usize {
    DEFAULT_FETCH_LIMIT
}

fn default_request_timeout() -> u64 {
    10
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
        "QUOTESYNC_DATA_DIR",
        "QUOTESYNC_REMOTE_URL",
        "QUOTESYNC_SYNC_ENABLED",
        "QUOTESYNC_SYNC_INTERVAL",
        "QUOTESYNC_PUSH_LOCAL_ONLY",
        "QUOTESYNC_LOG_FILE",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.sync_enabled);
        assert!(config.push_local_only);
        assert_eq!(config.remote_url, DEFAULT_REMOTE_URL);
        assert_eq!(config.sync_interval_secs, 15);
        assert_eq!(config.fetch_limit, 5);
        assert_eq!(config.import_policy, ImportPolicy::Replace);
        assert!(config.data_dir.ends_with("quotesync"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.quotes_path().ends_with("quotes.json"));
    }

    #[test]
    fn test_sync_interval_never_zero() {
        let config = Config {
            sync_interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.sync_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("QUOTESYNC_DATA_DIR", "/tmp/quotesync-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/quotesync-test"));
    }

    #[test]
    fn test_env_override_sync_flags() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("QUOTESYNC_SYNC_ENABLED", "false");
        env::set_var("QUOTESYNC_PUSH_LOCAL_ONLY", "0");
        config.apply_env_overrides();
        assert!(!config.sync_enabled);
        assert!(!config.push_local_only);

        env::set_var("QUOTESYNC_SYNC_ENABLED", "TRUE");
        env::set_var("QUOTESYNC_PUSH_LOCAL_ONLY", "1");
        config.apply_env_overrides();
        assert!(config.sync_enabled);
        assert!(config.push_local_only);
    }

    #[test]
    fn test_env_override_interval_and_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("QUOTESYNC_SYNC_INTERVAL", "60");
        env::set_var("QUOTESYNC_REMOTE_URL", "http://localhost:8080/quotes");
        config.apply_env_overrides();
        assert_eq!(config.sync_interval_secs, 60);
        assert_eq!(config.remote_url, "http://localhost:8080/quotes");

        // Garbage interval and empty URL are ignored
        env::set_var("QUOTESYNC_SYNC_INTERVAL", "soon");
        env::set_var("QUOTESYNC_REMOTE_URL", "");
        config.apply_env_overrides();
        assert_eq!(config.sync_interval_secs, 60);
        assert_eq!(config.remote_url, "http://localhost:8080/quotes");
    }

    #[test]
    fn test_env_override_log_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("QUOTESYNC_LOG_FILE", "/tmp/quotesync.log");
        config.apply_env_overrides();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/quotesync.log")));

        env::set_var("QUOTESYNC_LOG_FILE", "");
        config.apply_env_overrides();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/quotesync"),
            remote_url: "http://feed.example.com/posts".to_string(),
            sync_enabled: false,
            import_policy: ImportPolicy::Append,
            ..Config::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("remote_url"));
        assert!(toml_str.contains("import_policy = \"append\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.remote_url, config.remote_url);
        assert_eq!(parsed.sync_enabled, config.sync_enabled);
        assert_eq!(parsed.import_policy, ImportPolicy::Append);
    }

    #[test]
    fn test_load_from_str_fills_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            sync_interval_secs = 30
            push_local_only = false
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.sync_interval_secs, 30);
        assert!(!config.push_local_only);
        assert!(!config.push_on_fetch_failure);
        assert!(config.sync_enabled);
        assert_eq!(config.remote_url, DEFAULT_REMOTE_URL);
        assert_eq!(config.fetch_limit, 5);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("QUOTESYNC_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(config.sync_enabled);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            sync_interval_secs: 42,
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.sync_interval_secs, 42);
        assert_eq!(loaded.data_dir, temp_dir.path().join("data"));
    }

    #[test]
    fn test_import_policy_from_str() {
        assert_eq!("replace".parse::<ImportPolicy>().unwrap(), ImportPolicy::Replace);
        assert_eq!("Append".parse::<ImportPolicy>().unwrap(), ImportPolicy::Append);
        assert!("merge".parse::<ImportPolicy>().is_err());
    }
}
