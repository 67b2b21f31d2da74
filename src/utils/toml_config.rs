//! TOML-based configuration for Signal
//!
//! This module provides declarative configuration for the server, the report
//! database, the LLM backend, the article source and the pipeline limits via a
//! TOML file (`signal.toml`). Every field has a default, so an empty file is a
//! valid configuration.
//!
//! Secrets are never stored in the file. Sections reference them by the
//! *name* of an environment variable (`api_key_env`), resolved at runtime.
//!
//! # Hot Reloading
//!
//! Configuration changes are automatically detected and applied at runtime.
//! Use `ConfigManager` for thread-safe access to the current configuration.
//! Jobs read the stage timeout when they are submitted, so a reload only
//! affects jobs started afterwards. Other settings are applied at startup.

use crate::pipeline::EVENTS_PER_JOB;
use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Root configuration structure loaded from signal.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub progress: ProgressConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Origins allowed to call the API from a browser
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            cors_origins: default_cors_origins(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "./data/signal.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    #[serde(rename = "openai")]
    OpenAI,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,

    #[serde(default = "default_model")]
    pub model: String,

    /// Ollama server URL or OpenAI-compatible API base
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Environment variable containing the API key (OpenAI only)
    #[serde(default)]
    pub api_key_env: Option<String>,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Ollama
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_llm_base_url() -> String {
    "http://localhost:11434".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_llm_base_url(),
            api_key_env: None,
        }
    }
}

// ============= Article Source Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Environment variable containing the SerpAPI key
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Number of news results requested, and the full-text fetch concurrency
    #[serde(default = "default_num_sources")]
    pub num_sources: usize,

    /// Timeout for each full-text article download
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_search_key_env() -> String {
    "SERPAPI_KEY".to_string()
}

fn default_search_endpoint() -> String {
    "https://serpapi.com/search.json".to_string()
}

fn default_num_sources() -> usize {
    10
}

fn default_fetch_timeout() -> u64 {
    20
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            endpoint: default_search_endpoint(),
            num_sources: default_num_sources(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

// ============= Pipeline Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Deadline applied to every agent or article source call
    #[serde(default = "default_stage_timeout")]
    pub stage_timeout_secs: u64,

    /// Upper bound on external calls in flight across all jobs
    #[serde(default = "default_max_concurrent_calls")]
    pub max_concurrent_calls: usize,
}

fn default_stage_timeout() -> u64 {
    180
}

fn default_max_concurrent_calls() -> usize {
    8
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_timeout_secs: default_stage_timeout(),
            max_concurrent_calls: default_max_concurrent_calls(),
        }
    }
}

impl PipelineConfig {
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }
}

// ============= Progress Channel Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Events kept per job for replay to late subscribers
    #[serde(default = "default_replay_capacity")]
    pub replay_capacity: usize,

    /// How long a finished job's events stay available
    #[serde(default = "default_retention")]
    pub retention_secs: u64,
}

fn default_replay_capacity() -> usize {
    64
}

fn default_retention() -> u64 {
    300
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            replay_capacity: default_replay_capacity(),
            retention_secs: default_retention(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl SignalConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SignalConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate limits that would make the pipeline unusable
    ///
    /// Secrets are checked separately by [`SignalConfig::missing_secrets`] so
    /// that `config --validate` can run on a machine without them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.num_sources == 0 {
            return Err(ConfigError::ValidationError(
                "search.num_sources must be at least 1".to_string(),
            ));
        }
        if self.pipeline.max_concurrent_calls == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.max_concurrent_calls must be at least 1".to_string(),
            ));
        }
        if self.pipeline.stage_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.stage_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.progress.replay_capacity < EVENTS_PER_JOB {
            return Err(ConfigError::ValidationError(format!(
                "progress.replay_capacity must be at least {} to replay a whole job",
                EVENTS_PER_JOB
            )));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Environment variables referenced by the config that are not set
    pub fn missing_secrets(&self) -> Vec<String> {
        let mut names = vec![self.search.api_key_env.clone()];
        if self.llm.provider == ProviderKind::OpenAI {
            names.push(
                self.llm
                    .api_key_env
                    .clone()
                    .unwrap_or_else(|| "OPENAI_API_KEY".to_string()),
            );
        }
        names
            .into_iter()
            .filter(|name| self.resolve_env(name).is_none())
            .collect()
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.is_empty())
    }

    /// Get the article source API key from the environment
    pub fn search_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.search.api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.search.api_key_env.clone()))
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct ConfigManager {
    config: Arc<ArcSwap<SignalConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl ConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Convert to absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = SignalConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config (useful for testing)
    /// This won't have file watching capabilities.
    pub fn from_config(config: SignalConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("signal.toml"),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<SignalConfig> {
        self.config.load_full()
    }

    /// Path the configuration was loaded from
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = SignalConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let file_name = config_path.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the config file's parent directory
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let mut last_reload: Option<std::time::Instant> = None;
            let debounce_duration = Duration::from_millis(500);

            while rx.recv().await.is_some() {
                if last_reload.is_some_and(|t| t.elapsed() < debounce_duration) {
                    continue;
                }

                // Wait a bit for file write to complete
                tokio::time::sleep(Duration::from_millis(100)).await;

                match SignalConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                        last_reload = Some(std::time::Instant::now());
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_config() -> String {
        r#"
[server]
host = "127.0.0.1"
port = 9000
log_level = "debug"
log_format = "json"

[database]
url = ":memory:"

[llm]
provider = "openai"
model = "gpt-4.1-mini"
base_url = "https://api.openai.com/v1"
api_key_env = "TEST_OPENAI_KEY"

[search]
api_key_env = "TEST_SERPAPI_KEY"
num_sources = 5

[pipeline]
stage_timeout_secs = 30
max_concurrent_calls = 2

[progress]
replay_capacity = 16
retention_secs = 60
"#
        .to_string()
    }

    #[test]
    fn test_parse_config() {
        let config = SignalConfig::from_toml(&create_test_config()).expect("Failed to parse config");

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.log_format, "json");
        assert_eq!(config.llm.provider, ProviderKind::OpenAI);
        assert_eq!(config.search.num_sources, 5);
        assert_eq!(config.pipeline.stage_timeout(), Duration::from_secs(30));
        assert_eq!(config.progress.replay_capacity, 16);
    }

    #[test]
    fn test_defaults() {
        let config = SignalConfig::from_toml("").unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.server.cors_origins.len(), 2);
        assert_eq!(config.database.url, "./data/signal.db");
        assert_eq!(config.llm.provider, ProviderKind::Ollama);
        assert_eq!(config.search.num_sources, 10);
        assert_eq!(config.search.api_key_env, "SERPAPI_KEY");
        assert_eq!(config.pipeline.max_concurrent_calls, 8);
        assert_eq!(config.progress.replay_capacity, 64);
    }

    #[test]
    fn test_validation_rejects_zero_sources() {
        let err = SignalConfig::from_toml("[search]\nnum_sources = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let err = SignalConfig::from_toml("[pipeline]\nmax_concurrent_calls = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_concurrent_calls"));
    }

    #[test]
    fn test_validation_rejects_replay_shorter_than_a_job() {
        let err = SignalConfig::from_toml("[progress]\nreplay_capacity = 4\n").unwrap_err();
        assert!(err.to_string().contains("replay_capacity"));
        assert!(SignalConfig::from_toml("[progress]\nreplay_capacity = 10\n").is_ok());
    }

    #[test]
    fn test_unknown_provider_is_parse_error() {
        let err = SignalConfig::from_toml("[llm]\nprovider = \"llamacpp\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_secrets_lists_unset_vars() {
        let mut config = SignalConfig::default();
        config.search.api_key_env = "SIGNAL_TEST_UNSET_SEARCH_KEY".to_string();
        config.llm.provider = ProviderKind::OpenAI;
        config.llm.api_key_env = Some("SIGNAL_TEST_UNSET_LLM_KEY".to_string());

        let missing = config.missing_secrets();
        assert_eq!(
            missing,
            vec![
                "SIGNAL_TEST_UNSET_SEARCH_KEY".to_string(),
                "SIGNAL_TEST_UNSET_LLM_KEY".to_string()
            ]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = SignalConfig::load("/nonexistent/signal.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_config_manager_reload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 8100").unwrap();

        let manager = ConfigManager::new(file.path()).unwrap();
        assert_eq!(manager.config().server.port, 8100);

        std::fs::write(file.path(), "[server]\nport = 8200\n").unwrap();
        manager.reload().unwrap();
        assert_eq!(manager.config().server.port, 8200);
    }

    #[test]
    fn test_config_manager_from_config() {
        let config = SignalConfig::from_toml(&create_test_config()).unwrap();

        let manager = ConfigManager::from_config(config.clone());
        let loaded = manager.config();

        assert_eq!(loaded.server.host, config.server.host);
        assert_eq!(loaded.server.port, config.server.port);
    }
}
