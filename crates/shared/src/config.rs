//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Workflow configuration.
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Store configuration.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Leave workflow configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Days a pending request stays open before the expiry sweep
    /// auto-cancels it.
    #[serde(default = "default_pending_expiry_days")]
    pub pending_expiry_days: i64,
}

fn default_pending_expiry_days() -> i64 {
    7
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            pending_expiry_days: default_pending_expiry_days(),
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Maximum optimistic-commit attempts before a write surfaces a
    /// concurrency conflict.
    #[serde(default = "default_max_commit_retries")]
    pub max_commit_retries: u32,
}

fn default_max_commit_retries() -> u32 {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_commit_retries: default_max_commit_retries(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KADRO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
