use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::route::{RouteSpec, RouteTable};

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Settle delay after each history write: two 16 ms frames plus one.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(48);

/// Extra back steps a pop may issue before giving up on finding an entry
/// written by this engine.
pub const DEFAULT_MAX_GAP_RETRIES: usize = 16;

/// Error loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("No routes configured")]
    NoRoutes,
    #[error("Fallback activity has no route: {0}")]
    UnknownFallback(String),
}

/// History sync configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Activity name to URL pattern(s), in matching order
    pub routes: RouteTable,
    /// Activity entered when no route matches the initial path
    pub fallback_activity: String,
    /// Keep the path in the URL fragment (`/#/articles/1/`)
    pub use_hash: bool,
    /// Delay after each history write before the next one may run
    pub settle_delay: Duration,
    /// Bound on extra back steps issued while popping
    pub max_gap_retries: usize,
}

/// TOML representation of the `[sync]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlSyncConfig {
    pub settle_delay_ms: Option<u64>,
    pub max_gap_retries: Option<usize>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub fallback_activity: Option<String>,
    pub use_hash: Option<bool>,
    pub routes: Option<RouteTable>,
    pub sync: Option<TomlSyncConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routes: RouteTable::new(),
            fallback_activity: String::new(),
            use_hash: false,
            settle_delay: DEFAULT_SETTLE_DELAY,
            max_gap_retries: DEFAULT_MAX_GAP_RETRIES,
        }
    }
}

impl Config {
    pub fn new(fallback_activity: impl Into<String>) -> Self {
        Self {
            fallback_activity: fallback_activity.into(),
            ..Self::default()
        }
    }

    pub fn route(mut self, activity_name: impl Into<String>, spec: impl Into<RouteSpec>) -> Self {
        self.routes.insert(activity_name, spec);
        self
    }

    pub fn use_hash(mut self, use_hash: bool) -> Self {
        self.use_hash = use_hash;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn max_gap_retries(mut self, retries: usize) -> Self {
        self.max_gap_retries = retries;
        self
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML, merged over the defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Config::default();

        if let Some(routes) = toml_config.routes {
            config.routes = routes;
        }
        if let Some(fallback) = toml_config.fallback_activity {
            config.fallback_activity = fallback;
        }
        if let Some(use_hash) = toml_config.use_hash {
            config.use_hash = use_hash;
        }
        if let Some(sync) = toml_config.sync {
            if let Some(ms) = sync.settle_delay_ms {
                config.settle_delay = Duration::from_millis(ms);
            }
            if let Some(retries) = sync.max_gap_retries {
                config.max_gap_retries = retries;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that routes exist and the fallback activity is routable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routes.is_empty() {
            return Err(ConfigError::NoRoutes);
        }
        if self.routes.patterns(&self.fallback_activity).is_err() {
            return Err(ConfigError::UnknownFallback(self.fallback_activity.clone()));
        }
        Ok(())
    }
}
