mod settings;

pub use settings::{
    Config, ConfigError, TomlConfig, TomlSyncConfig, DEFAULT_MAX_GAP_RETRIES,
    DEFAULT_SETTLE_DELAY, EXAMPLE_CONFIG,
};
