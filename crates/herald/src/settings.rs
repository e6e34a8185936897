//! Layered runtime settings.
//!
//! Sources, lowest to highest precedence:
//! - Bundled defaults (include_str! from herald.toml)
//! - `~/.config/herald/herald.toml`
//! - `./herald.toml`
//! - `HERALD__<SECTION>__<KEY>` environment variables (a `.env` file is read first)

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use herald_error::{ConfigError, HeraldError, HeraldResult};
use herald_rate_limit::{CommandLimit, RateLimitConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_SETTINGS: &str = include_str!("../herald.toml");

/// Where configuration and statistics are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Use PostgreSQL instead of process memory
    pub enabled: bool,
    /// PostgreSQL connection URL, required when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Maximum pooled connections
    pub pool_size: u32,
    /// Upper bound on any single store call, in milliseconds
    pub store_timeout_ms: u64,
}

impl PersistenceSettings {
    /// Store call bound as a duration.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            database_url: None,
            pool_size: 8,
            store_timeout_ms: 5000,
        }
    }
}

/// Command rate limits.
///
/// ```toml
/// [rate_limits]
/// default_limit = 5
/// default_window_secs = 10
///
/// [rate_limits.commands.admin]
/// limit = 3
/// window_secs = 60
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Calls allowed for commands without their own entry
    pub default_limit: u32,
    /// Window for commands without their own entry, in seconds
    pub default_window_secs: u64,
    /// Per-command limits, layered over the built-in ones
    #[serde(default)]
    pub commands: HashMap<String, CommandLimit>,
    /// Redis URL for window logs shared between processes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_url: Option<String>,
}

impl RateLimitSettings {
    /// Limiter configuration described by these settings.
    pub fn to_config(&self) -> RateLimitConfig {
        self.commands.iter().fold(
            RateLimitConfig::default().with_default_limit(CommandLimit::new(
                self.default_limit,
                self.default_window_secs,
            )),
            |config, (name, limit)| config.with_command(name, *limit),
        )
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        let defaults = RateLimitConfig::default();
        Self {
            default_limit: *defaults.default_limit().limit(),
            default_window_secs: *defaults.default_limit().window_secs(),
            commands: defaults.commands().clone(),
            redis_url: None,
        }
    }
}

/// Statistics retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSettings {
    /// Entries kept in each join and leave history
    pub history_capacity: usize,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            history_capacity: herald_core::HISTORY_CAPACITY,
        }
    }
}

/// Every runtime setting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeraldSettings {
    /// Storage backend
    pub persistence: PersistenceSettings,
    /// Command rate limits
    pub rate_limits: RateLimitSettings,
    /// Statistics retention
    pub stats: StatsSettings,
}

fn bundled() -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Toml))
}

fn environment() -> Environment {
    Environment::with_prefix("HERALD")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl HeraldSettings {
    /// Load settings from every source.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file is malformed or a value has the
    /// wrong type.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use herald::HeraldSettings;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let settings = HeraldSettings::load()?;
    /// println!("persistence: {}", settings.persistence.enabled);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument]
    pub fn load() -> HeraldResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(e) => debug!(error = %e, "No .env loaded"),
        }
        debug!("Loading settings with precedence: env > current dir > home dir > bundled defaults");

        let mut builder = bundled();
        if let Some(home) = dirs::home_dir() {
            let home_settings = home.join(".config/herald/herald.toml");
            builder = builder.add_source(File::from(home_settings).required(false));
        }
        builder = builder
            .add_source(File::with_name("herald").required(false))
            .add_source(environment());

        Self::build(builder)
    }

    /// Load settings from one file layered over the bundled defaults.
    ///
    /// Environment variables still take precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> HeraldResult<Self> {
        debug!("Loading settings from file");
        let builder = bundled()
            .add_source(File::from(path.as_ref()).required(true))
            .add_source(environment());
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> HeraldResult<Self> {
        builder
            .build()
            .map_err(|e| {
                HeraldError::from(ConfigError::new(format!(
                    "Failed to build settings: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                HeraldError::from(ConfigError::new(format!(
                    "Failed to parse settings: {}",
                    e
                )))
            })
    }
}
