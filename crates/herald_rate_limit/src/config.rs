//! Per-command limit configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Allowed calls per trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct CommandLimit {
    /// Calls allowed inside the window
    limit: u32,
    /// Window length in seconds
    window_secs: u64,
}

impl CommandLimit {
    /// `limit` calls per `window_secs` seconds.
    pub fn new(limit: u32, window_secs: u64) -> Self {
        Self { limit, window_secs }
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Limits by command category.
///
/// Commands without an entry use `default_limit`.
///
/// # Examples
///
/// ```
/// use herald_rate_limit::{CommandLimit, RateLimitConfig};
///
/// let config = RateLimitConfig::default();
/// assert_eq!(config.for_command("admin"), CommandLimit::new(3, 60));
/// assert_eq!(config.for_command("unknown"), CommandLimit::new(5, 10));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct RateLimitConfig {
    /// Limit for commands without their own entry
    #[serde(default = "default_limit")]
    default_limit: CommandLimit,

    /// Limits keyed by command category
    #[serde(default = "default_commands")]
    commands: HashMap<String, CommandLimit>,
}

fn default_limit() -> CommandLimit {
    CommandLimit::new(5, 10)
}

fn default_commands() -> HashMap<String, CommandLimit> {
    [
        ("welcome", CommandLimit::new(5, 60)),
        ("leave", CommandLimit::new(5, 60)),
        ("config", CommandLimit::new(5, 60)),
        ("help", CommandLimit::new(10, 60)),
        ("role", CommandLimit::new(10, 60)),
        ("admin", CommandLimit::new(3, 60)),
    ]
    .into_iter()
    .map(|(name, limit)| (name.to_string(), limit))
    .collect()
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            commands: default_commands(),
        }
    }
}

impl RateLimitConfig {
    /// Limit applied to `command`.
    pub fn for_command(&self, command: &str) -> CommandLimit {
        self.commands
            .get(command)
            .copied()
            .unwrap_or(self.default_limit)
    }

    /// Longest window of any configured limit.
    ///
    /// A log with no entry inside this window is empty for every command.
    pub fn longest_window(&self) -> Duration {
        self.commands
            .values()
            .map(CommandLimit::window)
            .fold(self.default_limit.window(), Duration::max)
    }

    /// Add or replace the limit of one command.
    pub fn with_command(mut self, command: impl Into<String>, limit: CommandLimit) -> Self {
        self.commands.insert(command.into(), limit);
        self
    }
}
