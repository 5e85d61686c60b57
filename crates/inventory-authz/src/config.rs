//! Authorization configuration
//!
//! Loaded from environment variables with defaults that reproduce the
//! long-standing behavior: any one granted action authorizes a request,
//! users may read their own record, denials are logged, no role cache.

use inventory_rbac::{CombinePolicy, PolicyEvaluator};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Which authorization decisions are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionLogging {
    /// Log nothing beyond debug traces
    Off,

    /// Log denied decisions at warn level
    #[default]
    Denials,

    /// Also log granted decisions at info level
    All,
}

impl DecisionLogging {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionLogging::Off => "off",
            DecisionLogging::Denials => "denials",
            DecisionLogging::All => "all",
        }
    }

    /// Parse from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" => Some(DecisionLogging::Off),
            "denials" | "deny" => Some(DecisionLogging::Denials),
            "all" => Some(DecisionLogging::All),
            _ => None,
        }
    }

    /// Check if denials are logged.
    pub fn logs_denials(&self) -> bool {
        !matches!(self, DecisionLogging::Off)
    }

    /// Check if grants are logged.
    pub fn logs_grants(&self) -> bool {
        matches!(self, DecisionLogging::All)
    }
}

/// Role cache settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Wrap the role store in a read-through cache.
    pub enabled: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Default multi-field format
    #[default]
    Full,

    /// Single-line compact format
    Compact,
}

/// Log subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `inventory_authz=debug`
    pub filter: String,

    /// Output format
    pub format: LogFormat,

    /// Emit ANSI colors
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Full,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Install a `fmt` subscriber for the current thread.
    ///
    /// The subscriber stays active until the returned guard is dropped.
    pub fn install(&self) -> Result<DefaultGuard, ConfigError> {
        let filter = EnvFilter::try_new(&self.filter)
            .map_err(|e| ConfigError::invalid("AUTHZ_LOG", e.to_string()))?;
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(self.ansi);

        let guard = match self.format {
            LogFormat::Full => tracing::subscriber::set_default(builder.finish()),
            LogFormat::Compact => tracing::subscriber::set_default(builder.compact().finish()),
        };
        Ok(guard)
    }
}

/// Authorization engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthzConfig {
    /// How grants for several required actions combine
    pub combine: CombinePolicy,

    /// Which decisions are logged
    pub decision_logging: DecisionLogging,

    /// Whether users implicitly may read their own user record
    pub self_access: bool,

    /// Role cache settings
    pub cache: CacheConfig,

    /// Log subscriber settings
    pub log: LogConfig,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            combine: CombinePolicy::AnyOf,
            decision_logging: DecisionLogging::Denials,
            self_access: true,
            cache: CacheConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AuthzConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables, falling back to
    /// defaults for missing or invalid values.
    ///
    /// Environment variables:
    /// - `AUTHZ_COMBINE_POLICY`: `any_of` (default) or `all_of`
    /// - `AUTHZ_DECISION_LOGGING`: `off`, `denials` (default) or `all`
    /// - `AUTHZ_SELF_ACCESS`: Implicit self-read grants (default: true)
    /// - `AUTHZ_ROLE_CACHE`: Read-through role cache (default: false)
    /// - `AUTHZ_LOG`: Log filter directive (default: info)
    /// - `AUTHZ_LOG_FORMAT`: `full` (default) or `compact`
    /// - `AUTHZ_LOG_ANSI`: Colored log output (default: true)
    pub fn from_env() -> Self {
        let default = Self::new();
        let var = |key: &str| std::env::var(key).ok();

        Self {
            combine: var("AUTHZ_COMBINE_POLICY")
                .and_then(|s| CombinePolicy::parse(&s))
                .unwrap_or(default.combine),
            decision_logging: var("AUTHZ_DECISION_LOGGING")
                .and_then(|s| DecisionLogging::parse(&s))
                .unwrap_or(default.decision_logging),
            self_access: var("AUTHZ_SELF_ACCESS")
                .and_then(|s| parse_bool(&s))
                .unwrap_or(default.self_access),
            cache: CacheConfig {
                enabled: var("AUTHZ_ROLE_CACHE")
                    .and_then(|s| parse_bool(&s))
                    .unwrap_or(default.cache.enabled),
            },
            log: LogConfig {
                filter: var("AUTHZ_LOG").unwrap_or(default.log.filter),
                format: var("AUTHZ_LOG_FORMAT")
                    .and_then(|s| parse_format(&s))
                    .unwrap_or(default.log.format),
                ansi: var("AUTHZ_LOG_ANSI")
                    .and_then(|s| parse_bool(&s))
                    .unwrap_or(default.log.ansi),
            },
        }
    }

    /// Load configuration from environment variables, rejecting invalid
    /// values.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, rejecting invalid
    /// values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(value) = lookup("AUTHZ_COMBINE_POLICY") {
            config.combine = CombinePolicy::parse(&value).ok_or_else(|| {
                ConfigError::invalid("AUTHZ_COMBINE_POLICY", format!("unknown policy '{}'", value))
            })?;
        }
        if let Some(value) = lookup("AUTHZ_DECISION_LOGGING") {
            config.decision_logging = DecisionLogging::parse(&value).ok_or_else(|| {
                ConfigError::invalid("AUTHZ_DECISION_LOGGING", format!("unknown mode '{}'", value))
            })?;
        }
        if let Some(value) = lookup("AUTHZ_SELF_ACCESS") {
            config.self_access = require_bool("AUTHZ_SELF_ACCESS", &value)?;
        }
        if let Some(value) = lookup("AUTHZ_ROLE_CACHE") {
            config.cache.enabled = require_bool("AUTHZ_ROLE_CACHE", &value)?;
        }
        if let Some(value) = lookup("AUTHZ_LOG") {
            EnvFilter::try_new(&value)
                .map_err(|e| ConfigError::invalid("AUTHZ_LOG", e.to_string()))?;
            config.log.filter = value;
        }
        if let Some(value) = lookup("AUTHZ_LOG_FORMAT") {
            config.log.format = parse_format(&value).ok_or_else(|| {
                ConfigError::invalid("AUTHZ_LOG_FORMAT", format!("unknown format '{}'", value))
            })?;
        }
        if let Some(value) = lookup("AUTHZ_LOG_ANSI") {
            config.log.ansi = require_bool("AUTHZ_LOG_ANSI", &value)?;
        }

        Ok(config)
    }

    /// Build the policy evaluator this configuration describes.
    pub fn evaluator(&self) -> PolicyEvaluator {
        PolicyEvaluator::new(self.combine).with_self_access(self.self_access)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn require_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value)
        .ok_or_else(|| ConfigError::invalid(key, format!("expected a boolean, got '{}'", value)))
}

fn parse_format(s: &str) -> Option<LogFormat> {
    match s.trim().to_lowercase().as_str() {
        "full" => Some(LogFormat::Full),
        "compact" => Some(LogFormat::Compact),
        _ => None,
    }
}
