//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files, and
//! every section has defaults so a minimal file only names what differs.

use serde::{Deserialize, Serialize};

use crate::bootstrap::STANDARD_SCHEMAS;

/// Root configuration for the startup sequence.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Backing services that must be reachable before startup continues.
    pub services: Vec<ServiceConfig>,

    /// Retry policy applied to every connection.
    pub connect: ConnectConfig,

    /// Shared database and the schemas it must contain.
    pub database: DatabaseConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Health and startup-status endpoints.
    pub diagnostics: DiagnosticsConfig,
}

/// A dependent service reached over TCP.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Service identifier for logging/metrics.
    pub name: String,

    /// `host:port`, or a bare port when the name is also the hostname.
    pub address: String,

    /// Whether a failed connection aborts startup.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    #[default]
    Fixed,
    Exponential,
}

/// Connection retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds (base delay for exponential).
    pub delay_ms: u64,

    /// Overall deadline per target in seconds; 0 disables it.
    pub deadline_secs: u64,

    /// Delay growth between attempts.
    pub backoff: BackoffKind,

    /// Cap for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Timeout for a single attempt in milliseconds.
    pub attempt_timeout_ms: u64,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            delay_ms: 2500,
            deadline_secs: 15,
            backoff: BackoffKind::Fixed,
            max_delay_ms: 10_000,
            attempt_timeout_ms: 5000,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Name used for logging and as the connection target identity.
    pub name: String,

    /// PostgreSQL connection URL (credentials, database, host, port).
    pub url: String,

    /// Pool size.
    pub max_connections: u32,

    /// Pool acquire timeout in seconds.
    pub acquire_timeout_secs: u64,

    /// Schemas to provision, in order.
    pub schemas: Vec<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "librate-db".to_string(),
            url: "postgres://postgres@localhost:5432/librate".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            schemas: STANDARD_SCHEMAS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    Stdout,
    #[default]
    Stderr,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    pub log_target: LogTarget,

    /// Include timestamps in log lines.
    pub timestamps: bool,

    /// Include source file and line in log lines.
    pub caller: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            log_target: LogTarget::Stderr,
            timestamps: true,
            caller: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Diagnostics router configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub enabled: bool,

    pub bind_address: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:6060".to_string(),
        }
    }
}
