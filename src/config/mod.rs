//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, apply LIBRATE_* overrides)
//!     → validation.rs (semantic checks)
//!     → BootstrapConfig (validated, immutable)
//!     → handed to the startup sequence
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackoffKind, BootstrapConfig, ConnectConfig, DatabaseConfig, DiagnosticsConfig, LogFormat,
    LogTarget, ObservabilityConfig, ServiceConfig,
};
pub use validation::ValidationError;
