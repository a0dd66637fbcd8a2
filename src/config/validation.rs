//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics and reports every
//! problem at once rather than stopping at the first.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::bootstrap::ProvisioningBatch;
use crate::config::schema::BootstrapConfig;
use crate::connector::ConnectionTarget;

/// Upper bound for `connect.deadline_secs`: one day.
pub const MAX_DEADLINE_SECS: u64 = 86_400;

/// A single semantic problem, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &BootstrapConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut names = HashSet::new();
    for (i, service) in config.services.iter().enumerate() {
        let field = format!("services[{i}]");
        if let Err(e) = ConnectionTarget::new(service.name.as_str(), &service.address) {
            errors.push(ValidationError::new(&field, e.to_string()));
        }
        if !names.insert(service.name.as_str()) {
            errors.push(ValidationError::new(
                &field,
                format!("duplicate service name '{}'", service.name),
            ));
        }
    }

    let connect = &config.connect;
    if connect.max_attempts == 0 {
        errors.push(ValidationError::new("connect.max_attempts", "must be at least 1"));
    }
    if connect.attempt_timeout_ms == 0 {
        errors.push(ValidationError::new("connect.attempt_timeout_ms", "must be greater than 0"));
    }
    if connect.deadline_secs > MAX_DEADLINE_SECS {
        errors.push(ValidationError::new(
            "connect.deadline_secs",
            format!("must not exceed {MAX_DEADLINE_SECS}"),
        ));
    }
    if connect.max_delay_ms < connect.delay_ms {
        errors.push(ValidationError::new(
            "connect.max_delay_ms",
            "must not be smaller than connect.delay_ms",
        ));
    }

    let database = &config.database;
    if database.name.trim().is_empty() {
        errors.push(ValidationError::new("database.name", "must not be empty"));
    }
    if database.url.trim().is_empty() {
        errors.push(ValidationError::new("database.url", "must not be empty"));
    }
    if database.max_connections == 0 {
        errors.push(ValidationError::new("database.max_connections", "must be at least 1"));
    }
    if let Err(e) = ProvisioningBatch::new(database.schemas.iter().cloned()) {
        errors.push(ValidationError::new("database.schemas", e.to_string()));
    }

    let observability = &config.observability;
    if !matches!(
        observability.log_level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", observability.log_level),
        ));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    let diagnostics = &config.diagnostics;
    if diagnostics.enabled && diagnostics.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "diagnostics.bind_address",
            format!("'{}' is not a socket address", diagnostics.bind_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
