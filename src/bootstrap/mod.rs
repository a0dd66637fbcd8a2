//! Schema provisioning subsystem.
//!
//! # Data Flow
//! ```text
//! Bootstrapper::provision(ctx, resource, batch)
//!     → ctx already done?           → Err(Cancelled), resource untouched
//!     → spawn one worker per unit
//!         worker: ctx done?         → outcome Cancelled
//!                 create_schema()   → outcome Ok / Database error (logged)
//!     → join every worker (barrier)
//!     → Ok(ProvisioningReport)      even when some units failed
//! ```
//!
//! # Design Decisions
//! - One unit's failure never cancels or fails its siblings
//! - No retries per unit; the caller decides whether a failed unit matters
//! - No ordering between units, only the join is ordered

pub mod executor;
pub mod outcome;
pub mod unit;

use std::sync::Arc;

use thiserror::Error;
use tokio::time::Instant;

use crate::lifecycle::{CancelReason, Context};
use crate::observability::metrics;

pub use executor::{ProvisionError, SchemaExecutor};
pub use outcome::{ProvisioningOutcome, ProvisioningReport};
pub use unit::{ProvisioningBatch, ProvisioningUnit, UnitError, STANDARD_SCHEMAS};

/// Environment variable that disables [`Bootstrapper::teardown`] when set to `0`.
pub const CLEANUP_ENV: &str = "CLEANUP_TEST_DB";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    /// The context had ended before any work started.
    #[error("provisioning not started: {0}")]
    Cancelled(#[source] CancelReason),

    #[error("failed to drop schema {unit}: {source}")]
    Teardown {
        unit: String,
        #[source]
        source: ProvisionError,
    },
}

/// Concurrently provisions a batch of units against a shared resource.
#[derive(Debug, Clone, Default)]
pub struct Bootstrapper;

impl Bootstrapper {
    pub fn new() -> Self {
        Self
    }

    /// Ensure every unit in `batch` exists.
    ///
    /// Returns once every worker has terminated. Per-unit failures are logged
    /// and recorded in the report, never returned as an error.
    pub async fn provision<R: SchemaExecutor>(
        &self,
        ctx: &Context,
        resource: Arc<R>,
        batch: &ProvisioningBatch,
    ) -> Result<ProvisioningReport, BootstrapError> {
        if let Some(reason) = ctx.err() {
            return Err(BootstrapError::Cancelled(reason));
        }

        tracing::info!(units = batch.len(), "Creating schemas");
        let started = Instant::now();

        let workers: Vec<_> = batch
            .iter()
            .cloned()
            .map(|unit| {
                let ctx = ctx.clone();
                let resource = Arc::clone(&resource);
                let handle = tokio::spawn({
                    let unit = unit.clone();
                    async move { provision_unit(&ctx, resource.as_ref(), &unit).await }
                });
                (unit, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(workers.len());
        for (unit, handle) in workers {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(unit = %unit, error = %e, "Schema worker did not finish");
                    ProvisioningOutcome {
                        unit,
                        error: Some(ProvisionError::WorkerPanicked(e.to_string())),
                        elapsed: started.elapsed(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let report = ProvisioningReport {
            outcomes,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Schema provisioning finished"
        );

        Ok(report)
    }

    /// Drop every unit in `batch`, one at a time, stopping at the first error.
    ///
    /// Meant for test databases. Returns `Ok(false)` without touching the
    /// resource when `CLEANUP_TEST_DB=0`.
    pub async fn teardown<R: SchemaExecutor>(
        &self,
        ctx: &Context,
        resource: &R,
        batch: &ProvisioningBatch,
    ) -> Result<bool, BootstrapError> {
        self.teardown_with(ctx, resource, batch, |key| std::env::var(key).ok())
            .await
    }

    /// [`Bootstrapper::teardown`], reading `CLEANUP_TEST_DB` through `env`.
    pub async fn teardown_with<R, F>(
        &self,
        ctx: &Context,
        resource: &R,
        batch: &ProvisioningBatch,
        env: F,
    ) -> Result<bool, BootstrapError>
    where
        R: SchemaExecutor,
        F: Fn(&str) -> Option<String>,
    {
        if env(CLEANUP_ENV).is_some_and(|v| v == "0") {
            tracing::info!("Schema teardown disabled by {}", CLEANUP_ENV);
            return Ok(false);
        }
        if let Some(reason) = ctx.err() {
            return Err(BootstrapError::Cancelled(reason));
        }

        for unit in batch.iter() {
            resource
                .drop_schema(ctx, unit)
                .await
                .map_err(|source| BootstrapError::Teardown {
                    unit: unit.to_string(),
                    source,
                })?;
            tracing::debug!(unit = %unit, "Dropped schema");
        }
        Ok(true)
    }
}

async fn provision_unit<R: SchemaExecutor>(
    ctx: &Context,
    resource: &R,
    unit: &ProvisioningUnit,
) -> ProvisioningOutcome {
    let started = Instant::now();

    let result = match ctx.err() {
        Some(reason) => Err(ProvisionError::Cancelled(reason)),
        None => resource.create_schema(ctx, unit).await,
    };

    match &result {
        Ok(()) => tracing::info!(unit = %unit, "Created schema"),
        Err(e) => tracing::error!(unit = %unit, error = %e, "Error creating schema"),
    }
    metrics::record_schema_provisioned(unit.name(), result.is_ok());

    ProvisioningOutcome {
        unit: unit.clone(),
        error: result.err(),
        elapsed: started.elapsed(),
    }
}
