//! The seam through which DDL reaches the shared resource.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::bootstrap::unit::ProvisioningUnit;
use crate::lifecycle::{CancelReason, Context};

/// Why a single unit could not be provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("cancelled before completion: {0}")]
    Cancelled(#[source] CancelReason),

    /// The statement failed; holds the driver's message.
    #[error("statement failed: {0}")]
    Database(String),

    #[error("worker terminated abnormally: {0}")]
    WorkerPanicked(String),
}

impl From<sqlx::Error> for ProvisionError {
    fn from(e: sqlx::Error) -> Self {
        ProvisionError::Database(e.to_string())
    }
}

/// Executes idempotent schema DDL.
///
/// Implementations must be safe for concurrent use from many workers; the
/// bootstrapper adds no locking of its own.
#[async_trait]
pub trait SchemaExecutor: Send + Sync + 'static {
    /// Create the schema if it does not exist yet.
    async fn create_schema(&self, ctx: &Context, unit: &ProvisioningUnit) -> Result<(), ProvisionError>;

    /// Drop the schema and everything in it, if it exists.
    async fn drop_schema(&self, ctx: &Context, unit: &ProvisioningUnit) -> Result<(), ProvisionError>;
}

#[async_trait]
impl<T: SchemaExecutor> SchemaExecutor for Arc<T> {
    async fn create_schema(&self, ctx: &Context, unit: &ProvisioningUnit) -> Result<(), ProvisionError> {
        (**self).create_schema(ctx, unit).await
    }

    async fn drop_schema(&self, ctx: &Context, unit: &ProvisioningUnit) -> Result<(), ProvisionError> {
        (**self).drop_schema(ctx, unit).await
    }
}

#[async_trait]
impl SchemaExecutor for PgPool {
    async fn create_schema(&self, ctx: &Context, unit: &ProvisioningUnit) -> Result<(), ProvisionError> {
        let statement = format!("CREATE SCHEMA IF NOT EXISTS {}", unit.quoted());
        execute(self, ctx, &statement).await
    }

    async fn drop_schema(&self, ctx: &Context, unit: &ProvisioningUnit) -> Result<(), ProvisionError> {
        let statement = format!("DROP SCHEMA IF EXISTS {} CASCADE", unit.quoted());
        execute(self, ctx, &statement).await
    }
}

/// Run one statement, abandoning it if `ctx` ends first.
async fn execute(pool: &PgPool, ctx: &Context, statement: &str) -> Result<(), ProvisionError> {
    tokio::select! {
        biased;
        reason = ctx.done() => Err(ProvisionError::Cancelled(reason)),
        result = sqlx::query(statement).execute(pool) => {
            result?;
            Ok(())
        }
    }
}
