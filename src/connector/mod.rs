//! Connection establishment subsystem.
//!
//! # Data Flow
//! ```text
//! Connector::connect(ctx, target, policy)
//!     → ctx already done?            → Cancelled (no attempt)
//!     → attempt: dialer.dial(target)  raced against ctx.done()
//!         → Ok                        → handle returned, loop ends
//!         → Err, budget left          → sleep(policy delay) raced against ctx.done()
//!         → Err, budget spent         → Exhausted { attempts, last_error }
//! ```
//!
//! # Design Decisions
//! - The policy deadline becomes a child context, so the overall deadline and
//!   the attempt budget are independent limits
//! - Dropping an in-flight attempt releases whatever it had opened
//! - Fixed delay by default: targets are co-located and restart quickly

pub mod dialer;
pub mod error;
pub mod policy;
pub mod target;

use tokio::time::Instant;

use crate::lifecycle::{CancelReason, Context};
use crate::observability::metrics;

pub use dialer::{Dialer, PgDialer, TcpDialer};
pub use error::{ConnectError, DialError};
pub use policy::ConnectionAttemptPolicy;
pub use target::{ConnectionTarget, TargetError};

/// Retries a [`Dialer`] under a [`ConnectionAttemptPolicy`].
#[derive(Debug, Clone)]
pub struct Connector<D> {
    dialer: D,
}

impl<D: Dialer> Connector<D> {
    pub fn new(dialer: D) -> Self {
        Self { dialer }
    }

    pub fn dialer(&self) -> &D {
        &self.dialer
    }

    /// Open a connection to `target`, retrying per `policy` until success,
    /// budget exhaustion, or the end of `ctx`.
    pub async fn connect(
        &self,
        ctx: &Context,
        target: &ConnectionTarget,
        policy: &ConnectionAttemptPolicy,
    ) -> Result<D::Connection, ConnectError> {
        if let Some(reason) = ctx.err() {
            return Err(cancelled(target, 0, reason));
        }

        policy.validate()?;
        if !policy.is_consistent() {
            tracing::warn!(
                target_name = %target.name(),
                max_attempts = policy.max_attempts,
                worst_case_wait_ms = policy.worst_case_wait().as_millis() as u64,
                deadline_ms = policy.deadline.map(|d| d.as_millis() as u64),
                "Connection policy waits far longer than its deadline"
            );
        }

        let ctx = match policy.deadline {
            Some(deadline) => ctx.with_timeout(deadline),
            None => ctx.child(),
        };

        let started = Instant::now();
        let mut attempts = 0;

        loop {
            if let Some(reason) = ctx.err() {
                return Err(cancelled(target, attempts, reason));
            }

            attempts += 1;
            tracing::debug!(
                target_name = %target.name(),
                address = %target.authority(),
                attempt = attempts,
                max_attempts = policy.max_attempts,
                "Connecting"
            );

            let result = tokio::select! {
                biased;
                reason = ctx.done() => return Err(cancelled(target, attempts, reason)),
                result = self.dialer.dial(target) => result,
            };

            let error = match result {
                Ok(connection) => {
                    metrics::record_connect_attempt(target.name(), true);
                    metrics::record_connect_duration(target.name(), started.elapsed());
                    tracing::info!(
                        target_name = %target.name(),
                        address = %target.authority(),
                        attempts,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Connected"
                    );
                    return Ok(connection);
                }
                Err(e) => e,
            };

            metrics::record_connect_attempt(target.name(), false);

            if attempts >= policy.max_attempts {
                tracing::error!(
                    target_name = %target.name(),
                    address = %target.authority(),
                    attempts,
                    error = %error,
                    "Connection attempts exhausted"
                );
                return Err(ConnectError::Exhausted {
                    target: target.to_string(),
                    attempts,
                    last_error: error,
                });
            }

            let delay = policy.delay_after(attempts);
            tracing::warn!(
                target_name = %target.name(),
                attempt = attempts,
                error = %error,
                retry_in_ms = delay.as_millis() as u64,
                "Connection attempt failed"
            );

            tokio::select! {
                biased;
                reason = ctx.done() => return Err(cancelled(target, attempts, reason)),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

fn cancelled(target: &ConnectionTarget, attempts: u32, reason: CancelReason) -> ConnectError {
    tracing::warn!(
        target_name = %target.name(),
        attempts,
        reason = %reason,
        "Connection cancelled"
    );
    ConnectError::Cancelled {
        target: target.to_string(),
        attempts,
        reason,
    }
}
