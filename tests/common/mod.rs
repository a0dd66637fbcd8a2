//! Shared fakes for integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use librate_bootstrap::bootstrap::{ProvisionError, ProvisioningUnit, SchemaExecutor};
use librate_bootstrap::connector::{ConnectionTarget, DialError, Dialer};
use librate_bootstrap::lifecycle::Context;

/// Dialer that refuses the first `failures` attempts, recording when each
/// attempt happened.
#[allow(dead_code)]
pub struct ScriptedDialer<C> {
    failures: u32,
    connection: C,
    attempts: AtomicU32,
    attempt_times: Mutex<Vec<Instant>>,
}

#[allow(dead_code)]
impl<C: Clone + Send + Sync> ScriptedDialer<C> {
    pub fn new(failures: u32, connection: C) -> Self {
        Self {
            failures,
            connection,
            attempts: AtomicU32::new(0),
            attempt_times: Mutex::new(Vec::new()),
        }
    }

    pub fn always_failing(connection: C) -> Self {
        Self::new(u32::MAX, connection)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn attempt_times(&self) -> Vec<Instant> {
        self.attempt_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl<C: Clone + Send + Sync> Dialer for ScriptedDialer<C> {
    type Connection = C;

    async fn dial(&self, _target: &ConnectionTarget) -> Result<C, DialError> {
        self.attempt_times.lock().unwrap().push(Instant::now());
        let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.failures {
            return Err(DialError::Io(std::io::ErrorKind::ConnectionRefused.into()));
        }
        Ok(self.connection.clone())
    }
}

/// In-memory stand-in for the shared database.
///
/// Creation is idempotent, each call takes `latency`, and units listed in
/// `failing` always fail. Units in `failing_drops` cannot be dropped.
#[derive(Debug, Default)]
pub struct InMemorySchemas {
    latency: Duration,
    failing: HashSet<String>,
    failing_drops: HashSet<String>,
    schemas: Mutex<HashSet<String>>,
    calls: Mutex<HashMap<String, u32>>,
}

#[allow(dead_code)]
impl InMemorySchemas {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    pub fn failing(mut self, unit: &str) -> Self {
        self.failing.insert(unit.to_string());
        self
    }

    pub fn failing_drop(mut self, unit: &str) -> Self {
        self.failing_drops.insert(unit.to_string());
        self
    }

    pub fn exists(&self, unit: &str) -> bool {
        self.schemas.lock().unwrap().contains(unit)
    }

    pub fn count(&self) -> usize {
        self.schemas.lock().unwrap().len()
    }

    pub fn calls(&self, unit: &str) -> u32 {
        self.calls.lock().unwrap().get(unit).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl SchemaExecutor for InMemorySchemas {
    async fn create_schema(&self, ctx: &Context, unit: &ProvisioningUnit) -> Result<(), ProvisionError> {
        *self.calls.lock().unwrap().entry(unit.name().to_string()).or_default() += 1;

        tokio::select! {
            biased;
            reason = ctx.done() => return Err(ProvisionError::Cancelled(reason)),
            _ = tokio::time::sleep(self.latency) => {}
        }

        if self.failing.contains(unit.name()) {
            return Err(ProvisionError::Database(format!(
                "permission denied for database to create schema {unit}"
            )));
        }
        self.schemas.lock().unwrap().insert(unit.name().to_string());
        Ok(())
    }

    async fn drop_schema(&self, _ctx: &Context, unit: &ProvisioningUnit) -> Result<(), ProvisionError> {
        if self.failing_drops.contains(unit.name()) {
            return Err(ProvisionError::Database(format!(
                "cannot drop schema {unit} because other objects depend on it"
            )));
        }
        self.schemas.lock().unwrap().remove(unit.name());
        Ok(())
    }
}

#[allow(dead_code)]
pub fn db_target() -> ConnectionTarget {
    ConnectionTarget::new("librate-db", "localhost:5432").unwrap()
}
