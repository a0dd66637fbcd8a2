//! Transport strategies used by the connector.
//!
//! A [`Dialer`] performs exactly one attempt. Negotiation that belongs to the
//! handshake (socket options, pool sizing, the verification query) happens
//! inside that attempt so the retry loop never repeats it separately.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::DatabaseConfig;
use crate::connector::error::DialError;
use crate::connector::target::ConnectionTarget;

/// One attempt at opening a usable connection to a target.
///
/// Implementations must not leave resources behind on failure, and must be
/// safe to drop mid-attempt (the connector drops the future on cancellation).
#[async_trait]
pub trait Dialer: Send + Sync {
    /// The handle handed to the caller on success.
    type Connection: Send;

    async fn dial(&self, target: &ConnectionTarget) -> Result<Self::Connection, DialError>;
}

/// Plain TCP dialer with a per-attempt timeout.
#[derive(Debug, Clone)]
pub struct TcpDialer {
    attempt_timeout: Duration,
}

impl TcpDialer {
    pub fn new(attempt_timeout: Duration) -> Self {
        Self { attempt_timeout }
    }
}

impl Default for TcpDialer {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    type Connection = TcpStream;

    async fn dial(&self, target: &ConnectionTarget) -> Result<TcpStream, DialError> {
        let addrs = target.resolve().await.map_err(|source| DialError::Resolve {
            authority: target.authority(),
            source,
        })?;

        let mut last_error = None;
        for addr in addrs {
            match timeout(self.attempt_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => {
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Ok(Err(e)) => {
                    tracing::debug!(address = %addr, error = %e, "TCP connect failed");
                    last_error = Some(DialError::Io(e));
                }
                Err(_) => {
                    tracing::debug!(address = %addr, "TCP connect timed out");
                    last_error = Some(DialError::Timeout(self.attempt_timeout));
                }
            }
        }

        // resolve() never yields an empty list
        Err(last_error.unwrap_or(DialError::Timeout(self.attempt_timeout)))
    }
}

/// Opens a verified PostgreSQL pool.
///
/// Credentials and database name come from the configured URL; host and port
/// come from the target so the connector's identity and the socket agree.
#[derive(Debug, Clone)]
pub struct PgDialer {
    url: String,
    max_connections: u32,
    acquire_timeout: Duration,
    attempt_timeout: Duration,
}

impl PgDialer {
    pub fn new(config: &DatabaseConfig, attempt_timeout: Duration) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            acquire_timeout: Duration::from_secs(config.acquire_timeout_secs),
            attempt_timeout,
        }
    }

    async fn open(&self, target: &ConnectionTarget) -> Result<PgPool, DialError> {
        let options = PgConnectOptions::from_str(&self.url)?
            .host(target.host())
            .port(target.port());

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect_with(options)
            .await?;

        if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
            pool.close().await;
            return Err(e.into());
        }

        Ok(pool)
    }
}

#[async_trait]
impl Dialer for PgDialer {
    type Connection = PgPool;

    async fn dial(&self, target: &ConnectionTarget) -> Result<PgPool, DialError> {
        match timeout(self.attempt_timeout, self.open(target)).await {
            Ok(result) => result,
            Err(_) => Err(DialError::Timeout(self.attempt_timeout)),
        }
    }
}
