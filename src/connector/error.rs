//! Connector error taxonomy.

use std::time::Duration;

use thiserror::Error;

use crate::connector::policy::PolicyError;
use crate::lifecycle::CancelReason;

/// Why a single dial attempt failed.
#[derive(Debug, Error)]
pub enum DialError {
    #[error("failed to resolve {authority}: {source}")]
    Resolve {
        authority: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors returned by [`Connector::connect`](crate::connector::Connector::connect).
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The context ended before or during the attempt sequence.
    #[error("connection to {target} cancelled after {attempts} attempt(s): {reason}")]
    Cancelled {
        target: String,
        attempts: u32,
        #[source]
        reason: CancelReason,
    },

    /// Every attempt in the budget failed.
    #[error("failed to connect to {target} after {attempts} attempt(s): {last_error}")]
    Exhausted {
        target: String,
        attempts: u32,
        #[source]
        last_error: DialError,
    },

    #[error("invalid connection policy: {0}")]
    InvalidPolicy(#[from] PolicyError),
}

impl ConnectError {
    /// Attempts actually made before the error was returned.
    pub fn attempts(&self) -> u32 {
        match self {
            ConnectError::Cancelled { attempts, .. } | ConnectError::Exhausted { attempts, .. } => {
                *attempts
            }
            ConnectError::InvalidPolicy(_) => 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConnectError::Cancelled { .. })
    }
}
