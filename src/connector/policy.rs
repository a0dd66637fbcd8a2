//! Retry budget for a connection attempt sequence.

use std::time::Duration;

use thiserror::Error;

use crate::config::ConnectConfig;
use crate::resilience::backoff::Backoff;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

/// Attempt count, inter-attempt delay and overall deadline.
///
/// A policy whose worst-case wait overshoots its deadline is a caller
/// mistake; [`ConnectionAttemptPolicy::is_consistent`] reports it, the
/// connector only logs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionAttemptPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub deadline: Option<Duration>,
    pub backoff: Backoff,
}

impl Default for ConnectionAttemptPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            delay: Duration::from_millis(2500),
            deadline: Some(Duration::from_secs(15)),
            backoff: Backoff::Fixed,
        }
    }
}

impl ConnectionAttemptPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            deadline: None,
            backoff: Backoff::Fixed,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        Ok(())
    }

    /// Delay to wait after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt, self.delay)
    }

    /// Sum of the delays between the first and last attempt.
    pub fn worst_case_wait(&self) -> Duration {
        (1..self.max_attempts)
            .map(|attempt| self.backoff.nominal_delay(attempt, self.delay))
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// False when the waiting alone exceeds twice the overall deadline.
    pub fn is_consistent(&self) -> bool {
        match self.deadline {
            Some(deadline) => self.worst_case_wait() <= deadline.saturating_mul(2),
            None => true,
        }
    }
}

impl From<&ConnectConfig> for ConnectionAttemptPolicy {
    fn from(config: &ConnectConfig) -> Self {
        let backoff = match config.backoff {
            crate::config::BackoffKind::Fixed => Backoff::Fixed,
            crate::config::BackoffKind::Exponential => Backoff::Exponential {
                max_delay: Duration::from_millis(config.max_delay_ms),
            },
        };
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_millis(config.delay_ms),
            deadline: (config.deadline_secs > 0).then(|| Duration::from_secs(config.deadline_secs)),
            backoff,
        }
    }
}
