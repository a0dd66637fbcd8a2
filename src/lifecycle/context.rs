//! Cancellable execution context.
//!
//! # Responsibilities
//! - Carry an explicit cancel signal and an optional deadline through startup work
//! - Let derived contexts end when their parent ends
//! - Expose the termination reason once the context is done
//!
//! # Design Decisions
//! - Cancellation is cooperative: callers race `done()` at their suspension points
//! - Deadlines use `tokio::time::Instant` so a paused test clock drives them
//! - Cloning is cheap; all clones observe the same state

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{self, Instant};

/// Why a context ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancelReason {
    /// `cancel()` was called on this context or an ancestor.
    #[error("context cancelled")]
    Cancelled,
    /// The context's deadline (or an ancestor's) passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug)]
struct Inner {
    tx: watch::Sender<Option<CancelReason>>,
    deadline: Option<Instant>,
    parent: Option<Context>,
}

/// A cancel signal plus an optional deadline, shared by every clone.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    /// A root context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::derive(None, None)
    }

    /// Derive a context that ends when `self` ends or when cancelled directly.
    pub fn child(&self) -> Self {
        Self::derive(Some(self.clone()), None)
    }

    /// Derive a context that additionally ends after `timeout`.
    ///
    /// A timeout too large to represent as an instant means no deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Derive a context that additionally ends at `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self::derive(Some(self.clone()), Some(deadline))
    }

    fn derive(parent: Option<Context>, deadline: Option<Instant>) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                tx,
                deadline,
                parent,
            }),
        }
    }

    /// Cancel this context and everything derived from it.
    ///
    /// The first reason wins; later calls are no-ops.
    pub fn cancel(&self) {
        self.inner.tx.send_if_modified(|state| {
            if state.is_some() {
                return false;
            }
            *state = Some(CancelReason::Cancelled);
            true
        });
    }

    /// The earliest deadline along the ancestor chain.
    pub fn deadline(&self) -> Option<Instant> {
        let parent = self.inner.parent.as_ref().and_then(Context::deadline);
        match (self.inner.deadline, parent) {
            (Some(own), Some(parent)) => Some(own.min(parent)),
            (own, parent) => own.or(parent),
        }
    }

    /// Returns the termination reason if the context has ended.
    pub fn err(&self) -> Option<CancelReason> {
        if let Some(reason) = *self.inner.tx.borrow() {
            return Some(reason);
        }
        if let Some(reason) = self.inner.parent.as_ref().and_then(Context::err) {
            return Some(reason);
        }
        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves with the termination reason once the context ends.
    pub async fn done(&self) -> CancelReason {
        if let Some(reason) = self.err() {
            return reason;
        }

        let mut rx = self.inner.tx.subscribe();
        let own = async move {
            loop {
                if let Some(reason) = *rx.borrow_and_update() {
                    return reason;
                }
                if rx.changed().await.is_err() {
                    return std::future::pending().await;
                }
            }
        };

        let deadline = async {
            match self.inner.deadline {
                Some(deadline) => {
                    time::sleep_until(deadline).await;
                    CancelReason::DeadlineExceeded
                }
                None => std::future::pending().await,
            }
        };

        let parent = async {
            match &self.inner.parent {
                Some(parent) => parent.done_boxed().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            reason = own => reason,
            reason = parent => reason,
            reason = deadline => reason,
        }
    }

    fn done_boxed(&self) -> Pin<Box<dyn Future<Output = CancelReason> + Send + '_>> {
        Box::pin(self.done())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
