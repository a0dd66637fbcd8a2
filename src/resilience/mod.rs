//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Failed connection attempt:
//!     → backoff.rs (fixed or exponential delay before the next attempt)
//!     → connector waits, racing the delay against cancellation
//! ```
//!
//! # Design Decisions
//! - Every wait is bounded by the caller's context
//! - Jitter only on exponential delays; fixed delays stay exact

pub mod backoff;
