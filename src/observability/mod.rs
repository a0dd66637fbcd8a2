//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! connector / bootstrap / startup produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout/stderr (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (target_name, unit, attempt) on every event
//! - Metrics are optional; recording without an exporter costs nothing

pub mod logging;
pub mod metrics;
