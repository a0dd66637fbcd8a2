//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Context (context.rs):
//!     root context ← cancelled by signals.rs on SIGINT/SIGTERM
//!     → derived per connection (policy deadline) and per provisioning batch
//!
//! Startup (startup.rs):
//!     Connect services → Connect database → Provision schemas → Ready
//! ```
//!
//! # Design Decisions
//! - Ordered startup: dependencies first, readiness last
//! - One cancellation primitive shared by every component

pub mod context;
pub mod signals;
pub mod startup;

pub use context::{CancelReason, Context};
pub use startup::{Phase, Ready, StartupError, StartupSequence, StartupState};
