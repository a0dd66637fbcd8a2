//! LibRate startup orchestration.
//!
//! Reaches dependent services with bounded retry, then provisions the shared
//! database's schemas concurrently, before any request traffic is admitted.

pub mod bootstrap;
pub mod config;
pub mod connector;
pub mod diagnostics;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use bootstrap::{Bootstrapper, ProvisioningBatch, ProvisioningReport};
pub use config::BootstrapConfig;
pub use connector::{ConnectionAttemptPolicy, ConnectionTarget, Connector};
pub use lifecycle::{Context, StartupSequence};
