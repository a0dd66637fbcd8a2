//! Per-unit and per-batch provisioning results.

use std::time::Duration;

use serde::Serialize;

use crate::bootstrap::executor::ProvisionError;
use crate::bootstrap::unit::ProvisioningUnit;

/// Terminal result of one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningOutcome {
    pub unit: ProvisioningUnit,
    pub error: Option<ProvisionError>,
    pub elapsed: Duration,
}

impl ProvisioningOutcome {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Every outcome of a batch, in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisioningReport {
    pub outcomes: Vec<ProvisioningOutcome>,
    pub elapsed: Duration,
}

impl ProvisioningReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &ProvisioningOutcome> {
        self.outcomes.iter().filter(|o| o.success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ProvisioningOutcome> {
        self.outcomes.iter().filter(|o| !o.success())
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(ProvisioningOutcome::success)
    }

    pub fn outcome(&self, unit: &str) -> Option<&ProvisioningOutcome> {
        self.outcomes.iter().find(|o| o.unit.name() == unit)
    }

    /// Serializable view for the diagnostics endpoint.
    pub fn summary(&self) -> Vec<OutcomeSummary> {
        self.outcomes
            .iter()
            .map(|o| OutcomeSummary {
                unit: o.unit.clone(),
                success: o.success(),
                error: o.error.as_ref().map(ToString::to_string),
                elapsed_ms: o.elapsed.as_millis() as u64,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeSummary {
    pub unit: ProvisioningUnit,
    pub success: bool,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}
