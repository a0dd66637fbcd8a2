//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bootstrap_connect_attempts_total` (counter): attempts by target, result
//! - `bootstrap_connect_duration_seconds` (histogram): time to a usable connection
//! - `bootstrap_schema_provisioned_total` (counter): unit outcomes by unit, result
//!
//! Recording without an installed exporter is a no-op, so library code and
//! tests can call these freely.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

fn result_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

pub fn record_connect_attempt(target: &str, success: bool) {
    metrics::counter!(
        "bootstrap_connect_attempts_total",
        "target" => target.to_string(),
        "result" => result_label(success)
    )
    .increment(1);
}

pub fn record_connect_duration(target: &str, elapsed: Duration) {
    metrics::histogram!(
        "bootstrap_connect_duration_seconds",
        "target" => target.to_string()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_schema_provisioned(unit: &str, success: bool) {
    metrics::counter!(
        "bootstrap_schema_provisioned_total",
        "unit" => unit.to_string(),
        "result" => result_label(success)
    )
    .increment(1);
}
