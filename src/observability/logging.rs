//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Select format (pretty or JSON), sink (stdout or stderr), timestamps and caller info
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level when set
//! - Initialization is fallible so a second call reports instead of panicking

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, LogTarget, ObservabilityConfig};

/// Default directives when neither `RUST_LOG` nor config say otherwise.
const DEFAULT_FILTER: &str = "librate_bootstrap=info,tower_http=info";

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.log_level.trim().is_empty() {
            DEFAULT_FILTER.into()
        } else {
            format!("librate_bootstrap={0},tower_http={0}", config.log_level).into()
        }
    })
}

/// Install the global subscriber.
pub fn init(config: &ObservabilityConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let writer = match config.log_target {
        LogTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_file(config.caller)
        .with_line_number(config.caller);

    let layer = match (config.log_format, config.timestamps) {
        (LogFormat::Json, true) => fmt.json().boxed(),
        (LogFormat::Json, false) => fmt.json().without_time().boxed(),
        (LogFormat::Pretty, true) => fmt.boxed(),
        (LogFormat::Pretty, false) => fmt.without_time().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(layer)
        .try_init()
}
