//! LibRate bootstrap binary.
//!
//! # Startup Order
//!
//! ```text
//!   config ──▶ logging/metrics ──▶ diagnostics router (503 until ready)
//!                                        │
//!   services ──▶ database ──▶ schemas ───┴──▶ /readyz = 200
//! ```
//!
//! Runs until SIGINT/SIGTERM, keeping the opened connections alive.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use librate_bootstrap::config::{load_config, BootstrapConfig};
use librate_bootstrap::lifecycle::{signals, Context, StartupError, StartupSequence};
use librate_bootstrap::{diagnostics, observability};

#[derive(Parser)]
#[command(name = "librate-bootstrap")]
#[command(about = "Connect LibRate's backing services and provision its database", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let cli = Cli::parse();

    let config: BootstrapConfig = load_config(&cli.config)?;
    if cli.check {
        println!("{}: configuration OK", cli.config.display());
        return Ok(());
    }

    observability::logging::init(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "librate-bootstrap starting");

    tracing::info!(
        services = config.services.len(),
        schemas = config.database.schemas.len(),
        max_attempts = config.connect.max_attempts,
        delay_ms = config.connect.delay_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let root = Context::background();
    let _signals = signals::cancel_on_signal(root.clone());

    let sequence = StartupSequence::new(config.clone());

    let server = if config.diagnostics.enabled {
        let listener = TcpListener::bind(&config.diagnostics.bind_address).await?;
        let router = diagnostics::router(sequence.state());
        Some(tokio::spawn(diagnostics::serve(listener, router, root.clone())))
    } else {
        None
    };

    let ready = match sequence.run(&root).await {
        Ok(ready) => ready,
        Err(e) => {
            root.cancel();
            if let Some(server) = server {
                join_server(server).await;
            }
            return Err(e);
        }
    };

    tracing::info!(
        services = ready.services.len(),
        schemas_ok = ready.provisioning.succeeded().count(),
        schemas_failed = ready.provisioning.failed().count(),
        "Ready; waiting for shutdown signal"
    );

    root.done().await;

    ready.database.close().await;
    if let Some(server) = server {
        join_server(server).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn join_server(server: JoinHandle<std::io::Result<()>>) {
    match server.await {
        Ok(Err(e)) => tracing::error!(error = %e, "Diagnostics server failed"),
        Err(e) => tracing::error!(error = %e, "Diagnostics server task failed"),
        Ok(Ok(())) => {}
    }
}
