//! Diagnostics endpoints.
//!
//! The router is an ordinary value built by the startup sequence's owner and
//! served on its own listener; nothing registers handlers globally.
//!
//! - `GET /healthz` liveness
//! - `GET /readyz` 200 once startup completed, 503 before
//! - `GET /debug/startup` services, schema outcomes, current phase

pub mod handlers;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::lifecycle::{Context, StartupState};

use self::handlers::{get_health, get_ready, get_startup};

pub fn router(state: Arc<StartupState>) -> Router {
    Router::new()
        .route("/healthz", get(get_health))
        .route("/readyz", get(get_ready))
        .route("/debug/startup", get(get_startup))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve `router` on `listener` until `ctx` ends.
pub async fn serve(listener: TcpListener, router: Router, ctx: Context) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Diagnostics server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            ctx.done().await;
        })
        .await?;

    tracing::info!("Diagnostics server stopped");
    Ok(())
}
