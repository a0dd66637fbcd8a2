//! Runs against a real PostgreSQL when `LIBRATE_TEST_DATABASE_URL` is set.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use librate_bootstrap::bootstrap::{Bootstrapper, ProvisioningBatch};
use librate_bootstrap::config::DatabaseConfig;
use librate_bootstrap::connector::{ConnectionAttemptPolicy, ConnectionTarget, Connector, PgDialer};
use librate_bootstrap::lifecycle::Context;
use sqlx::postgres::PgConnectOptions;

const DATABASE_URL_ENV: &str = "LIBRATE_TEST_DATABASE_URL";

#[tokio::test]
async fn provisions_schemas_idempotently() {
    let Ok(url) = std::env::var(DATABASE_URL_ENV) else {
        eprintln!("{DATABASE_URL_ENV} not set; skipping");
        return;
    };

    let options = PgConnectOptions::from_str(&url).unwrap();
    let target = ConnectionTarget::new(
        "librate-test-db",
        &format!("{}:{}", options.get_host(), options.get_port()),
    )
    .unwrap();
    let config = DatabaseConfig {
        url,
        max_connections: 6,
        ..Default::default()
    };

    let ctx = Context::background().with_timeout(Duration::from_secs(30));
    let connector = Connector::new(PgDialer::new(&config, Duration::from_secs(5)));
    let policy = ConnectionAttemptPolicy::fixed(3, Duration::from_millis(500));
    let pool = Arc::new(connector.connect(&ctx, &target, &policy).await.unwrap());

    let batch = ProvisioningBatch::new(["bootstrap_test_media", "bootstrap_test_cdn"]).unwrap();
    let bootstrapper = Bootstrapper::new();

    let first = bootstrapper.provision(&ctx, pool.clone(), &batch).await.unwrap();
    let second = bootstrapper.provision(&ctx, pool.clone(), &batch).await.unwrap();
    assert!(first.all_succeeded(), "{first:?}");
    assert!(second.all_succeeded(), "{second:?}");

    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM information_schema.schemata WHERE schema_name IN ('bootstrap_test_media', 'bootstrap_test_cdn')",
    )
    .fetch_one(pool.as_ref())
    .await
    .unwrap();
    assert_eq!(count, 2);

    bootstrapper.teardown(&ctx, pool.as_ref(), &batch).await.unwrap();
    pool.close().await;
}
