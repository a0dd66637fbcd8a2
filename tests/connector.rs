//! Retry, budget and cancellation behaviour of the connector.

use std::time::Duration;

use librate_bootstrap::connector::{ConnectError, ConnectionAttemptPolicy, Connector};
use librate_bootstrap::lifecycle::{CancelReason, Context};
use tokio::time::Instant;

mod common;

use common::{db_target, ScriptedDialer};

#[tokio::test(start_paused = true)]
async fn already_cancelled_context_makes_no_attempt() {
    let connector = Connector::new(ScriptedDialer::new(0, ()));
    let ctx = Context::background();
    ctx.cancel();

    let err = connector
        .connect(&ctx, &db_target(), &ConnectionAttemptPolicy::default())
        .await
        .unwrap_err();

    match err {
        ConnectError::Cancelled { attempts, reason, .. } => {
            assert_eq!(attempts, 0);
            assert_eq!(reason, CancelReason::Cancelled);
        }
        other => panic!("expected Cancelled, got {other}"),
    }
    assert_eq!(connector.dialer().attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn expired_deadline_makes_no_attempt() {
    let connector = Connector::new(ScriptedDialer::new(0, ()));
    let ctx = Context::background().with_timeout(Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(20)).await;

    let err = connector
        .connect(&ctx, &db_target(), &ConnectionAttemptPolicy::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConnectError::Cancelled {
            attempts: 0,
            reason: CancelReason::DeadlineExceeded,
            ..
        }
    ));
    assert_eq!(connector.dialer().attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn exhausts_exactly_max_attempts_spaced_by_delay() {
    let delay = Duration::from_millis(500);
    let connector = Connector::new(ScriptedDialer::always_failing(()));
    let policy = ConnectionAttemptPolicy::fixed(4, delay);

    let start = Instant::now();
    let err = connector
        .connect(&Context::background(), &db_target(), &policy)
        .await
        .unwrap_err();

    match &err {
        ConnectError::Exhausted { attempts, target, .. } => {
            assert_eq!(*attempts, 4);
            assert!(target.contains("librate-db"));
        }
        other => panic!("expected Exhausted, got {other}"),
    }
    assert!(err.to_string().contains("4 attempt(s)"));
    assert_eq!(connector.dialer().attempts(), 4);

    let times = connector.dialer().attempt_times();
    for pair in times.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= delay && gap < delay + Duration::from_millis(5), "gap {gap:?}");
    }
    // No trailing delay after the final failure.
    let total = start.elapsed();
    assert!(total >= delay * 3 && total < delay * 3 + Duration::from_millis(5));
}

#[tokio::test(start_paused = true)]
async fn success_short_circuits_remaining_attempts() {
    let connector = Connector::new(ScriptedDialer::new(1, "handle"));
    let policy = ConnectionAttemptPolicy::fixed(6, Duration::from_secs(1));

    let start = Instant::now();
    let handle = connector
        .connect(&Context::background(), &db_target(), &policy)
        .await
        .unwrap();

    assert_eq!(handle, "handle");
    assert_eq!(connector.dialer().attempts(), 2);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(1) && elapsed < Duration::from_millis(1005));
}

#[tokio::test(start_paused = true)]
async fn first_attempt_success_incurs_no_delay() {
    let connector = Connector::new(ScriptedDialer::new(0, 7u8));
    let start = Instant::now();

    let handle = connector
        .connect(&Context::background(), &db_target(), &ConnectionAttemptPolicy::default())
        .await
        .unwrap();

    assert_eq!(handle, 7);
    assert_eq!(connector.dialer().attempts(), 1);
    assert!(start.elapsed() < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn database_comes_up_on_fourth_attempt() {
    // 6 attempts, 2.5s apart; the first three are refused.
    let connector = Connector::new(ScriptedDialer::new(3, ()));
    let policy = ConnectionAttemptPolicy::default();

    let start = Instant::now();
    connector
        .connect(&Context::background(), &db_target(), &policy)
        .await
        .unwrap();

    assert_eq!(connector.dialer().attempts(), 4);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(7500) && elapsed < Duration::from_millis(7510));
}

#[tokio::test(start_paused = true)]
async fn outer_cancel_during_wait_wins_over_budget() {
    let connector = Connector::new(ScriptedDialer::always_failing(()));
    let policy = ConnectionAttemptPolicy::fixed(6, Duration::from_secs(10)).with_deadline(Duration::from_secs(120));
    let ctx = Context::background().with_timeout(Duration::from_secs(15));

    let err = connector.connect(&ctx, &db_target(), &policy).await.unwrap_err();

    assert!(matches!(
        err,
        ConnectError::Cancelled {
            attempts: 2,
            reason: CancelReason::DeadlineExceeded,
            ..
        }
    ));
}
