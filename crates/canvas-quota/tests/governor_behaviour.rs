//! Governor behaviour over whole call sequences, in virtual time.

use canvas_quota::{
    CircuitState, ManualClock, QuotaConfig, QuotaError, QuotaGovernor, RemoteError, Weight,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn governor(config: QuotaConfig) -> (QuotaGovernor, Arc<ManualClock>) {
    // Noon at the provider's reset offset, far from a day boundary.
    let start = Utc.with_ymd_and_hms(2024, 6, 3, 20, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    (QuotaGovernor::with_clock(config, clock.clone()), clock)
}

async fn call(
    governor: &QuotaGovernor,
    invoked: &AtomicUsize,
    outcome: Result<(), RemoteError>,
) -> Result<(), QuotaError> {
    governor
        .execute(Weight::Light, || async move {
            invoked.fetch_add(1, Ordering::SeqCst);
            outcome
        })
        .await
}

#[tokio::test]
async fn circuit_trips_after_three_rate_limits_and_recovers() {
    let (governor, clock) = governor(QuotaConfig::unpaced());
    let invoked = AtomicUsize::new(0);
    let rate_limited = || Err(RemoteError::RateLimited("quota".into()));

    for _ in 0..3 {
        let result = call(&governor, &invoked, rate_limited()).await;
        assert!(matches!(result, Err(QuotaError::RateLimited(_))));
    }
    assert_eq!(governor.circuit_state(), CircuitState::Open);

    let fourth = call(&governor, &invoked, Ok(())).await;
    match fourth {
        Err(QuotaError::CircuitOpen { retry_after }) => {
            assert!(retry_after <= Duration::from_secs(60));
            assert!(retry_after > Duration::ZERO);
        }
        other => panic!("expected open circuit, got {other:?}"),
    }
    assert_eq!(invoked.load(Ordering::SeqCst), 3);

    clock.advance(Duration::from_secs(60));
    call(&governor, &invoked, Ok(())).await.unwrap();
    assert_eq!(invoked.load(Ordering::SeqCst), 4);

    let snapshot = governor.snapshot();
    assert_eq!(snapshot.circuit, CircuitState::Closed);
    assert_eq!(snapshot.consecutive_failures, 0);
    assert_eq!(snapshot.backoff_ms, 0);
}

#[tokio::test]
async fn per_minute_cap_waits_for_next_window() {
    let (governor, clock) = governor(QuotaConfig::unpaced().with_rpm_cap(2));
    let invoked = AtomicUsize::new(0);

    call(&governor, &invoked, Ok(())).await.unwrap();
    call(&governor, &invoked, Ok(())).await.unwrap();
    assert!(clock.sleeps().is_empty());

    call(&governor, &invoked, Ok(())).await.unwrap();
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(60)]);
    assert_eq!(governor.snapshot().calls_this_minute, 1);
    assert_eq!(governor.snapshot().calls_today, 3);
}

#[tokio::test]
async fn failures_do_not_consume_quota() {
    let (governor, _) = governor(QuotaConfig::unpaced().with_daily_cap(1));
    let invoked = AtomicUsize::new(0);

    let failed = call(&governor, &invoked, Err(RemoteError::Failed("bad payload".into()))).await;
    assert_eq!(failed, Err(QuotaError::Remote("bad payload".into())));
    call(&governor, &invoked, Ok(())).await.unwrap();
    assert!(call(&governor, &invoked, Ok(()))
        .await
        .unwrap_err()
        .is_terminal());
    assert_eq!(invoked.load(Ordering::SeqCst), 2);
}

#[derive(Debug, Clone)]
enum Step {
    Succeed,
    RateLimit,
    Fail,
    Wait(u64),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => Just(Step::Succeed),
        2 => Just(Step::RateLimit),
        1 => Just(Step::Fail),
        1 => (1u64..120).prop_map(Step::Wait),
    ]
}

proptest! {
    #[test]
    fn prop_counters_respect_caps_and_backoff_bounded(
        steps in prop::collection::vec(step_strategy(), 1..60),
        daily_cap in 1u32..40,
        rpm_cap in 1u32..5,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let config = QuotaConfig::unpaced()
            .with_daily_cap(daily_cap)
            .with_rpm_cap(rpm_cap);
        let ceiling = config.backoff_ceiling();
        let (governor, clock) = governor(config);
        let invoked = AtomicUsize::new(0);

        let mut previous = 0;
        for step in steps {
            let outcome = match step {
                Step::Wait(secs) => {
                    clock.advance(Duration::from_secs(secs));
                    continue;
                }
                Step::Succeed => Ok(()),
                Step::RateLimit => Err(RemoteError::RateLimited("429".into())),
                Step::Fail => Err(RemoteError::Failed("500".into())),
            };
            let _ = runtime.block_on(call(&governor, &invoked, outcome));

            let snapshot = governor.snapshot();
            prop_assert!(snapshot.calls_today >= previous);
            prop_assert!(snapshot.calls_today <= daily_cap);
            prop_assert!(snapshot.calls_this_minute <= rpm_cap);
            prop_assert!(Duration::from_millis(snapshot.backoff_ms) <= ceiling);
            previous = snapshot.calls_today;
        }
    }
}
