//! Quota governor
//!
//! Paces remote calls under a per-minute and per-day budget, grows a backoff
//! on rate limits and opens a circuit after repeated rate limits.
//!
//! State lives behind a `parking_lot::Mutex` that is only held for
//! bookkeeping, never across a sleep or the remote call.

use crate::clock::{elapsed, Clock, SystemClock};
use crate::config::{QuotaConfig, Weight};
use crate::error::{QuotaError, RemoteError};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const MINUTE: Duration = Duration::from_secs(60);

/// Circuit breaker position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls flow normally
    Closed,
    /// Calls are refused until the cooldown elapses
    Open,
}

/// Mutable quota bookkeeping for one session
#[derive(Debug, Clone)]
struct QuotaState {
    calls_this_minute: u32,
    minute_started_at: Option<DateTime<Utc>>,
    calls_today: u32,
    day: NaiveDate,
    backoff: Duration,
    consecutive_successes: u32,
    consecutive_failures: u32,
    circuit_opened_at: Option<DateTime<Utc>>,
}

impl QuotaState {
    fn new(day: NaiveDate) -> Self {
        Self {
            calls_this_minute: 0,
            minute_started_at: None,
            calls_today: 0,
            day,
            backoff: Duration::ZERO,
            consecutive_successes: 0,
            consecutive_failures: 0,
            circuit_opened_at: None,
        }
    }

    fn circuit(&self) -> CircuitState {
        if self.circuit_opened_at.is_some() {
            CircuitState::Open
        } else {
            CircuitState::Closed
        }
    }
}

/// Serializable copy of the quota state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    /// Successful calls in the current minute window
    pub calls_this_minute: u32,
    /// Successful calls in the current quota day
    pub calls_today: u32,
    /// Configured daily cap
    pub daily_cap: u32,
    /// Calls left today
    pub remaining_today: u32,
    /// Current backoff in milliseconds
    pub backoff_ms: u64,
    /// Successes since the last rate limit or decay
    pub consecutive_successes: u32,
    /// Rate limits since the last success
    pub consecutive_failures: u32,
    /// Circuit position
    pub circuit: CircuitState,
    /// When the circuit opened, if open
    pub circuit_opened_at: Option<DateTime<Utc>>,
}

/// Session-scoped governor for remote calls
///
/// Shared as `Arc<QuotaGovernor>`; calls are expected to be serialized by
/// the caller.
#[derive(Debug)]
pub struct QuotaGovernor {
    config: QuotaConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<QuotaState>,
    rng: Mutex<StdRng>,
}

impl QuotaGovernor {
    /// Governor on the system clock
    #[must_use]
    pub fn new(config: QuotaConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Governor on an explicit clock
    #[must_use]
    pub fn with_clock(config: QuotaConfig, clock: Arc<dyn Clock>) -> Self {
        let rng = match config.jitter_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let day = quota_day(&config, clock.now());
        Self {
            state: Mutex::new(QuotaState::new(day)),
            rng: Mutex::new(rng),
            config,
            clock,
        }
    }

    /// Seed the daily counter for a session resumed mid-day
    #[must_use]
    pub fn with_usage(self, calls_today: u32) -> Self {
        self.state.lock().calls_today = calls_today;
        self
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &QuotaConfig {
        &self.config
    }

    /// Clock the governor reads
    #[inline]
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Current circuit position
    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.state.lock().circuit()
    }

    /// Current backoff
    #[must_use]
    pub fn backoff(&self) -> Duration {
        self.state.lock().backoff
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> QuotaSnapshot {
        let state = self.state.lock();
        QuotaSnapshot {
            calls_this_minute: state.calls_this_minute,
            calls_today: state.calls_today,
            daily_cap: self.config.daily_cap,
            remaining_today: self.config.daily_cap.saturating_sub(state.calls_today),
            backoff_ms: millis(state.backoff),
            consecutive_successes: state.consecutive_successes,
            consecutive_failures: state.consecutive_failures,
            circuit: state.circuit(),
            circuit_opened_at: state.circuit_opened_at,
        }
    }

    /// Run `remote_call` under the quota
    ///
    /// # Errors
    ///
    /// - [`QuotaError::CircuitOpen`] while the circuit cools down; the call
    ///   is not attempted
    /// - [`QuotaError::DailyQuotaExceeded`] once the daily cap is spent
    /// - [`QuotaError::RateLimited`] when the provider rate limits the call
    /// - [`QuotaError::Remote`] for any other remote failure
    pub async fn execute<T, F, Fut>(&self, weight: Weight, remote_call: F) -> Result<T, QuotaError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, RemoteError>> + Send,
    {
        if let Some(wait) = self.admit()? {
            debug!(wait_ms = millis(wait), "per-minute cap reached, waiting");
            self.clock.sleep(wait).await;
            self.start_window();
        }

        let pause = self.pacing_delay(weight) + self.backoff();
        debug!(%weight, delay_ms = millis(pause), "pacing remote call");
        if !pause.is_zero() {
            self.clock.sleep(pause).await;
        }

        match remote_call().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(RemoteError::RateLimited(message)) => {
                self.record_rate_limit();
                Err(QuotaError::RateLimited(message))
            }
            Err(RemoteError::Failed(message)) => Err(QuotaError::Remote(message)),
        }
    }

    /// Circuit, daily and per-minute checks; returns the window wait, if any
    fn admit(&self) -> Result<Option<Duration>, QuotaError> {
        let now = self.clock.now();
        let mut state = self.state.lock();

        if let Some(opened_at) = state.circuit_opened_at {
            let open_for = elapsed(opened_at, now);
            let cooldown = self.config.cooldown();
            if open_for < cooldown {
                return Err(QuotaError::CircuitOpen {
                    retry_after: cooldown - open_for,
                });
            }
            info!("circuit cooldown elapsed, closing");
            state.circuit_opened_at = None;
            state.consecutive_failures = 0;
            state.backoff = Duration::ZERO;
        }

        let today = quota_day(&self.config, now);
        if today != state.day {
            info!(%today, previous = state.calls_today, "quota day rolled over");
            state.day = today;
            state.calls_today = 0;
        }
        if state.calls_today >= self.config.daily_cap {
            error!(cap = self.config.daily_cap, "daily quota exceeded");
            return Err(QuotaError::DailyQuotaExceeded {
                cap: self.config.daily_cap,
            });
        }

        match state.minute_started_at {
            Some(started) if elapsed(started, now) < MINUTE => {
                if state.calls_this_minute >= self.config.rpm_cap {
                    return Ok(Some(MINUTE - elapsed(started, now)));
                }
            }
            _ => {
                state.minute_started_at = Some(now);
                state.calls_this_minute = 0;
            }
        }
        Ok(None)
    }

    fn start_window(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.minute_started_at = Some(now);
        state.calls_this_minute = 0;
    }

    /// Base delay plus uniform jitter; zero for local work
    fn pacing_delay(&self, weight: Weight) -> Duration {
        if !weight.is_remote() {
            return Duration::ZERO;
        }
        let jitter = match self.config.jitter_max_ms {
            0 => 0,
            max => self.rng.lock().random_range(0..=max),
        };
        self.config.base_delay(weight) + Duration::from_millis(jitter)
    }

    fn record_success(&self) {
        let mut state = self.state.lock();
        state.calls_this_minute = state.calls_this_minute.saturating_add(1);
        state.calls_today = state.calls_today.saturating_add(1);
        state.consecutive_failures = 0;
        state.consecutive_successes += 1;
        if state.consecutive_successes >= self.config.decay_after_successes {
            state.backoff /= 2;
            state.consecutive_successes = 0;
            if !state.backoff.is_zero() {
                debug!(backoff_ms = millis(state.backoff), "backoff decayed");
            }
        }
    }

    fn record_rate_limit(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let ceiling = self.config.backoff_ceiling();
        state.backoff = if state.backoff.is_zero() {
            self.config.backoff_initial()
        } else {
            let grown = state.backoff.as_secs_f64() * self.config.backoff_multiplier;
            Duration::try_from_secs_f64(grown).unwrap_or(ceiling)
        }
        .min(ceiling);
        state.consecutive_successes = 0;
        state.consecutive_failures += 1;
        warn!(
            backoff_ms = millis(state.backoff),
            failures = state.consecutive_failures,
            "remote call rate limited"
        );

        if state.circuit_opened_at.is_none()
            && state.consecutive_failures >= self.config.failure_threshold
        {
            state.circuit_opened_at = Some(now);
            warn!(
                cooldown_secs = self.config.cooldown_secs,
                "circuit opened after repeated rate limits"
            );
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Calendar day of `now` in the provider's reset offset
fn quota_day(config: &QuotaConfig, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&config.day_offset()).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap()
    }

    fn governor(config: QuotaConfig) -> (QuotaGovernor, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(noon()));
        (QuotaGovernor::with_clock(config, clock.clone()), clock)
    }

    async fn ok(governor: &QuotaGovernor) -> Result<(), QuotaError> {
        governor.execute(Weight::Light, || async { Ok(()) }).await
    }

    async fn limited(governor: &QuotaGovernor) -> Result<(), QuotaError> {
        governor
            .execute(Weight::Light, || async {
                Err::<(), _>(RemoteError::RateLimited("429".into()))
            })
            .await
    }

    #[tokio::test]
    async fn delay_is_base_plus_bounded_jitter() {
        let config = QuotaConfig::default().with_jitter_seed(7);
        let (governor, clock) = governor(config);
        governor.execute(Weight::Heavy, || async { Ok(()) }).await.unwrap();

        let slept = clock.total_slept();
        assert!(slept >= Duration::from_millis(4000));
        assert!(slept <= Duration::from_millis(4500));
    }

    #[tokio::test]
    async fn local_weight_is_not_paced() {
        let (governor, clock) = governor(QuotaConfig::default());
        governor.execute(Weight::Local, || async { Ok(()) }).await.unwrap();
        assert_eq!(clock.total_slept(), Duration::ZERO);
    }

    #[tokio::test]
    async fn backoff_doubles_then_caps() {
        let config = QuotaConfig::unpaced().with_failure_threshold(100);
        let (governor, _) = governor(config);
        let mut seen = Vec::new();
        for _ in 0..7 {
            assert!(matches!(limited(&governor).await, Err(QuotaError::RateLimited(_))));
            seen.push(governor.backoff().as_millis());
        }
        assert_eq!(seen, vec![1000, 2000, 4000, 8000, 16000, 30000, 30000]);
    }

    #[test]
    fn millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn oversized_multiplier_caps_at_ceiling() {
        let mut config = QuotaConfig::unpaced().with_failure_threshold(100);
        config.backoff_multiplier = 1e300;
        let (governor, _) = governor(config);
        for _ in 0..3 {
            assert!(matches!(limited(&governor).await, Err(QuotaError::RateLimited(_))));
        }
        assert_eq!(governor.backoff(), Duration::from_secs(30));
        assert_eq!(governor.snapshot().backoff_ms, 30_000);
    }

    #[tokio::test]
    async fn backoff_halves_after_five_successes() {
        let config = QuotaConfig::unpaced().with_failure_threshold(100);
        let (governor, _) = governor(config);
        limited(&governor).await.unwrap_err();
        limited(&governor).await.unwrap_err();
        assert_eq!(governor.backoff(), Duration::from_millis(2000));

        for _ in 0..4 {
            ok(&governor).await.unwrap();
        }
        assert_eq!(governor.backoff(), Duration::from_millis(2000));
        ok(&governor).await.unwrap();
        assert_eq!(governor.backoff(), Duration::from_millis(1000));
        assert_eq!(governor.snapshot().consecutive_successes, 0);
    }

    #[tokio::test]
    async fn other_failures_leave_backoff_alone() {
        let (governor, _) = governor(QuotaConfig::unpaced());
        let result: Result<(), _> = governor
            .execute(Weight::Medium, || async { Err(RemoteError::Failed("500".into())) })
            .await;
        assert_eq!(result, Err(QuotaError::Remote("500".into())));
        let snapshot = governor.snapshot();
        assert_eq!(snapshot.backoff_ms, 0);
        assert_eq!(snapshot.consecutive_failures, 0);
        assert_eq!(snapshot.calls_today, 0);
    }

    #[tokio::test]
    async fn daily_cap_is_terminal() {
        let config = QuotaConfig::unpaced().with_daily_cap(2);
        let (governor, _) = governor(config);
        ok(&governor).await.unwrap();
        ok(&governor).await.unwrap();
        assert_eq!(
            ok(&governor).await,
            Err(QuotaError::DailyQuotaExceeded { cap: 2 })
        );
        assert_eq!(governor.snapshot().remaining_today, 0);
    }

    #[tokio::test]
    async fn usage_resets_on_new_quota_day() {
        let config = QuotaConfig::unpaced().with_daily_cap(3);
        let (governor, clock) = governor(config);
        let governor = governor.with_usage(3);
        assert!(ok(&governor).await.unwrap_err().is_terminal());

        // 20:00 UTC is noon at UTC-8; the quota day ends twelve hours later.
        clock.advance(Duration::from_secs(12 * 3600));
        ok(&governor).await.unwrap();
        assert_eq!(governor.snapshot().calls_today, 1);
    }
}
