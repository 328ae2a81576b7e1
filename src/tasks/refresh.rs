//! Auto-Refresh Scheduler
//!
//! Self-rescheduling one-shot timer that invokes a refresh callback at a fixed
//! interval until stopped. A failing callback never breaks the cadence.
//!
//! Each armed timer is a spawned task waiting on its deadline or its
//! cancellation token. Timers carry the generation they were armed in; a timer
//! whose generation is no longer current neither runs the callback nor re-arms.
//! Callback executions (timer fires and forced refreshes) are serialized.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clock::{duration_ms, format_timestamp, Clock, SystemClock};

/// Default refresh cadence in minutes
pub const DEFAULT_INTERVAL_MINUTES: u64 = 30;

/// Future returned by a refresh callback.
pub type RefreshFuture = BoxFuture<'static, anyhow::Result<()>>;

/// Refresh operation invoked on every fire.
pub type RefreshCallback = Arc<dyn Fn() -> RefreshFuture + Send + Sync>;

// == Schedule State ==
#[derive(Debug)]
struct ScheduleState {
    active: bool,
    interval: Duration,
    /// Unix milliseconds of the next planned fire
    next_fire_at: Option<i64>,
    timer: Option<CancellationToken>,
    generation: u64,
}

impl ScheduleState {
    fn cancel_timer(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
        self.generation += 1;
    }
}

struct Inner {
    state: Mutex<ScheduleState>,
    callback: RefreshCallback,
    clock: Arc<dyn Clock>,
    run_lock: tokio::sync::Mutex<()>,
}

impl Inner {
    /// Arms a fresh one-shot timer for `interval` from now, replacing any armed one.
    fn schedule_next(inner: &Arc<Inner>, state: &mut ScheduleState) {
        state.cancel_timer();

        let generation = state.generation;
        let token = CancellationToken::new();
        let next_fire_at = inner.clock.now_ms().saturating_add(duration_ms(state.interval));
        let deadline = tokio::time::Instant::now() + state.interval;

        state.next_fire_at = Some(next_fire_at);
        state.timer = Some(token.clone());

        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep_until(deadline) => {}
            }
            Inner::fire(inner, generation).await;
        });

        debug!("Next auto-refresh scheduled for {}", format_timestamp(next_fire_at));
    }

    fn rearm_if_active(self: &Arc<Self>) {
        let mut state = self.state.lock();
        if state.active {
            Inner::schedule_next(self, &mut state);
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        let state = self.state.lock();
        state.active && state.generation == generation
    }

    async fn fire(inner: Arc<Inner>, generation: u64) {
        let _running = inner.run_lock.lock().await;

        // Stopped, forced or re-armed while waiting for the run lock
        if !inner.is_current(generation) {
            return;
        }

        info!("Auto-refresh triggered");
        if let Err(e) = (inner.callback)().await {
            error!("Auto-refresh failed: {:#}", e);
        }

        let mut state = inner.state.lock();
        if state.active && state.generation == generation {
            Inner::schedule_next(&inner, &mut state);
        }
    }
}

// == Schedule Status ==
/// Read-only snapshot of a scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleStatus {
    pub active: bool,
    pub interval_minutes: u64,
    /// Unix milliseconds of the next planned fire
    pub next_fire_at: Option<i64>,
    pub time_until_next_fire_ms: Option<u64>,
    pub time_until_next_fire_formatted: String,
}

// == Refresh Scheduler ==
/// Periodic refresh driver with `Idle` and `Active` states.
///
/// Must be started from within a Tokio runtime. Dropping the scheduler cancels
/// its armed timer; a callback already running is left to finish.
pub struct RefreshScheduler {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("state", &*self.inner.state.lock())
            .finish_non_exhaustive()
    }
}

impl RefreshScheduler {
    // == Constructor ==
    /// Creates an idle scheduler firing every `interval_minutes` (at least 1).
    pub fn new<F, Fut>(interval_minutes: u64, callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::with_clock(interval_minutes, Arc::new(SystemClock), callback)
    }

    /// Creates an idle scheduler reading wall-clock time from `clock`.
    pub fn with_clock<F, Fut>(interval_minutes: u64, clock: Arc<dyn Clock>, callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let callback: RefreshCallback = Arc::new(move || -> RefreshFuture { Box::pin(callback()) });

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ScheduleState {
                    active: false,
                    interval: minutes(interval_minutes),
                    next_fire_at: None,
                    timer: None,
                    generation: 0,
                }),
                callback,
                clock,
                run_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    // == Start ==
    /// `Idle -> Active`: arms the first timer. No-op when already active.
    pub fn start(&self) {
        let mut state = self.inner.state.lock();
        if state.active {
            warn!("Auto-refresh is already active");
            return;
        }

        state.active = true;
        Inner::schedule_next(&self.inner, &mut state);
        info!(
            "Auto-refresh started - will refresh every {} minutes",
            state.interval.as_secs() / 60
        );
    }

    // == Stop ==
    /// `Active -> Idle`: cancels the armed timer. No-op when already idle.
    pub fn stop(&self) {
        let mut state = self.inner.state.lock();
        if !state.active {
            warn!("Auto-refresh is not active");
            return;
        }

        state.cancel_timer();
        state.active = false;
        state.next_fire_at = None;
        info!("Auto-refresh stopped");
    }

    // == Force Refresh ==
    /// Runs the callback now and restarts the cadence from now.
    ///
    /// Returns `Ok(false)` without running anything when idle, `Ok(true)` once
    /// the callback succeeded. The callback's error is returned, unlike timer
    /// fires which absorb it. The run and the re-arm happen on a spawned task,
    /// so the next timer is armed even if this future is dropped mid-run.
    pub async fn force_refresh(&self) -> anyhow::Result<bool> {
        {
            let mut state = self.inner.state.lock();
            if !state.active {
                warn!("Cannot force refresh - auto-refresh is not active");
                return Ok(false);
            }
            state.cancel_timer();
        }

        info!("Force refresh triggered");
        let inner = Arc::clone(&self.inner);
        let run = tokio::spawn(async move {
            let outcome = {
                let _running = inner.run_lock.lock().await;
                (inner.callback)().await
            };
            inner.rearm_if_active();
            outcome
        });

        let outcome = match run.await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Callback panicked before the task could re-arm
                self.inner.rearm_if_active();
                Err(anyhow::anyhow!("Force refresh task failed: {}", e))
            }
        };

        if let Err(e) = &outcome {
            error!("Force refresh failed: {:#}", e);
        }
        outcome.map(|()| true)
    }

    // == Update Interval ==
    /// Changes the cadence. When active, the timer is re-armed immediately so
    /// the next fire happens one new interval from now.
    pub fn update_interval(&self, interval_minutes: u64) {
        let interval = minutes(interval_minutes);

        let was_active = {
            let mut state = self.inner.state.lock();
            if state.interval == interval {
                info!("Refresh interval unchanged");
                return;
            }
            state.interval = interval;
            state.active
        };

        info!("Updated refresh interval to {} minutes", interval.as_secs() / 60);
        if was_active {
            self.stop();
            self.start();
        }
    }

    // == Queries ==
    pub fn is_active(&self) -> bool {
        self.inner.state.lock().active
    }

    pub fn interval(&self) -> Duration {
        self.inner.state.lock().interval
    }

    /// Time left before the next fire; `None` while idle.
    pub fn time_until_next_fire(&self) -> Option<Duration> {
        let state = self.inner.state.lock();
        self.remaining(&state)
    }

    /// Returns a snapshot of the scheduler state. No side effects.
    pub fn status(&self) -> ScheduleStatus {
        let state = self.inner.state.lock();
        let remaining = self.remaining(&state);

        ScheduleStatus {
            active: state.active,
            interval_minutes: state.interval.as_secs() / 60,
            next_fire_at: state.next_fire_at,
            time_until_next_fire_ms: remaining.map(|d| d.as_millis() as u64),
            time_until_next_fire_formatted: format_remaining(remaining),
        }
    }

    fn remaining(&self, state: &ScheduleState) -> Option<Duration> {
        if !state.active {
            return None;
        }
        let next = state.next_fire_at?;
        let left = (next - self.inner.clock.now_ms()).max(0);
        Some(Duration::from_millis(left as u64))
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        state.cancel_timer();
        state.active = false;
        state.next_fire_at = None;
    }
}

fn minutes(interval_minutes: u64) -> Duration {
    Duration::from_secs(interval_minutes.max(1).saturating_mul(60))
}

/// Human-readable time until the next fire, rounded up to whole minutes.
pub fn format_remaining(remaining: Option<Duration>) -> String {
    let Some(remaining) = remaining else {
        return "Auto-refresh not active".to_string();
    };

    let minutes = remaining.as_millis().div_ceil(60_000);
    match minutes {
        0 => "Less than 1 minute".to_string(),
        1 => "1 minute".to_string(),
        n => format!("{} minutes", n),
    }
}
