//! Fixed-rate tick clock for the match authority.
//!
//! One tick is the unit of game time: countdowns, time limits and the
//! spectator settle delay are all counted in ticks, so the clock's only
//! job is to fire them at a steady cadence and report when it falls
//! behind.

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

/// What the clock does when it wakes up late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TickPolicy {
    /// Forget the missed ticks and schedule the next one a full tick from
    /// the late wake-up. Match time slows down instead of jumping.
    #[default]
    Skip,
    /// Keep the planned cadence. Missed ticks fire back to back until the
    /// clock has caught up.
    Drop,
}

/// Clock settings. Part of the orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Ticks per second, clamped to `1..=MAX_TICK_RATE_HZ`.
    pub tick_rate_hz: u32,
    pub policy: TickPolicy,
    /// Share of the tick budget (0.0 to 1.0) above which a slow tick is
    /// logged.
    pub budget_warn_threshold: f64,
    /// Upper bound of the random delay before the first tick, in µs.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 20,
            policy: TickPolicy::Skip,
            budget_warn_threshold: 0.8,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Self::default()
        }
    }

    /// Forces every field into its valid range.
    pub fn validated(self) -> Self {
        let rate = self.tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ);
        if rate != self.tick_rate_hz {
            warn!(requested = self.tick_rate_hz, rate, "tick rate out of range");
        }
        Self {
            tick_rate_hz: rate,
            budget_warn_threshold: self.budget_warn_threshold.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.max(1)
    }

    /// Whole ticks covering `duration`, rounded up. Used to express match
    /// timings in seconds when building a config.
    pub fn ticks_for(&self, duration: Duration) -> u32 {
        let ticks = (duration.as_secs_f64() * f64::from(self.tick_rate_hz.max(1))).ceil();
        ticks.min(f64::from(u32::MAX)) as u32
    }
}

/// Returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Fixed step of one tick.
    pub dt: Duration,
    /// The clock woke more than a tenth of a tick late.
    pub overrun: bool,
    /// Whole ticks lost to the overrun (`Skip` policy only).
    pub ticks_skipped: u64,
}

/// Running totals of how the clock and the tick bodies behave.
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    pub total_ticks: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
    /// Slowest tick body seen, wake-up to [`TickScheduler::record_tick_end`].
    pub max_tick_time: Duration,
    /// Last tick body as a share of the budget. Above 1.0 is an overrun.
    pub budget_utilization: f64,
}

impl TickMetrics {
    fn count_wake(&mut self, overrun: bool, skipped: u64) {
        self.total_ticks += 1;
        self.total_overruns += u64::from(overrun);
        self.total_skipped += skipped;
    }

    fn count_body(&mut self, elapsed: Duration, budget: Duration) -> f64 {
        self.max_tick_time = self.max_tick_time.max(elapsed);
        self.budget_utilization = elapsed.as_secs_f64() / budget.as_secs_f64();
        self.budget_utilization
    }
}

/// Fixed-rate clock driving the single match authority.
///
/// Pausing freezes every match at once: no tick fires, so countdowns,
/// time limits and deferred tasks all stand still until [`resume`].
///
/// [`resume`]: Self::resume
pub struct TickScheduler {
    config: TickConfig,
    step: Duration,
    ticks: u64,
    next_due: TokioInstant,
    body_started: Option<Instant>,
    paused: bool,
    metrics: TickMetrics,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let step = config.tick_duration();
        let jitter = match config.initial_jitter_us {
            0 => Duration::ZERO,
            max => Duration::from_micros(rand::rng().random_range(0..max)),
        };
        debug!(rate_hz = config.tick_rate_hz, policy = ?config.policy, "clock created");

        Self {
            next_due: TokioInstant::now() + step + jitter,
            config,
            step,
            ticks: 0,
            body_started: None,
            paused: false,
            metrics: TickMetrics::default(),
        }
    }

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits until the next tick is due.
    ///
    /// Pends forever while paused, which is what a `select!` branch wants.
    /// Cancel safe: nothing changes until the sleep has completed.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        if self.paused {
            std::future::pending::<()>().await;
        }

        let due = self.next_due;
        time::sleep_until(due).await;
        let woke = TokioInstant::now();

        self.ticks += 1;
        self.body_started = Some(Instant::now());

        let late = woke.saturating_duration_since(due);
        let overrun = late > self.step / 10;
        let ticks_skipped = self.plan_next(due, woke, late, overrun);
        self.metrics.count_wake(overrun, ticks_skipped);
        trace!(tick = self.ticks, overrun, "tick");

        TickInfo {
            tick: self.ticks,
            dt: self.step,
            overrun,
            ticks_skipped,
        }
    }

    /// Sets the next due instant. Returns how many ticks were given up.
    fn plan_next(
        &mut self,
        due: TokioInstant,
        woke: TokioInstant,
        late: Duration,
        overrun: bool,
    ) -> u64 {
        match self.config.policy {
            TickPolicy::Drop => {
                self.next_due = due + self.step;
                0
            }
            TickPolicy::Skip => {
                self.next_due = woke + self.step;
                if !overrun {
                    return 0;
                }
                let skipped = (late.as_nanos() / self.step.as_nanos()) as u64;
                if skipped > 0 {
                    warn!(tick = self.ticks, skipped, "authority fell behind, skipping ticks");
                }
                skipped
            }
        }
    }

    /// Marks the end of the current tick body and updates the budget
    /// metrics. Does nothing if no tick is in progress.
    pub fn record_tick_end(&mut self) {
        let Some(started) = self.body_started.take() else {
            return;
        };
        let elapsed = started.elapsed();
        let utilization = self.metrics.count_body(elapsed, self.step);
        if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.ticks,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                utilization_pct = format!("{:.1}", utilization * 100.0),
                "tick near its budget"
            );
        }
    }

    /// Stops the clock. Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.ticks, "clock paused");
        }
    }

    /// Restarts the clock one full tick from now, so a long pause doesn't
    /// come back as a burst of late ticks. Idempotent.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.next_due = TokioInstant::now() + self.step;
            debug!(tick = self.ticks, "clock resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    pub fn tick_duration(&self) -> Duration {
        self.step
    }
}
