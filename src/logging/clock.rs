//! Time sources and the cooperative flush ticker

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Source of the three clocks stamped on every record.
pub trait Clock: Send + Sync {
    /// Milliseconds since the process (or logger) started.
    fn uptime_ms(&self) -> u64;

    /// Current wall-clock time.
    fn wall_time(&self) -> DateTime<Utc>;

    /// Host logical/world clock in epoch seconds.
    ///
    /// Defaults to the wall clock for hosts without a separate world time.
    fn world_time(&self) -> i64 {
        self.wall_time().timestamp()
    }
}

/// Real clock backed by [`Instant`] and [`Utc::now`].
#[derive(Debug)]
pub struct SystemClock {
    started_at: Instant,
}

impl SystemClock {
    /// Create a clock whose uptime starts now.
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn uptime_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    fn wall_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock (for testing and replay).
#[derive(Debug, Default)]
pub struct ManualClock {
    uptime_ms: AtomicU64,
    wall_secs: AtomicI64,
    world_secs: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `wall_secs` with zero uptime.
    pub fn new(wall_secs: i64) -> Self {
        Self {
            uptime_ms: AtomicU64::new(0),
            wall_secs: AtomicI64::new(wall_secs),
            world_secs: AtomicI64::new(wall_secs),
        }
    }

    /// Move uptime and wall time forward.
    pub fn advance(&self, by: Duration) {
        let ms = by.as_millis() as u64;
        let total = self.uptime_ms.fetch_add(ms, Ordering::Relaxed) + ms;
        // wall time follows whole seconds of uptime
        let prev_secs = (total - ms) / 1000;
        let secs = (total / 1000 - prev_secs) as i64;
        self.wall_secs.fetch_add(secs, Ordering::Relaxed);
        self.world_secs.fetch_add(secs, Ordering::Relaxed);
    }

    /// Set the world clock independently of wall time.
    pub fn set_world_time(&self, secs: i64) {
        self.world_secs.store(secs, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn uptime_ms(&self) -> u64 {
        self.uptime_ms.load(Ordering::Relaxed)
    }

    fn wall_time(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.wall_secs.load(Ordering::Relaxed), 0)
            .single()
            .unwrap_or_default()
    }

    fn world_time(&self) -> i64 {
        self.world_secs.load(Ordering::Relaxed)
    }
}

/// Cancellable recurring task schedule.
///
/// The ticker never runs anything itself; the owner polls it with the
/// current uptime and acts when it reports the period has elapsed.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval_ms: u64,
    next_due_ms: u64,
    cancelled: bool,
}

impl Ticker {
    /// Arm a ticker that first fires `interval` after `now_ms`.
    pub fn start(interval: Duration, now_ms: u64) -> Self {
        let interval_ms = (interval.as_millis() as u64).max(1);
        Self {
            interval_ms,
            next_due_ms: now_ms.saturating_add(interval_ms),
            cancelled: false,
        }
    }

    /// Returns `true` at most once per elapsed period and reschedules.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.cancelled || now_ms < self.next_due_ms {
            return false;
        }
        self.next_due_ms = now_ms.saturating_add(self.interval_ms);
        true
    }

    /// Stop the ticker; further polls never fire.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Check whether the ticker is still armed.
    pub fn is_active(&self) -> bool {
        !self.cancelled
    }

    /// Tick period.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
