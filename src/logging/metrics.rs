//! Logging metrics
//!
//! Counters are `prometheus_client` metrics, so clones of [`LoggingMetrics`]
//! share state and can be registered on an embedder's own registry.

use super::level::LogLevel;
use super::output::{FlushTrigger, SinkStats};
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::{Registry, Unit};
use std::sync::atomic::AtomicU64;
use std::time::Duration;
use tracing::warn;

/// Labels of the per-level entry counter
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct LevelLabels {
    /// Level name
    pub level: String,
}

impl From<LogLevel> for LevelLabels {
    fn from(level: LogLevel) -> Self {
        Self {
            level: level.as_str().to_string(),
        }
    }
}

/// Labels of the per-trigger flush counter
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TriggerLabels {
    /// Trigger name
    pub trigger: String,
}

impl From<FlushTrigger> for TriggerLabels {
    fn from(trigger: FlushTrigger) -> Self {
        Self {
            trigger: trigger.as_str().to_string(),
        }
    }
}

/// Counters describing what the logger did
#[derive(Debug, Clone)]
pub struct LoggingMetrics {
    /// Entries accepted by the sink, by level
    events: Family<LevelLabels, Counter>,

    /// Buffered flushes, by trigger
    flushes: Family<TriggerLabels, Counter>,

    /// Entries rejected by the level or category gate
    filtered: Counter,

    /// Lines that could not be composed or written
    dropped: Counter,

    /// Lines handed to the output
    lines_written: Counter,

    /// Bytes handed to the output
    bytes_written: Counter,

    /// Failed output writes
    write_errors: Counter,

    /// Time spent composing lines
    compose_seconds: Counter<f64, AtomicU64>,
}

impl LoggingMetrics {
    /// Create zeroed metrics with every level and trigger series present
    pub fn new() -> Self {
        let metrics = Self {
            events: Family::default(),
            flushes: Family::default(),
            filtered: Counter::default(),
            dropped: Counter::default(),
            lines_written: Counter::default(),
            bytes_written: Counter::default(),
            write_errors: Counter::default(),
            compose_seconds: Counter::default(),
        };

        for level in LogLevel::RECORDABLE {
            metrics.events.get_or_create(&level.into());
        }
        for trigger in FlushTrigger::ALL {
            metrics.flushes.get_or_create(&trigger.into());
        }

        metrics
    }

    /// Total entries accepted by the sink
    pub fn entries_logged(&self) -> u64 {
        LogLevel::RECORDABLE.iter().map(|level| self.entries_at(*level)).sum()
    }

    /// Entries accepted at `level`
    pub fn entries_at(&self, level: LogLevel) -> u64 {
        if !LogLevel::RECORDABLE.contains(&level) {
            return 0;
        }
        self.events.get_or_create(&level.into()).get()
    }

    /// Entries rejected by the level or category gate
    pub fn entries_filtered(&self) -> u64 {
        self.filtered.get()
    }

    /// Lines lost to composition or output failures
    pub fn entries_dropped(&self) -> u64 {
        self.dropped.get()
    }

    /// Flushes caused by `trigger`
    pub fn flushes(&self, trigger: FlushTrigger) -> u64 {
        self.flushes.get_or_create(&trigger.into()).get()
    }

    /// Total flushes of buffered lines
    pub fn flush_count(&self) -> u64 {
        FlushTrigger::ALL.iter().map(|t| self.flushes(*t)).sum()
    }

    /// Lines handed to the output
    pub fn lines_written(&self) -> u64 {
        self.lines_written.get()
    }

    /// Bytes handed to the output
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.get()
    }

    /// Failed output writes
    pub fn write_errors(&self) -> u64 {
        self.write_errors.get()
    }

    /// Time spent composing lines
    pub fn compose_time(&self) -> Duration {
        Duration::from_secs_f64(self.compose_seconds.get())
    }

    pub(crate) fn record_entry(&self, level: LogLevel, compose_time: Duration) {
        self.events.get_or_create(&level.into()).inc();
        self.compose_seconds.inc_by(compose_time.as_secs_f64());
    }

    pub(crate) fn record_filtered(&self) {
        self.filtered.inc();
    }

    pub(crate) fn record_dropped(&self, lines: u64) {
        self.dropped.inc_by(lines);
    }

    /// Add what the sink did between two snapshots of its counters.
    pub(crate) fn observe_sink(&self, previous: &SinkStats, current: &SinkStats) {
        for trigger in FlushTrigger::ALL {
            let delta = current.flushes(trigger).saturating_sub(previous.flushes(trigger));
            if delta > 0 {
                self.flushes.get_or_create(&trigger.into()).inc_by(delta);
            }
        }
        self.lines_written
            .inc_by(current.lines_written.saturating_sub(previous.lines_written));
        self.bytes_written
            .inc_by(current.bytes_written.saturating_sub(previous.bytes_written));
        self.write_errors
            .inc_by(current.write_errors.saturating_sub(previous.write_errors));
    }

    /// Register every counter on `registry`.
    pub fn register(&self, registry: &mut Registry) {
        registry.register("events", "Entries accepted by the sink", self.events.clone());
        registry.register("flushes", "Buffered flushes by trigger", self.flushes.clone());
        registry.register(
            "events_filtered",
            "Entries rejected by the level or category gate",
            self.filtered.clone(),
        );
        registry.register(
            "events_dropped",
            "Lines lost to composition or output failures",
            self.dropped.clone(),
        );
        registry.register("lines_written", "Lines handed to the output", self.lines_written.clone());
        registry.register("bytes_written", "Bytes handed to the output", self.bytes_written.clone());
        registry.register("write_errors", "Failed output writes", self.write_errors.clone());
        registry.register_with_unit(
            "compose",
            "Time spent composing lines",
            Unit::Seconds,
            self.compose_seconds.clone(),
        );
    }

    /// Format metrics in Prometheus text format.
    #[must_use]
    pub fn render_prometheus(&self, prefix: &str) -> String {
        let mut registry = Registry::with_prefix(prefix);
        self.register(&mut registry);

        let mut output = String::new();
        if let Err(e) = encode(&mut output, &registry) {
            warn!(error = %e, "Failed to encode logging metrics");
        }
        output
    }
}

impl Default for LoggingMetrics {
    fn default() -> Self {
        Self::new()
    }
}
