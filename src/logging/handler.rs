//! Event logger: level/category gate, line composition and the sink

use super::clock::{Clock, ManualClock};
use super::event::{EventKind, EventMask};
use super::format::{LineComposer, LogRecord};
use super::level::LogLevel;
use super::metrics::LoggingMetrics;
use super::output::{BufferedSink, LogOutput, MemoryOutput, SinkState, SinkStats};
use super::policy::EventPolicy;
use crate::config::Settings;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Structured NDJSON event logger
///
/// None of the logging entry points report failures to the caller: lines
/// that cannot be composed or written are dropped, counted in the metrics
/// and reported through `tracing`.
pub struct EventLogger {
    /// Minimum severity written
    level: LogLevel,

    /// Enabled categories
    events: EventMask,

    /// Line builder
    composer: LineComposer,

    /// Output sink
    sink: BufferedSink,

    /// Caller-side filters
    policy: EventPolicy,

    /// Time source
    clock: Arc<dyn Clock>,

    /// Metrics
    metrics: LoggingMetrics,

    /// Sink counters already added to the metrics
    synced: SinkStats,
}

impl EventLogger {
    /// Rotate and open the log file described by `settings`.
    ///
    /// If the file cannot be opened the logger still works but drops every
    /// line.
    pub fn open(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        let mut logger = Self::detached(settings, clock);

        match logger.sink.init(&settings.file) {
            Ok(()) => info!(
                path = %settings.file.active_path().display(),
                level = %settings.level,
                events = %settings.events,
                instance = settings.instance_id,
                "Event logger started"
            ),
            Err(e) => warn!(error = %e, "Event logger started without output"),
        }

        logger
    }

    /// Create a logger writing to an already opened output.
    pub fn with_output(settings: &Settings, output: Box<dyn LogOutput>, clock: Arc<dyn Clock>) -> Self {
        let mut logger = Self::detached(settings, clock);
        logger
            .sink
            .init_with_output(output, settings.file.buffer_size, settings.file.flush_interval);
        logger
    }

    fn detached(settings: &Settings, clock: Arc<dyn Clock>) -> Self {
        Self {
            level: settings.level,
            events: settings.events,
            composer: LineComposer::new(settings.instance_id, settings.world_name.clone(), clock.clone()),
            sink: BufferedSink::new(clock.clone()),
            policy: EventPolicy::from_settings(settings),
            clock,
            metrics: LoggingMetrics::new(),
            synced: SinkStats::default(),
        }
    }

    /// Check whether a record at `level` in category `event` would be written.
    pub fn is_enabled(&self, level: LogLevel, event: EventKind) -> bool {
        level.is_enabled(self.level) && self.events.is_enabled(event.bit())
    }

    /// Log a record
    pub fn log(&mut self, record: &LogRecord) {
        if !self.is_enabled(record.level, record.event) {
            self.metrics.record_filtered();
            return;
        }

        let started = Instant::now();
        let line = match self.composer.compose(record) {
            Ok(line) => line,
            Err(e) => {
                self.metrics.record_dropped(1);
                warn!(error = %e, event = record.event.name(), "Failed to compose log line");
                return;
            },
        };
        let elapsed = started.elapsed();

        // a failed size flush loses every pending line, not just this one
        let pending = self.sink.pending() + 1;
        match self.sink.write(&line) {
            Ok(()) => self.metrics.record_entry(record.level, elapsed),
            Err(e) => {
                let lost = self.record_lost(pending);
                debug!(error = %e, lines = lost, "Dropped log lines");
            },
        }
        self.sync_sink();
    }

    /// Log a trace message
    pub fn trace(&mut self, event: EventKind, message: &str) {
        self.log(&LogRecord::trace(event, message));
    }

    /// Log a debug message
    pub fn debug(&mut self, event: EventKind, message: &str) {
        self.log(&LogRecord::debug(event, message));
    }

    /// Log an info message
    pub fn info(&mut self, event: EventKind, message: &str) {
        self.log(&LogRecord::info(event, message));
    }

    /// Log a warning message
    pub fn warn(&mut self, event: EventKind, message: &str) {
        self.log(&LogRecord::warn(event, message));
    }

    /// Log an error message
    pub fn error(&mut self, event: EventKind, message: &str) {
        self.log(&LogRecord::error(event, message));
    }

    /// Log a fatal message
    pub fn fatal(&mut self, event: EventKind, message: &str) {
        self.log(&LogRecord::fatal(event, message));
    }

    /// Drive the flush timer; call this between events.
    pub fn tick(&mut self) {
        let pending = self.sink.pending();
        if let Err(e) = self.sink.tick() {
            let lost = self.record_lost(pending);
            debug!(error = %e, lines = lost, "Timer flush failed");
        }
        self.sync_sink();
    }

    /// Flush pending lines now
    pub fn flush(&mut self) {
        let pending = self.sink.pending();
        if let Err(e) = self.sink.flush() {
            let lost = self.record_lost(pending);
            debug!(error = %e, lines = lost, "Flush failed");
        }
        self.sync_sink();
    }

    /// Flush pending lines and switch to direct writes
    pub fn shutdown(&mut self) {
        let pending = self.sink.pending();
        if let Err(e) = self.sink.shutdown() {
            let lost = self.record_lost(pending);
            debug!(error = %e, lines = lost, "Shutdown flush failed");
        }
        self.sync_sink();
    }

    /// Flush and release the log file
    pub fn close(&mut self) {
        if self.sink.state() == SinkState::Closed {
            return;
        }
        let pending = self.sink.pending();
        if let Err(e) = self.sink.close() {
            let lost = self.record_lost(pending);
            debug!(error = %e, lines = lost, "Close failed");
        }
        self.sync_sink();
        info!(
            written = self.metrics.lines_written(),
            dropped = self.metrics.entries_dropped(),
            "Event logger closed"
        );
    }

    /// Count the lines a failed sink call took with it.
    ///
    /// `expected` is the number of lines the sink should have held or
    /// written; whatever is no longer pending was lost.
    fn record_lost(&self, expected: usize) -> u64 {
        let lost = expected.saturating_sub(self.sink.pending()) as u64;
        self.metrics.record_dropped(lost);
        lost
    }

    fn sync_sink(&mut self) {
        let current = self.sink.stats().clone();
        self.metrics.observe_sink(&self.synced, &current);
        self.synced = current;
    }

    /// Check whether a shot from `source` passes the fire throttle now
    pub fn allow_fire(&mut self, source: u64) -> bool {
        let now = self.clock.uptime_ms();
        self.policy.allow_fire(source, now)
    }

    /// Caller-side filters
    pub fn policy(&self) -> &EventPolicy {
        &self.policy
    }

    /// Caller-side filters (mutable, for the fire throttle)
    pub fn policy_mut(&mut self) -> &mut EventPolicy {
        &mut self.policy
    }

    /// Severity threshold
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Enabled categories
    pub fn events(&self) -> EventMask {
        self.events
    }

    /// Sink state
    pub fn state(&self) -> SinkState {
        self.sink.state()
    }

    /// Lines waiting in the buffer
    pub fn pending(&self) -> usize {
        self.sink.pending()
    }

    /// Live metrics handle; clones share the logger's counters
    pub fn metrics(&self) -> LoggingMetrics {
        self.metrics.clone()
    }
}

impl std::fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLogger")
            .field("level", &self.level)
            .field("events", &self.events)
            .field("composer", &self.composer)
            .field("sink", &self.sink)
            .finish()
    }
}

/// Create a memory-backed logger for testing
///
/// The logger writes every line directly (no buffering) at the default
/// threshold, stamps instance 1 and world `test`, and runs on a manual
/// clock frozen at 2023-11-14T22:13:20Z.
pub fn create_test_logger() -> (EventLogger, MemoryOutput, Arc<ManualClock>) {
    let mut settings = Settings::default()
        .with_instance_id(1)
        .with_world_name("test");
    settings.file.buffer_size = 0;

    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let memory = MemoryOutput::new();
    let logger = EventLogger::with_output(&settings, Box::new(memory.clone()), clock.clone());

    (logger, memory, clock)
}
