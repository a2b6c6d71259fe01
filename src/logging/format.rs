//! Log records and NDJSON line composition

use super::clock::Clock;
use super::error::LogResult;
use super::event::EventKind;
use super::json::{classify, escape};
use super::level::LogLevel;
use serde::Serialize;
use std::sync::Arc;

/// Schema identifier stamped on every line.
pub const SCHEMA_VERSION: &str = "eventlog-v1beta";

/// A log record as handed over by a caller.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Severity
    pub level: LogLevel,

    /// Event category
    pub event: EventKind,

    /// Log message
    pub message: String,

    /// Extra fields in insertion order; values are pre-stringified
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    /// Create a new record without extra fields
    pub fn new(level: LogLevel, event: EventKind, message: impl Into<String>) -> Self {
        Self {
            level,
            event,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Create a trace record
    pub fn trace(event: EventKind, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Trace, event, message)
    }

    /// Create a debug record
    pub fn debug(event: EventKind, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, event, message)
    }

    /// Create an info record
    pub fn info(event: EventKind, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, event, message)
    }

    /// Create a warn record
    pub fn warn(event: EventKind, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, event, message)
    }

    /// Create an error record
    pub fn error(event: EventKind, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, event, message)
    }

    /// Create a fatal record
    pub fn fatal(event: EventKind, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Fatal, event, message)
    }

    /// Builder: append a field
    ///
    /// The value may be JSON (object, array, number, `<x, y, z>` vector)
    /// or free text; see [`classify`](super::json::classify).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Builder: append several fields
    pub fn with_fields<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Fixed fields present on every line, in output order.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    ts: i64,
    uptime_ms: u64,
    world_time: i64,
    instance: u64,
    level: &'static str,
    schema: &'a str,
    world: &'a str,
    event_type: &'static str,
    msg: &'a str,
}

/// Builds one NDJSON line per record.
pub struct LineComposer {
    instance: u64,
    world: String,
    clock: Arc<dyn Clock>,
}

impl LineComposer {
    /// Create a composer for one process instance and source/world name.
    pub fn new(instance: u64, world: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            instance,
            world: world.into(),
            clock,
        }
    }

    /// Compose a line (without trailing newline).
    ///
    /// Extra fields with an empty key or value are skipped.
    pub fn compose(&self, record: &LogRecord) -> LogResult<String> {
        let envelope = Envelope {
            ts: self.clock.wall_time().timestamp(),
            uptime_ms: self.clock.uptime_ms(),
            world_time: self.clock.world_time(),
            instance: self.instance,
            level: record.level.as_str(),
            schema: SCHEMA_VERSION,
            world: &self.world,
            event_type: record.event.name(),
            msg: &record.message,
        };

        let mut line = serde_json::to_string(&envelope)?;
        if record.fields.is_empty() {
            return Ok(line);
        }

        // reopen the object to merge fields in
        if line.ends_with('}') {
            line.pop();
        }
        for (key, value) in &record.fields {
            if key.is_empty() || value.is_empty() {
                continue;
            }
            line.push_str(",\"");
            line.push_str(&escape(key));
            line.push_str("\":");
            classify(value).write_to(&mut line);
        }
        line.push('}');

        Ok(line)
    }

    /// Instance id stamped on lines
    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Source/world name stamped on lines
    pub fn world(&self) -> &str {
        &self.world
    }
}

impl std::fmt::Debug for LineComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineComposer")
            .field("instance", &self.instance)
            .field("world", &self.world)
            .finish()
    }
}
