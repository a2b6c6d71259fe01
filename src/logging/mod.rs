//! # Event Logging
//!
//! Structured event logging to newline-delimited JSON files.
//!
//! ## Features
//!
//! - Two-dimensional gate: severity threshold and 26-bit category mask
//! - Fixed envelope plus caller-supplied fields, with heuristic embedding of
//!   pre-stringified values (objects, arrays, numbers, `<x, y, z>` vectors)
//! - Buffered sink with size and timer flush triggers
//! - Index-shifting file rotation on start
//! - Caller-side filters (hit thresholds, suicides, inventory, fire throttle)
//!
//! Everything runs on the caller's thread; the flush timer is driven by
//! [`EventLogger::tick`].

pub mod clock;
pub mod error;
pub mod event;
pub mod format;
pub mod handler;
pub mod json;
pub mod level;
pub mod metrics;
pub mod output;
pub mod policy;
pub mod rotation;

pub use clock::{Clock, ManualClock, SystemClock, Ticker};
pub use error::{LogError, LogResult};
pub use event::{EventKind, EventMask};
pub use format::{LineComposer, LogRecord, SCHEMA_VERSION};
pub use handler::{create_test_logger, EventLogger};
pub use json::{classify, escape, is_number, JsonValue};
pub use level::LogLevel;
pub use metrics::{LevelLabels, LoggingMetrics, TriggerLabels};
pub use output::{BufferedSink, FileOutput, FlushTrigger, LogOutput, MemoryOutput, SinkState, SinkStats};
pub use policy::{EventPolicy, FireThrottle, InventoryDirection};
pub use rotation::{RotationPolicy, MAX_KEEP};
