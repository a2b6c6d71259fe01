//! # eventlog
//!
//! A structured event-logging engine that turns discrete runtime events into
//! newline-delimited JSON records.
//!
//! ## Features
//!
//! - Severity threshold and category bitmask gate
//! - Single-line JSON composition with raw/quoted value classification
//! - Buffered file sink with size and timer flushes
//! - Index-shifting rotation of previous runs' files
//! - JSON settings document with host and command-line overrides
//!
//! ## Architecture
//!
//! [`config`] resolves an immutable [`config::Settings`] from the settings
//! document, host values and command-line flags. [`logging::EventLogger`]
//! takes those settings, gates each record, composes the line and hands it
//! to the sink. Everything is single-threaded and cooperative: the host
//! calls [`logging::EventLogger::tick`] between events to drive the flush
//! timer.
//!
//! ```no_run
//! use eventlog::config::Settings;
//! use eventlog::logging::{EventKind, EventLogger, LogRecord, SystemClock};
//! use std::sync::Arc;
//!
//! let settings = Settings::default().with_instance_id(2302);
//! let mut logger = EventLogger::open(&settings, Arc::new(SystemClock::new()));
//!
//! logger.log(
//!     &LogRecord::info(EventKind::PlayerHit, "player hit")
//!         .with_field("damage", "12.5")
//!         .with_field("pos", "<1200.5, 14.2, 9800.1>"),
//! );
//! logger.tick();
//! logger.close();
//! ```

pub mod config;
pub mod logging;
