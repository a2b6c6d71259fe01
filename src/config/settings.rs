//! Resolved, immutable runtime settings.

use super::types::{FiltersSection, ThresholdsSection, ThrottlingSection};
use crate::logging::{EventMask, LogLevel, RotationPolicy};
use std::path::PathBuf;
use std::time::Duration;

/// Extension of every log file.
pub const LOG_EXTENSION: &str = ".ndjson";

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Minimum severity written
    pub level: LogLevel,

    /// Enabled event categories
    pub events: EventMask,

    /// Output file and sink settings
    pub file: FileSettings,

    /// Caller-side event filters
    pub filters: FiltersSection,

    /// Anti-spam throttling
    pub throttling: ThrottlingSection,

    /// Hit damage thresholds
    pub thresholds: ThresholdsSection,

    /// Process instance id stamped on every line
    pub instance_id: u64,

    /// Host machine name (lowercase)
    pub host_name: String,

    /// Source/world name stamped on every line (lowercase)
    pub world_name: String,

    /// Startup telemetry disabled
    pub disable_telemetry: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            events: EventMask::ALL,
            file: FileSettings::default(),
            filters: FiltersSection::default(),
            throttling: ThrottlingSection::default(),
            thresholds: ThresholdsSection::default(),
            instance_id: 0,
            host_name: String::new(),
            world_name: String::new(),
            disable_telemetry: false,
        }
    }
}

impl Settings {
    /// Builder: set the severity threshold
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Builder: set the enabled categories
    #[must_use]
    pub fn with_events(mut self, events: EventMask) -> Self {
        self.events = events;
        self
    }

    /// Builder: set the file settings
    #[must_use]
    pub fn with_file(mut self, file: FileSettings) -> Self {
        self.file = file;
        self
    }

    /// Builder: set the instance id
    #[must_use]
    pub fn with_instance_id(mut self, instance_id: u64) -> Self {
        self.instance_id = instance_id;
        self
    }

    /// Builder: set the world name
    #[must_use]
    pub fn with_world_name(mut self, world_name: impl Into<String>) -> Self {
        self.world_name = world_name.into();
        self
    }
}

/// Output file and sink settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSettings {
    /// Directory holding the log files
    pub directory: PathBuf,

    /// File name without extension
    pub file_name: String,

    /// File extension including the dot
    pub extension: String,

    /// Append instead of truncating the active file
    pub append: bool,

    /// Generations kept by rotation
    pub rotation_keep: u32,

    /// Lines buffered before a flush (0 = direct writes)
    pub buffer_size: usize,

    /// Maximum age of buffered lines
    pub flush_interval: Duration,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_name: "eventlog_0".to_string(),
            extension: LOG_EXTENSION.to_string(),
            append: false,
            rotation_keep: 5,
            buffer_size: 32,
            flush_interval: Duration::from_secs(5),
        }
    }
}

impl FileSettings {
    /// Path of the active file without extension
    pub fn base_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// Rotation policy for these files
    pub fn rotation(&self) -> RotationPolicy {
        RotationPolicy::new(self.base_path(), self.extension.clone(), self.rotation_keep)
    }

    /// Path of the active log file
    pub fn active_path(&self) -> PathBuf {
        self.rotation().active_path()
    }
}
