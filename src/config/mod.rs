//! # Configuration System
//!
//! JSON settings document plus per-option overrides for the event logger.
//!
//! ## Sources
//!
//! - Settings document (`config.json`), created with defaults on first run
//!   and upgraded in place when written by another version
//! - Host-reported values (`EventLog_<Key>`, `instanceId`, `worldName`)
//! - Command-line flags (`-eventlog-<flag>=value`), which always win
//!
//! ## Example Document
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "settings": { "level": "info", "events_mask": "ABCDEFGHIJKLMOPQSTUVWXYZ" },
//!   "file": { "rotation_keep": 5, "buffer_size": 32, "flush_interval": 5 },
//!   "filters": { "only_player_suicide": true },
//!   "throttling": { "weapon_fire_ms": 250 },
//!   "thresholds": { "hit_damage": 3.0, "hit_damage_vehicle": 15.0 }
//! }
//! ```

mod cli;
mod error;
mod loader;
mod resolver;
mod settings;
mod types;

pub use cli::{CommandLine, EnvHostConfig, HostConfig, MapHostConfig};
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use resolver::{ConfigResolver, CLI_FLAG_PREFIX, HOST_KEY_PREFIX};
pub use settings::{FileSettings, Settings, LOG_EXTENSION};
pub use types::{
    ConfigDocument, FileSection, FiltersSection, SettingsSection, ThresholdsSection,
    ThrottlingSection, CONFIG_VERSION, DEFAULT_EVENTS_MASK,
};
