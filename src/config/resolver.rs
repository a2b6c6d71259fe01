//! Merges the settings document, host values and command-line flags.
//!
//! For every option the document value is the default, a non-zero host
//! value (`EventLog_<Key>`) replaces it, and a command-line flag
//! (`-eventlog-<flag>`) always wins. Numeric options are clamped after all
//! three sources were consulted.

use super::cli::{parse_int, CommandLine, HostConfig};
use super::settings::{FileSettings, Settings, LOG_EXTENSION};
use super::types::{ConfigDocument, FileSection, FiltersSection, ThresholdsSection, ThrottlingSection};
use crate::logging::{EventMask, LogLevel};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Prefix of host configuration keys.
pub const HOST_KEY_PREFIX: &str = "EventLog_";

/// Prefix of command-line flags.
pub const CLI_FLAG_PREFIX: &str = "eventlog-";

/// Resolves [`Settings`] for one run.
pub struct ConfigResolver<'a> {
    document: &'a ConfigDocument,
    host: &'a dyn HostConfig,
    cli: &'a CommandLine,
    log_dir: PathBuf,
}

impl<'a> ConfigResolver<'a> {
    /// Create a resolver over the three configuration sources.
    pub fn new(document: &'a ConfigDocument, host: &'a dyn HostConfig, cli: &'a CommandLine) -> Self {
        Self {
            document,
            host,
            cli,
            log_dir: PathBuf::from("logs"),
        }
    }

    /// Builder: directory the log files are written to.
    #[must_use]
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    /// Resolve the effective settings.
    ///
    /// Never fails: unusable values are reported with `warn!` and replaced
    /// by the next source in the chain or the default.
    pub fn resolve(&self) -> Settings {
        let doc = self.document;
        let instance_id = self.instance_id();

        let filters = FiltersSection {
            only_player_inventory_input: self.toggle(
                "OnlyPlayerInventoryInput",
                "only-player-inventory-input",
                doc.filters.only_player_inventory_input,
            ),
            only_player_inventory_output: self.toggle(
                "OnlyPlayerInventoryOutput",
                "only-player-inventory-output",
                doc.filters.only_player_inventory_output,
            ),
            only_player_suicide: self.toggle(
                "OnlyPlayerSuicide",
                "only-player-suicide",
                doc.filters.only_player_suicide,
            ),
        };

        let mut throttling = ThrottlingSection {
            weapon_fire_ms: self.int_opt(
                "WeaponFireThrottlingMs",
                "weapon-fire-throttling",
                doc.throttling.weapon_fire_ms,
            ),
        };
        throttling.normalize();

        let mut thresholds = ThresholdsSection {
            hit_damage: self.float_opt(
                "EntityHitDamageThreshold",
                "entity-hit-damage-threshold",
                doc.thresholds.hit_damage,
            ),
            hit_damage_vehicle: self.float_opt(
                "EntityVehicleHitDamageThreshold",
                "entity-vehicle-hit-damage-threshold",
                doc.thresholds.hit_damage_vehicle,
            ),
        };
        thresholds.normalize();

        let settings = Settings {
            level: self.level(),
            events: self.events(),
            file: self.file_settings(instance_id),
            filters,
            throttling,
            thresholds,
            instance_id,
            host_name: self.host_name(),
            world_name: self.world_name(),
            disable_telemetry: doc.settings.disable_telemetry,
        };

        debug!(
            level = %settings.level,
            events = %settings.events,
            instance_id,
            path = %settings.file.active_path().display(),
            "Resolved logging settings"
        );
        settings
    }

    fn level(&self) -> LogLevel {
        let mut level = LogLevel::from_text(&self.document.settings.level);
        if let Some(index) = self.host_int("Level") {
            match LogLevel::from_index(index) {
                Some(host_level) => level = host_level,
                None => debug!(index, "Ignoring out-of-range host log level"),
            }
        }
        if let Some(text) = self.cli_value("level") {
            level = LogLevel::from_text(text);
        }
        level
    }

    fn events(&self) -> EventMask {
        let mut events = EventMask::parse(&self.document.settings.events_mask);
        if let Some(raw) = self.host_int("EventsMask") {
            events = EventMask::from_raw(raw);
        }
        if let Some(text) = self.cli_value("events-mask") {
            events = EventMask::parse(text);
        }
        events
    }

    fn file_settings(&self, instance_id: u64) -> FileSettings {
        let doc = &self.document.file;

        let mut section = FileSection {
            file_name: self.text_opt("FileName", "file-name", &doc.file_name),
            append: self.toggle("FileAppend", "file-append", doc.append),
            rotation_keep: self.int_opt("FilesKeep", "files-keep", doc.rotation_keep),
            buffer_size: self.int_opt("BufferSize", "buffer-size", doc.buffer_size),
            flush_interval: self.int_opt("FlushInterval", "flush-interval", doc.flush_interval),
        };
        section.normalize();

        let file_name = match section.file_name.trim() {
            "" => format!("eventlog_{instance_id}"),
            name if !is_plain_file_name(name) => {
                warn!(file_name = name, "Log file name is not a plain file name, using the default");
                format!("eventlog_{instance_id}")
            },
            name => name.to_string(),
        };

        FileSettings {
            directory: self.log_dir.clone(),
            file_name,
            extension: LOG_EXTENSION.to_string(),
            append: section.append,
            rotation_keep: section.rotation_keep as u32,
            buffer_size: section.buffer_size as usize,
            flush_interval: Duration::from_secs(section.flush_interval as u64),
        }
    }

    /// First non-zero of: document override, host `instanceId`, game port,
    /// query port. An override that is not a number counts as absent.
    fn instance_id(&self) -> u64 {
        let override_id = self.document.settings.instance_id.trim();
        if !override_id.is_empty() {
            match override_id.parse::<u64>() {
                Ok(0) => {},
                Ok(id) => return id,
                Err(_) => warn!(
                    instance_id = override_id,
                    "settings.instance_id is not a non-negative integer, ignoring it"
                ),
            }
        }

        if let Some(id) = self.host.int("instanceId").filter(|id| *id > 0) {
            return id as u64;
        }

        if let Some(port) = self.cli_port("port") {
            info!(instance_id = port, "instanceId is 0, using the game port");
            return port;
        }

        if let Some(port) = self.cli_port("query-port") {
            info!(instance_id = port, "instanceId and game port are 0, using the query port");
            return port;
        }

        warn!("instanceId is 0; set a unique instanceId on the host or settings.instance_id");
        0
    }

    fn host_name(&self) -> String {
        let configured = self.document.settings.host_name.trim();
        if !configured.is_empty() {
            return configured.to_string();
        }
        machine_name().unwrap_or_default()
    }

    fn world_name(&self) -> String {
        self.host
            .text("worldName")
            .map(|name| name.trim().to_lowercase())
            .unwrap_or_default()
    }

    fn int_opt(&self, key: &str, flag: &str, default: i64) -> i64 {
        let mut value = default;
        if let Some(host) = self.host_int(key) {
            value = host;
        }
        if let Some(text) = self.cli_value(flag) {
            value = parse_int(text);
        }
        value
    }

    fn float_opt(&self, key: &str, flag: &str, default: f64) -> f64 {
        let mut value = default;
        if let Some(host) = self.host.float(&host_key(key)).filter(|v| *v != 0.0) {
            value = host;
        }
        if let Some(text) = self.cli_value(flag) {
            value = text.trim().parse::<f64>().unwrap_or(0.0);
        }
        value
    }

    fn toggle(&self, key: &str, flag: &str, default: bool) -> bool {
        let mut value = default;
        if let Some(host) = self.host.int(&host_key(key)) {
            value = host != 0;
        }
        if let Some(text) = self.cli_value(flag) {
            value = matches!(text.trim(), "true" | "1" | "");
        }
        value
    }

    fn text_opt(&self, key: &str, flag: &str, default: &str) -> String {
        let mut value = default.to_string();
        if let Some(host) = self.host.text(&host_key(key)).filter(|v| !v.trim().is_empty()) {
            value = host;
        }
        if let Some(text) = self.cli_value(flag).filter(|v| !v.trim().is_empty()) {
            value = text.to_string();
        }
        value
    }

    fn host_int(&self, key: &str) -> Option<i64> {
        self.host.int(&host_key(key)).filter(|v| *v != 0)
    }

    fn cli_value(&self, flag: &str) -> Option<&str> {
        self.cli.get(&format!("{CLI_FLAG_PREFIX}{flag}"))
    }

    fn cli_port(&self, flag: &str) -> Option<u64> {
        self.cli
            .get(flag)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|port| *port != 0)
    }
}

/// A file name that stays inside the log directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.contains(['/', '\\']) && name != "." && name != ".."
}

fn host_key(key: &str) -> String {
    format!("{HOST_KEY_PREFIX}{key}")
}

/// Machine name from the environment, trimmed and lowercased.
fn machine_name() -> Option<String> {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|name| name.trim().to_lowercase())
        .find(|name| !name.is_empty())
}
