//! Settings document type definitions.
//!
//! The document is stored as JSON. Every section falls back to its compiled
//! defaults for missing keys, and [`ConfigDocument::normalize`] clamps
//! numeric values into their accepted ranges.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Version stamped into saved documents.
pub const CONFIG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default events mask: every category except `n` (building.hit) and `r`
/// (action.start).
pub const DEFAULT_EVENTS_MASK: &str = "ABCDEFGHIJKLMOPQSTUVWXYZ";

/// Root settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    /// Document version. Rewritten on load when it differs.
    pub version: String,

    /// General settings.
    pub settings: SettingsSection,

    /// File output and rotation.
    pub file: FileSection,

    /// Caller-side event filters.
    pub filters: FiltersSection,

    /// Anti-spam throttling.
    pub throttling: ThrottlingSection,

    /// Damage thresholds for hit events.
    pub thresholds: ThresholdsSection,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            settings: SettingsSection::default(),
            file: FileSection::default(),
            filters: FiltersSection::default(),
            throttling: ThrottlingSection::default(),
            thresholds: ThresholdsSection::default(),
        }
    }
}

impl ConfigDocument {
    /// Clamp every section into its valid ranges.
    pub fn normalize(&mut self) {
        self.file.normalize();
        self.throttling.normalize();
        self.thresholds.normalize();
    }

    /// Check whether the document was written by this version.
    pub fn is_current(&self) -> bool {
        self.version == CONFIG_VERSION
    }
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsSection {
    /// Instance id override; empty means detect it from the host.
    pub instance_id: String,

    /// Host name override; empty means read it from the environment.
    pub host_name: String,

    /// Minimum severity (`trace`, `debug`, `info`, `warn`, `error`,
    /// `fatal`, `off`; first letter or number also accepted).
    pub level: String,

    /// Category letters (`"ABKqz"`) or integer bitmask text (`"-1"` = all).
    pub events_mask: String,

    /// Disable the startup telemetry beacon.
    pub disable_telemetry: bool,
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            instance_id: String::new(),
            host_name: String::new(),
            level: "info".to_string(),
            events_mask: DEFAULT_EVENTS_MASK.to_string(),
            disable_telemetry: false,
        }
    }
}

/// File output and rotation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSection {
    /// File name without extension; empty means `eventlog_<instance>`.
    pub file_name: String,

    /// Append to the active file instead of truncating it on start.
    pub append: bool,

    /// Generations kept by rotation; 0 or 1 disables rotation.
    pub rotation_keep: i64,

    /// Lines buffered before a flush; 0 writes every line directly.
    pub buffer_size: i64,

    /// Seconds pending lines may wait before a flush.
    pub flush_interval: i64,
}

impl FileSection {
    /// Accepted range for `rotation_keep`.
    pub const ROTATION_KEEP_RANGE: (i64, i64) = (0, 100);
    /// Accepted range for `buffer_size`.
    pub const BUFFER_SIZE_RANGE: (i64, i64) = (0, 10_000);
    /// Accepted range for `flush_interval`.
    pub const FLUSH_INTERVAL_RANGE: (i64, i64) = (1, 3_600);

    /// Clamp values into their accepted ranges.
    pub fn normalize(&mut self) {
        self.rotation_keep =
            clamp_int("file.rotation_keep", self.rotation_keep, Self::ROTATION_KEEP_RANGE);
        self.buffer_size =
            clamp_int("file.buffer_size", self.buffer_size, Self::BUFFER_SIZE_RANGE);
        self.flush_interval =
            clamp_int("file.flush_interval", self.flush_interval, Self::FLUSH_INTERVAL_RANGE);
    }
}

impl Default for FileSection {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            append: false,
            rotation_keep: 5,
            buffer_size: 32,
            flush_interval: 5,
        }
    }
}

/// Caller-side event filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersSection {
    /// Log `inventory.in` only when the item's new parent is a player.
    pub only_player_inventory_input: bool,

    /// Log `inventory.out` only when the item's old parent is a player.
    pub only_player_inventory_output: bool,

    /// Log suicides (killer is the victim) only for players.
    pub only_player_suicide: bool,
}

impl Default for FiltersSection {
    fn default() -> Self {
        Self {
            only_player_inventory_input: true,
            only_player_inventory_output: false,
            only_player_suicide: true,
        }
    }
}

/// Throttling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottlingSection {
    /// Minimum milliseconds between two logged shots of one weapon.
    pub weapon_fire_ms: i64,
}

impl ThrottlingSection {
    /// Accepted range for `weapon_fire_ms`.
    pub const WEAPON_FIRE_RANGE: (i64, i64) = (50, 5_000);

    /// Clamp values into their accepted ranges.
    pub fn normalize(&mut self) {
        self.weapon_fire_ms =
            clamp_int("throttling.weapon_fire_ms", self.weapon_fire_ms, Self::WEAPON_FIRE_RANGE);
    }
}

impl Default for ThrottlingSection {
    fn default() -> Self {
        Self {
            weapon_fire_ms: 250,
        }
    }
}

/// Damage thresholds for hit events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsSection {
    /// Minimum damage for a hit to be logged; -1 disables the threshold.
    pub hit_damage: f64,

    /// Minimum damage for a vehicle hit; -1 disables the threshold.
    pub hit_damage_vehicle: f64,
}

impl ThresholdsSection {
    /// Accepted range for both thresholds.
    pub const DAMAGE_RANGE: (f64, f64) = (-1.0, 1_000.0);

    /// Clamp values into their accepted ranges.
    pub fn normalize(&mut self) {
        self.hit_damage = clamp_float("thresholds.hit_damage", self.hit_damage);
        self.hit_damage_vehicle =
            clamp_float("thresholds.hit_damage_vehicle", self.hit_damage_vehicle);
    }
}

impl Default for ThresholdsSection {
    fn default() -> Self {
        Self {
            hit_damage: 3.0,
            hit_damage_vehicle: 15.0,
        }
    }
}

/// Clamp an integer option, noting the adjustment.
fn clamp_int(field: &str, value: i64, (min, max): (i64, i64)) -> i64 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        debug!(field, value, clamped, "Clamped configuration value");
    }
    clamped
}

fn clamp_float(field: &str, value: f64) -> f64 {
    let (min, max) = ThresholdsSection::DAMAGE_RANGE;
    let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
    if clamped != value {
        debug!(field, value, clamped, "Clamped configuration value");
    }
    clamped
}
