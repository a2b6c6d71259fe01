//! Caller-side event filters
//!
//! Hook points consult these before building a record, so that noisy
//! sources (low-damage hits, creature suicides, item spawns, automatic
//! fire) never reach the logger.

use crate::config::{FiltersSection, Settings, ThresholdsSection, ThrottlingSection};
use std::collections::HashMap;

/// Direction of an inventory transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InventoryDirection {
    /// Item entered an inventory
    Input,
    /// Item left an inventory
    Output,
}

/// Filters built from the resolved settings
#[derive(Debug, Clone)]
pub struct EventPolicy {
    filters: FiltersSection,
    thresholds: ThresholdsSection,
    throttle: FireThrottle,
}

impl EventPolicy {
    /// Create a policy from explicit sections
    pub fn new(
        filters: FiltersSection,
        thresholds: ThresholdsSection,
        throttling: ThrottlingSection,
    ) -> Self {
        Self {
            filters,
            thresholds,
            throttle: FireThrottle::new(throttling.weapon_fire_ms.max(0) as u64),
        }
    }

    /// Create a policy from resolved settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.filters, settings.thresholds, settings.throttling)
    }

    /// Check whether a hit of `damage` is worth logging.
    ///
    /// Vehicle hits must pass both thresholds.
    pub fn allow_hit(&self, damage: f64, from_vehicle: bool) -> bool {
        if damage < self.thresholds.hit_damage {
            return false;
        }
        !(from_vehicle && damage < self.thresholds.hit_damage_vehicle)
    }

    /// Check whether a death is worth logging.
    pub fn allow_kill(&self, is_suicide: bool, victim_is_player: bool) -> bool {
        !(is_suicide && self.filters.only_player_suicide && !victim_is_player)
    }

    /// Check whether an inventory transfer is worth logging.
    pub fn allow_inventory(&self, direction: InventoryDirection, parent_is_player: bool) -> bool {
        let only_player = match direction {
            InventoryDirection::Input => self.filters.only_player_inventory_input,
            InventoryDirection::Output => self.filters.only_player_inventory_output,
        };
        parent_is_player || !only_player
    }

    /// Check whether a shot from `source` at `now_ms` is worth logging.
    pub fn allow_fire(&mut self, source: u64, now_ms: u64) -> bool {
        self.throttle.allow(source, now_ms)
    }

    /// Weapon fire throttle
    pub fn throttle(&self) -> &FireThrottle {
        &self.throttle
    }
}

impl Default for EventPolicy {
    fn default() -> Self {
        Self::new(
            FiltersSection::default(),
            ThresholdsSection::default(),
            ThrottlingSection::default(),
        )
    }
}

/// Per-source minimum interval between accepted events
#[derive(Debug, Clone, Default)]
pub struct FireThrottle {
    interval_ms: u64,
    last_accepted: HashMap<u64, u64>,
}

impl FireThrottle {
    /// Create a throttle with the given window
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_accepted: HashMap::new(),
        }
    }

    /// Accept the event unless `source` had one accepted inside the window.
    pub fn allow(&mut self, source: u64, now_ms: u64) -> bool {
        if let Some(&last) = self.last_accepted.get(&source) {
            if now_ms.saturating_sub(last) < self.interval_ms {
                return false;
            }
        }
        self.last_accepted.insert(source, now_ms);
        true
    }

    /// Stop tracking a source (e.g. a despawned weapon)
    pub fn forget(&mut self, source: u64) {
        self.last_accepted.remove(&source);
    }

    /// Throttle window in milliseconds
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Number of tracked sources
    pub fn tracked(&self) -> usize {
        self.last_accepted.len()
    }
}
