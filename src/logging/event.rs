//! Event categories and the 26-bit category mask
//!
//! Every category owns one bit and one letter (`a` = bit 0 .. `z` = bit 25).
//! Letters are only used at the configuration boundary; in memory the mask
//! is a plain bit set.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

macro_rules! event_kinds {
    ($($variant:ident => $bit:literal, $letter:literal, $name:literal;)+) => {
        /// A single event category.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum EventKind {
            $(
                #[doc = concat!("`", $name, "` (letter `", $letter, "`)")]
                $variant = 1 << $bit,
            )+
        }

        impl EventKind {
            /// All categories in bit order.
            pub const ALL: [EventKind; 26] = [$(Self::$variant),+];

            /// Namespaced display name, e.g. `player.hit`.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Lowercase letter used in letter-encoded masks.
            pub fn letter(&self) -> char {
                match self {
                    $(Self::$variant => $letter,)+
                }
            }
        }
    };
}

event_kinds! {
    SystemGame => 0, 'a', "system.game";
    SystemWorld => 1, 'b', "system.world";
    SystemMission => 2, 'c', "system.mission";
    AdminActivity => 3, 'd', "admin.activity";
    PlayerActivity => 4, 'e', "player.activity";
    PlayerSession => 5, 'f', "player.session";
    PlayerChat => 6, 'g', "player.chat";
    PlayerHit => 7, 'h', "player.hit";
    PlayerKill => 8, 'i', "player.kill";
    CreatureHit => 9, 'j', "creature.hit";
    CreatureKill => 10, 'k', "creature.kill";
    TransportHit => 11, 'l', "transport.hit";
    TransportKill => 12, 'm', "transport.kill";
    BuildingHit => 13, 'n', "building.hit";
    BuildingKill => 14, 'o', "building.kill";
    EntityHit => 15, 'p', "entity.hit";
    EntityKill => 16, 'q', "entity.kill";
    ActionStart => 17, 'r', "action.start";
    ActionEnd => 18, 's', "action.end";
    EventIn => 19, 't', "event.in";
    EventOut => 20, 'u', "event.out";
    TriggerIn => 21, 'v', "trigger.in";
    TriggerOut => 22, 'w', "trigger.out";
    InventoryIn => 23, 'x', "inventory.in";
    InventoryOut => 24, 'y', "inventory.out";
    Explosive => 25, 'z', "explosive";
}

impl EventKind {
    /// The category's bit value.
    pub const fn bit(self) -> u32 {
        self as u32
    }

    /// Resolve a raw value that must be exactly one category bit.
    pub fn from_bit(bit: u32) -> Option<Self> {
        if bit == 0 || bit >= EventMask::MAX || !bit.is_power_of_two() {
            return None;
        }
        Self::ALL.get(bit.trailing_zeros() as usize).copied()
    }

    /// Resolve a letter (either case) to its category.
    pub fn from_letter(letter: char) -> Option<Self> {
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        let index = (letter.to_ascii_lowercase() as u8 - b'a') as usize;
        Self::ALL.get(index).copied()
    }

    /// Display name for a raw value; anything that is not a single
    /// category bit renders as `none`.
    pub fn name_of(bit: u32) -> &'static str {
        Self::from_bit(bit).map_or("none", |kind| kind.name())
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of enabled event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventMask(u32);

impl EventMask {
    /// Raw value with all 26 category bits set.
    pub const MAX: u32 = (1 << 26) - 1;

    /// No categories.
    pub const NONE: EventMask = EventMask(0);

    /// Every category.
    pub const ALL: EventMask = EventMask(Self::MAX);

    /// Player session, activity, chat, hit and kill.
    pub const PLAYER: EventMask = EventMask::of(&[
        EventKind::PlayerSession,
        EventKind::PlayerActivity,
        EventKind::PlayerChat,
        EventKind::PlayerHit,
        EventKind::PlayerKill,
    ]);

    /// Hits on any victim type.
    pub const HIT: EventMask = EventMask::of(&[
        EventKind::PlayerHit,
        EventKind::CreatureHit,
        EventKind::TransportHit,
        EventKind::BuildingHit,
        EventKind::EntityHit,
    ]);

    /// Kills of any victim type.
    pub const KILL: EventMask = EventMask::of(&[
        EventKind::PlayerKill,
        EventKind::CreatureKill,
        EventKind::TransportKill,
        EventKind::BuildingKill,
        EventKind::EntityKill,
    ]);

    /// Any hit or kill.
    pub const DAMAGE: EventMask = EventMask(Self::HIT.0 | Self::KILL.0);

    /// Build a mask from a list of categories.
    pub const fn of(kinds: &[EventKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Raw bit value.
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Clamp a raw integer (configuration or command line) into a mask.
    ///
    /// `-1` enables everything; other values at or below zero disable
    /// everything and values at or above [`EventMask::MAX`] saturate.
    pub fn from_raw(value: i64) -> Self {
        if value == -1 {
            return Self::ALL;
        }
        if value <= 0 {
            return Self::NONE;
        }
        if value >= i64::from(Self::MAX) {
            return Self::ALL;
        }
        Self(value as u32)
    }

    /// Parse letter notation such as `"ABKqz"`.
    ///
    /// Case is ignored and anything outside `a`-`z` is skipped.
    pub fn from_letters(letters: &str) -> Self {
        let bits = letters
            .chars()
            .filter_map(EventKind::from_letter)
            .fold(0, |acc, kind| acc | kind.bit());
        Self(bits)
    }

    /// Parse a mask written either as letters or as an integer.
    ///
    /// Text containing any ASCII letter is read as letters, otherwise as
    /// an integer passed through [`EventMask::from_raw`]. Unparseable
    /// numbers count as zero.
    pub fn parse(text: &str) -> Self {
        if text.chars().any(|c| c.is_ascii_alphabetic()) {
            return Self::from_letters(text);
        }
        Self::from_raw(text.trim().parse::<i64>().unwrap_or(0))
    }

    /// Uppercase letter notation of this mask.
    pub fn to_letters(&self) -> String {
        EventKind::ALL
            .iter()
            .filter(|kind| self.contains(**kind))
            .map(|kind| kind.letter().to_ascii_uppercase())
            .collect()
    }

    /// Check whether `kind` is part of this mask.
    pub fn contains(&self, kind: EventKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Check whether any category of `other` is part of this mask.
    pub fn intersects(&self, other: EventMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Check a raw value against this mask.
    ///
    /// Only a single valid category bit can be enabled; `0`, composites and
    /// anything at or above [`EventMask::MAX`] are rejected.
    pub fn is_enabled(&self, bit: u32) -> bool {
        EventKind::from_bit(bit).is_some_and(|kind| self.contains(kind))
    }

    /// Check whether the mask is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl From<EventKind> for EventMask {
    fn from(kind: EventKind) -> Self {
        Self(kind.bit())
    }
}

impl BitOr for EventMask {
    type Output = EventMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<EventKind> for EventMask {
    type Output = EventMask;

    fn bitor(self, rhs: EventKind) -> Self::Output {
        Self(self.0 | rhs.bit())
    }
}

impl BitOrAssign<EventKind> for EventMask {
    fn bitor_assign(&mut self, rhs: EventKind) {
        self.0 |= rhs.bit();
    }
}

impl fmt::Display for EventMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:07x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_table_is_contiguous() {
        for (index, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.bit(), 1 << index);
            assert_eq!(kind.letter(), (b'a' + index as u8) as char);
        }
        assert_eq!(EventKind::Explosive.bit(), 1 << 25);
    }

    #[test]
    fn test_from_letters_mixed_case() {
        let mask = EventMask::from_letters("aBz");
        assert_eq!(mask.bits(), (1 << 0) | (1 << 1) | (1 << 25));
    }

    #[test]
    fn test_from_letters_ignores_non_letters() {
        let mask = EventMask::from_letters(" a-1,b!\tZ ");
        assert_eq!(mask, EventMask::from_letters("abz"));
        assert!(mask.bits() <= EventMask::MAX);
    }

    #[test]
    fn test_from_letters_empty() {
        assert_eq!(EventMask::from_letters(""), EventMask::NONE);
        assert_eq!(EventMask::from_letters("123"), EventMask::NONE);
    }

    #[test]
    fn test_all_letters_is_max() {
        let mask = EventMask::from_letters("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(mask, EventMask::ALL);
        assert_eq!(mask.to_letters(), "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    }

    #[test]
    fn test_from_raw_clamping() {
        assert_eq!(EventMask::from_raw(-1), EventMask::ALL);
        assert_eq!(EventMask::from_raw(-5), EventMask::NONE);
        assert_eq!(EventMask::from_raw(0), EventMask::NONE);
        assert_eq!(EventMask::from_raw(129).bits(), 129);
        assert_eq!(EventMask::from_raw(i64::from(EventMask::MAX)), EventMask::ALL);
        assert_eq!(EventMask::from_raw(1 << 40), EventMask::ALL);
    }

    #[test]
    fn test_parse_letters_or_number() {
        assert_eq!(EventMask::parse("hi"), EventMask::from_letters("HI"));
        assert_eq!(EventMask::parse("384").bits(), 384);
        assert_eq!(EventMask::parse("-1"), EventMask::ALL);
        assert_eq!(EventMask::parse(""), EventMask::NONE);
    }

    #[test]
    fn test_is_enabled_requires_single_bit() {
        let mask = EventMask::ALL;
        assert!(mask.is_enabled(EventKind::PlayerHit.bit()));
        assert!(!mask.is_enabled(0));
        assert!(!mask.is_enabled(EventMask::MAX));
        assert!(!mask.is_enabled(EventMask::MAX + 1));
        assert!(!mask.is_enabled(EventKind::PlayerHit.bit() | EventKind::PlayerKill.bit()));
    }

    #[test]
    fn test_is_enabled_checks_mask() {
        let mask = EventMask::from(EventKind::PlayerChat);
        assert!(mask.is_enabled(EventKind::PlayerChat.bit()));
        assert!(!mask.is_enabled(EventKind::PlayerSession.bit()));
    }

    #[test]
    fn test_names() {
        assert_eq!(EventKind::PlayerHit.name(), "player.hit");
        assert_eq!(EventKind::SystemGame.to_string(), "system.game");
        assert_eq!(EventKind::Explosive.name(), "explosive");
        assert_eq!(EventKind::name_of(0), "none");
        assert_eq!(EventKind::name_of(EventMask::MAX), "none");
        assert_eq!(EventKind::name_of(EventMask::MAX + 1), "none");
        assert_eq!(EventKind::name_of(1 << 6), "player.chat");
    }

    #[test]
    fn test_composite_masks() {
        assert!(EventMask::HIT.contains(EventKind::TransportHit));
        assert!(!EventMask::HIT.contains(EventKind::TransportKill));
        assert!(EventMask::KILL.contains(EventKind::EntityKill));
        assert_eq!(EventMask::DAMAGE, EventMask::HIT | EventMask::KILL);
        assert!(EventMask::PLAYER.contains(EventKind::PlayerChat));
        assert!(!EventMask::PLAYER.contains(EventKind::CreatureHit));
        assert_eq!(EventMask::PLAYER.to_letters(), "EFGHI");
    }

    #[test]
    fn test_from_letter() {
        assert_eq!(EventKind::from_letter('Q'), Some(EventKind::EntityKill));
        assert_eq!(EventKind::from_letter('1'), None);
        assert_eq!(EventKind::from_letter('é'), None);
    }
}
