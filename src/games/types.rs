//! Outcome book schema
//!
//! A book is a pre-authored outcome: a payout multiplier plus the ordered
//! presentation events the client replays. Books are pure data.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Basis points per whole multiplier unit
pub const MULTIPLIER_SCALE: u64 = 10_000;

/// Non-negative payout multiplier held in basis points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Multiplier(u64);

impl Multiplier {
    pub const ZERO: Multiplier = Multiplier(0);

    /// Convert a decimal multiplier, rejecting negative and non-finite values
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let scaled = (value * MULTIPLIER_SCALE as f64).round();
        if scaled > u64::MAX as f64 {
            return None;
        }
        Some(Self(scaled as u64))
    }

    pub fn basis_points(&self) -> u64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / MULTIPLIER_SCALE as f64
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Scale a bet by this multiplier, rounding half up to the nearest minor unit.
    /// Returns `None` if the payout does not fit in `u64`.
    pub fn apply(&self, bet: u64) -> Option<u64> {
        let scaled = bet as u128 * self.0 as u128 + (MULTIPLIER_SCALE / 2) as u128;
        u64::try_from(scaled / MULTIPLIER_SCALE as u128).ok()
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f64())
    }
}

impl Serialize for Multiplier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Multiplier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Multiplier::from_f64(value).ok_or_else(|| {
            de::Error::custom(format!("multiplier must be finite and non-negative, got {}", value))
        })
    }
}

/// Pre-authored outcome record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: u64,
    pub payout_multiplier: Multiplier,
    pub events: Vec<IndexedEvent>,
    /// Classification tag; informational only
    #[serde(default)]
    pub criteria: String,
    #[serde(default)]
    pub base_game_wins: Multiplier,
    #[serde(default)]
    pub free_game_wins: Multiplier,
}

impl Book {
    /// A book settles at round close iff it triggers the free-spin feature
    pub fn is_bonus(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e.event, Event::FreeSpinTrigger { .. }))
    }

    /// Total granted free spins across trigger events
    pub fn free_spins_awarded(&self) -> u32 {
        self.events
            .iter()
            .filter_map(|e| match &e.event {
                Event::FreeSpinTrigger { total_fs, .. } => Some(*total_fs),
                _ => None,
            })
            .sum()
    }

    pub fn reveal_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.event, Event::Reveal { .. }))
            .count()
    }
}

/// Event with its position in the book's timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedEvent {
    pub index: u32,
    #[serde(flatten)]
    pub event: Event,
}

/// Whether a reveal belongs to the base game or the free-spin feature
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Basegame,
    Freegame,
}

/// Presentation event, discriminated by `type` on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    #[serde(rename_all = "camelCase")]
    Reveal {
        board: Vec<Vec<Symbol>>,
        #[serde(default)]
        padding_positions: Vec<u32>,
        game_type: GameType,
        #[serde(default)]
        anticipation: Vec<u32>,
    },
    #[serde(rename_all = "camelCase")]
    WinInfo { total_win: u64, wins: Vec<WinLine> },
    #[serde(rename_all = "camelCase")]
    SetWin {
        amount: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        win_level: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    SetTotalWin { amount: u64 },
    #[serde(rename_all = "camelCase")]
    FinalWin { amount: u64 },
    #[serde(rename_all = "camelCase")]
    FreeSpinTrigger {
        total_fs: u32,
        #[serde(default)]
        positions: Vec<Position>,
    },
    #[serde(rename_all = "camelCase")]
    UpdateFreeSpin { amount: u32, total: u32 },
    #[serde(rename_all = "camelCase")]
    FreeSpinEnd {
        amount: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        win_level: Option<u32>,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Reveal { .. } => "reveal",
            Event::WinInfo { .. } => "winInfo",
            Event::SetWin { .. } => "setWin",
            Event::SetTotalWin { .. } => "setTotalWin",
            Event::FinalWin { .. } => "finalWin",
            Event::FreeSpinTrigger { .. } => "freeSpinTrigger",
            Event::UpdateFreeSpin { .. } => "updateFreeSpin",
            Event::FreeSpinEnd { .. } => "freeSpinEnd",
        }
    }
}

/// One board cell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wild: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scatter: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    pub reel: u32,
    pub row: u32,
}

/// Detected win on the most recent reveal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WinLine {
    pub symbol: String,
    pub kind: u32,
    pub win: u64,
    pub positions: Vec<Position>,
    /// Scoring metadata; line-pays and ways-pays payloads differ here
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub meta: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_multiplier_rounds_half_up() {
        let m = Multiplier::from_f64(1.7).unwrap();
        assert_eq!(m.apply(1_000_000), Some(1_700_000));

        let m = Multiplier::from_f64(32.3).unwrap();
        assert_eq!(m.apply(1_000_000), Some(32_300_000));

        // 0.5 * 3 = 1.5 -> 2
        let m = Multiplier::from_f64(0.5).unwrap();
        assert_eq!(m.apply(3), Some(2));
        // 0.1 * 4 = 0.4 -> 0
        let m = Multiplier::from_f64(0.1).unwrap();
        assert_eq!(m.apply(4), Some(0));
    }

    #[test]
    fn test_multiplier_rejects_invalid() {
        assert!(Multiplier::from_f64(-0.1).is_none());
        assert!(Multiplier::from_f64(f64::NAN).is_none());
        assert!(Multiplier::from_f64(f64::INFINITY).is_none());
        assert!(serde_json::from_value::<Multiplier>(json!(-2.0)).is_err());
    }

    #[test]
    fn test_multiplier_overflow() {
        let m = Multiplier::from_f64(10.0).unwrap();
        assert_eq!(m.apply(u64::MAX), None);
    }

    #[test]
    fn test_event_wire_format() {
        let raw = json!({
            "index": 2,
            "type": "freeSpinTrigger",
            "totalFs": 10,
            "positions": [{"reel": 0, "row": 1}, {"reel": 2, "row": 0}]
        });
        let event: IndexedEvent = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(event.index, 2);
        assert_eq!(event.event.kind(), "freeSpinTrigger");
        assert_eq!(serde_json::to_value(&event).unwrap(), raw);
    }

    #[test]
    fn test_bonus_detection_ignores_criteria() {
        let book: Book = serde_json::from_value(json!({
            "id": 7,
            "payoutMultiplier": 0.0,
            "criteria": "freegame",
            "events": [
                {"index": 0, "type": "setTotalWin", "amount": 0},
                {"index": 1, "type": "finalWin", "amount": 0}
            ]
        }))
        .unwrap();
        assert!(!book.is_bonus());
        assert_eq!(book.free_spins_awarded(), 0);
    }
}
