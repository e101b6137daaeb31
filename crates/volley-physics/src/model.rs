//! Court state: slots, ball, score, paddle directions.
//!
//! These types are shared with the wire protocol, so their serde shape is
//! what clients see.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// One of the two player positions in a match.
///
/// Slot one defends the left wall, slot two the right wall. On the wire a
/// slot is the plain number `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    /// Both slots, in order.
    pub const ALL: [Slot; 2] = [Slot::One, Slot::Two];

    /// Index into two-element per-slot arrays.
    pub fn index(self) -> usize {
        match self {
            Slot::One => 0,
            Slot::Two => 1,
        }
    }

    /// The opposing slot.
    pub fn other(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        match slot {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }
}

impl TryFrom<u8> for Slot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            other => Err(format!("slot must be 1 or 2, got {other}")),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot{}", u8::from(*self))
    }
}

// ---------------------------------------------------------------------------
// Ball
// ---------------------------------------------------------------------------

/// Ball position and per-tick velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// Points per slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub slot1: u32,
    pub slot2: u32,
}

impl Score {
    pub fn new(slot1: u32, slot2: u32) -> Self {
        Self { slot1, slot2 }
    }

    /// Points held by `slot`.
    pub fn get(&self, slot: Slot) -> u32 {
        match slot {
            Slot::One => self.slot1,
            Slot::Two => self.slot2,
        }
    }

    /// Awards one point to `slot`.
    pub fn increment(&mut self, slot: Slot) {
        match slot {
            Slot::One => self.slot1 += 1,
            Slot::Two => self.slot2 += 1,
        }
    }

    /// The slot that has reached `win_score`, if any.
    pub fn winner(&self, win_score: u32) -> Option<Slot> {
        Slot::ALL.into_iter().find(|s| self.get(*s) >= win_score)
    }

    /// Forfeit score: `winner` gets `win_score`, the other slot gets zero.
    pub fn walkover(winner: Slot, win_score: u32) -> Self {
        match winner {
            Slot::One => Self::new(win_score, 0),
            Slot::Two => Self::new(0, win_score),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.slot1, self.slot2)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Paddle move direction. `Up` moves toward `y = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&Slot::One).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Slot::Two).unwrap(), "2");
    }

    #[test]
    fn test_slot_rejects_out_of_range_number() {
        let result: Result<Slot, _> = serde_json::from_str("3");
        assert!(result.is_err());
    }

    #[test]
    fn test_slot_other_flips() {
        assert_eq!(Slot::One.other(), Slot::Two);
        assert_eq!(Slot::Two.other(), Slot::One);
    }

    #[test]
    fn test_score_json_shape() {
        let json = serde_json::to_value(Score::new(3, 1)).unwrap();
        assert_eq!(json["slot1"], 3);
        assert_eq!(json["slot2"], 1);
    }

    #[test]
    fn test_score_winner_requires_win_score() {
        assert_eq!(Score::new(4, 4).winner(5), None);
        assert_eq!(Score::new(4, 5).winner(5), Some(Slot::Two));
        assert_eq!(Score::new(5, 2).winner(5), Some(Slot::One));
    }

    #[test]
    fn test_score_walkover_zeroes_loser() {
        assert_eq!(Score::walkover(Slot::Two, 5), Score::new(0, 5));
        assert_eq!(Score::walkover(Slot::One, 7), Score::new(7, 0));
    }

    #[test]
    fn test_direction_is_lowercase_on_the_wire() {
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"up\"");
        let d: Direction = serde_json::from_str("\"down\"").unwrap();
        assert_eq!(d, Direction::Down);
    }
}
