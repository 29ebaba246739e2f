// Core value types for the battle rules.
//
// `MoveKey` is the closed set of hands a player can throw. It doubles as the
// key into a creature's move set, so the hand a player picks also selects
// which attack their active creature uses when they win the clash.
//
// `Outcome` is one player's view of a clash. `Seat` identifies a side of a
// duel by join order; the first player to join a passcode sits in `First`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BattleError;

/// One of the three hands. Rock beats scissors, scissors beats paper, paper
/// beats rock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKey {
    Rock,
    Scissors,
    Paper,
}

impl MoveKey {
    pub const ALL: [MoveKey; 3] = [MoveKey::Rock, MoveKey::Scissors, MoveKey::Paper];

    /// The hand this one defeats.
    pub fn beats(self) -> MoveKey {
        match self {
            MoveKey::Rock => MoveKey::Scissors,
            MoveKey::Scissors => MoveKey::Paper,
            MoveKey::Paper => MoveKey::Rock,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MoveKey::Rock => "rock",
            MoveKey::Scissors => "scissors",
            MoveKey::Paper => "paper",
        }
    }
}

impl fmt::Display for MoveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveKey {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rock" => Ok(MoveKey::Rock),
            "scissors" => Ok(MoveKey::Scissors),
            "paper" => Ok(MoveKey::Paper),
            other => Err(BattleError::InvalidMove(other.to_string())),
        }
    }
}

/// A single player's result for one clash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
    Draw,
}

/// Side of a duel, by join order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    /// Position in a two-element array indexed by seat.
    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }
}
