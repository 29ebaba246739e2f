// Clash judgment: who wins a single rock-paper-scissors exchange.
//
// `judge` is total over the 3x3 input space and has no side effects. The
// result is a `Clash`, which names the attacking seat for a decisive clash
// and is `Draw` otherwise, so the resolver never has to handle a missing
// attacker.

use serde::{Deserialize, Serialize};

use crate::types::{MoveKey, Outcome, Seat};

/// Result of comparing the two hands of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Clash {
    Decisive { attacker: Seat },
    Draw,
}

impl Clash {
    /// Per-seat outcomes, `(first, second)`.
    pub fn outcomes(self) -> (Outcome, Outcome) {
        match self {
            Clash::Decisive {
                attacker: Seat::First,
            } => (Outcome::Win, Outcome::Lose),
            Clash::Decisive {
                attacker: Seat::Second,
            } => (Outcome::Lose, Outcome::Win),
            Clash::Draw => (Outcome::Draw, Outcome::Draw),
        }
    }

    pub fn outcome_for(self, seat: Seat) -> Outcome {
        let (first, second) = self.outcomes();
        match seat {
            Seat::First => first,
            Seat::Second => second,
        }
    }
}

/// Judge the first seat's hand against the second seat's hand.
pub fn judge(first: MoveKey, second: MoveKey) -> Clash {
    if first == second {
        Clash::Draw
    } else if first.beats() == second {
        Clash::Decisive {
            attacker: Seat::First,
        }
    } else {
        Clash::Decisive {
            attacker: Seat::Second,
        }
    }
}
