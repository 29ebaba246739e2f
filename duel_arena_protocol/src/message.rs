// Protocol messages for client-relay communication.
//
// - `ClientMessage`: actions a player sends to the relay (join, swap, hand,
//   goodbye). A closed connection is treated the same as `Goodbye`.
// - `ServerMessage`: notifications the relay sends back (matched, turn
//   results, rejection, end of battle, opponent departure).
//
// `Hand` carries the move as a plain string rather than `MoveKey`. An
// unknown move must reach the session as an invalid-move no-op; typing it
// as an enum would instead fail JSON decoding of the whole frame, which the
// relay treats as a disconnect.

use duel_arena_battle::{Creature, MoveKey, Outcome, TurnReport};
use serde::{Deserialize, Serialize};

/// Messages sent by a client to the relay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Enter the session for `passcode`, creating it if needed.
    Join { passcode: String },
    /// Switch the active creature.
    Swap { passcode: String },
    /// Submit this turn's hand: "rock", "scissors" or "paper".
    Hand { passcode: String, hand: String },
    /// Leaving; the relay drops the connection from every session.
    Goodbye,
}

/// Messages sent by the relay to a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// The session now has two players; the battle can begin.
    Matched,
    /// A join was refused.
    Rejected { reason: String },
    /// Result of a turn from the receiving player's perspective.
    TurnResult {
        your_hand: MoveKey,
        opponent_hand: MoveKey,
        outcome: Outcome,
        your_roster: Vec<Creature>,
        opponent_roster: Vec<Creature>,
    },
    /// One side's whole roster is down. Sent after the final `TurnResult`.
    BattleOver { outcome: Outcome },
    /// The opponent left the session.
    OpponentLeft,
}

impl From<TurnReport> for ServerMessage {
    fn from(report: TurnReport) -> Self {
        ServerMessage::TurnResult {
            your_hand: report.your_hand,
            opponent_hand: report.opponent_hand,
            outcome: report.outcome,
            your_roster: report.your_roster,
            opponent_roster: report.opponent_roster,
        }
    }
}
