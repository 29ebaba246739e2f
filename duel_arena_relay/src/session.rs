// State for one passcode: up to two participants and their battle.
//
// `Session` is driven by `SessionRegistry`, which in turn is driven by the
// server's single event loop, so every mutation of a session is serialized
// and no internal locking is needed.
//
// Lifecycle:
// - `Waiting`: one participant. Hands may already be submitted but nothing
//   resolves until an opponent arrives.
// - `Battling`: entered when the second participant joins. Both
//   participants receive `Matched`. Every hand submission attempts a
//   resolution; when both hands are in, both players get a `TurnResult`.
// - `Finished`: one side's roster is fully down (both get `BattleOver`).
//   Swaps and hands are ignored until someone leaves.
//
// When a participant leaves while an opponent is still seated, the opponent
// gets `OpponentLeft`, their roster is restored to full health, and the
// session drops back to `Waiting`. The next joiner starts a fresh battle and
// both players get `Matched` again. Capacity is the only limit on joining:
// a third participant is always refused. The registry deletes a session as
// soon as its last participant leaves.

use duel_arena_battle::{BattleConfig, Combatant, MoveKey, Outcome, Seat, resolve_turn};
use duel_arena_protocol::{ConnectionId, ServerMessage};
use tracing::{debug, info};

use crate::error::ActionError;
use crate::gateway::Gateway;

pub const SESSION_CAPACITY: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Battling,
    Finished,
}

/// A connection's seat in a session.
#[derive(Debug)]
pub struct Participant {
    pub conn: ConnectionId,
    pub combatant: Combatant,
}

#[derive(Debug)]
pub struct Session {
    passcode: String,
    participants: Vec<Participant>,
    phase: Phase,
}

impl Session {
    pub fn new(passcode: impl Into<String>) -> Self {
        Self {
            passcode: passcode.into(),
            participants: Vec::with_capacity(SESSION_CAPACITY),
            phase: Phase::Waiting,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.participants.iter().any(|p| p.conn == conn)
    }

    pub fn participant(&self, conn: ConnectionId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.conn == conn)
    }

    /// Seat `conn` with a fresh roster. The second join moves the session to
    /// `Battling` and notifies both participants.
    pub fn join(
        &mut self,
        conn: ConnectionId,
        config: &BattleConfig,
        gateway: &mut dyn Gateway,
    ) -> Result<Seat, ActionError> {
        if self.contains(conn) {
            return Err(ActionError::AlreadyJoined);
        }
        if self.participants.len() >= SESSION_CAPACITY {
            return Err(ActionError::SessionFull);
        }

        let seat = if self.participants.is_empty() {
            Seat::First
        } else {
            Seat::Second
        };
        self.participants.push(Participant {
            conn,
            combatant: Combatant::new(&config.template, config.roster_size),
        });
        info!(passcode = %self.passcode, %conn, ?seat, "joined session");

        if self.participants.len() == SESSION_CAPACITY {
            self.phase = Phase::Battling;
            info!(passcode = %self.passcode, "session matched");
            for p in &self.participants {
                gateway.deliver(p.conn, &ServerMessage::Matched);
            }
        }
        Ok(seat)
    }

    /// Switch `conn`'s active creature. Does not consume a turn.
    pub fn swap(&mut self, conn: ConnectionId) -> Result<usize, ActionError> {
        self.ensure_open()?;
        let participant = self.participant_mut(conn)?;
        let active = participant.combatant.swap()?;
        debug!(passcode = %self.passcode, %conn, active, "swapped creature");
        Ok(active)
    }

    /// Record `conn`'s hand for this turn, then resolve the turn if both
    /// hands are in. Returns whether a turn was resolved.
    pub fn submit_hand(
        &mut self,
        conn: ConnectionId,
        hand: MoveKey,
        gateway: &mut dyn Gateway,
    ) -> Result<bool, ActionError> {
        self.ensure_open()?;
        self.participant_mut(conn)?.combatant.set_pending(hand);
        debug!(passcode = %self.passcode, %conn, %hand, "hand submitted");
        Ok(self.try_resolve(gateway))
    }

    /// Drop `conn` from the session. Returns false if it was not a member.
    /// A remaining participant is told, healed, and left waiting for a new
    /// opponent.
    pub fn remove(&mut self, conn: ConnectionId, gateway: &mut dyn Gateway) -> bool {
        let Some(index) = self.participants.iter().position(|p| p.conn == conn) else {
            return false;
        };
        self.participants.remove(index);
        info!(passcode = %self.passcode, %conn, remaining = self.participants.len(), "left session");

        self.phase = Phase::Waiting;
        for p in &mut self.participants {
            p.combatant.reset();
            gateway.deliver(p.conn, &ServerMessage::OpponentLeft);
        }
        true
    }

    fn try_resolve(&mut self, gateway: &mut dyn Gateway) -> bool {
        let [first, second] = self.participants.as_mut_slice() else {
            return false;
        };
        let Some(resolution) = resolve_turn(&mut first.combatant, &mut second.combatant) else {
            return false;
        };
        debug!(
            passcode = %self.passcode,
            clash = ?resolution.clash,
            damage = resolution.damage,
            faint = ?resolution.faint,
            "turn resolved"
        );

        let conns = [first.conn, second.conn];
        let defeated = resolution.defeated;
        for (conn, report) in conns.into_iter().zip(resolution.into_reports()) {
            gateway.deliver(conn, &ServerMessage::from(report));
        }

        if let Some(loser) = defeated {
            self.phase = Phase::Finished;
            info!(passcode = %self.passcode, loser = %conns[loser.index()], "battle over");
            gateway.deliver(
                conns[loser.index()],
                &ServerMessage::BattleOver {
                    outcome: Outcome::Lose,
                },
            );
            gateway.deliver(
                conns[loser.other().index()],
                &ServerMessage::BattleOver {
                    outcome: Outcome::Win,
                },
            );
        }
        true
    }

    fn ensure_open(&self) -> Result<(), ActionError> {
        match self.phase {
            Phase::Finished => Err(ActionError::BattleOver),
            Phase::Waiting | Phase::Battling => Ok(()),
        }
    }

    fn participant_mut(&mut self, conn: ConnectionId) -> Result<&mut Participant, ActionError> {
        self.participants
            .iter_mut()
            .find(|p| p.conn == conn)
            .ok_or(ActionError::NotMember)
    }
}
