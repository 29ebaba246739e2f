// Passcode → session map and the dispatcher for inbound player actions.
//
// The server's event loop owns exactly one `SessionRegistry` for the life of
// the process and funnels every client action through `handle`, one at a
// time. That single owner is what serializes all state changes for a given
// passcode; sessions themselves hold no locks.
//
// Sessions are created on first join and deleted the moment their last
// participant leaves. A connection may be seated in several sessions at
// once, each with its own roster, and `remove` takes it out of all of them.
//
// Refusals: a refused join is reported to the joiner with `Rejected`. Every
// other refused action (unknown passcode, non-member, invalid hand, no bench,
// battle over) is logged and otherwise ignored.

use std::collections::BTreeMap;

use duel_arena_battle::{BattleConfig, BattleError, MoveKey, Seat};
use duel_arena_protocol::{ClientMessage, ConnectionId, ServerMessage};
use tracing::{debug, info, warn};

use crate::error::ActionError;
use crate::gateway::Gateway;
use crate::session::Session;

pub struct SessionRegistry {
    config: BattleConfig,
    sessions: BTreeMap<String, Session>,
}

impl SessionRegistry {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            config,
            sessions: BTreeMap::new(),
        }
    }

    pub fn session(&self, passcode: &str) -> Option<&Session> {
        self.sessions.get(passcode)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of participants currently in `passcode`'s session (0 if none).
    pub fn session_len(&self, passcode: &str) -> usize {
        self.sessions.get(passcode).map_or(0, Session::len)
    }

    /// Dispatch one inbound action from `conn`. Never fails: refusals are
    /// logged here.
    pub fn handle(
        &mut self,
        conn: ConnectionId,
        message: ClientMessage,
        gateway: &mut dyn Gateway,
    ) {
        let result = match message {
            ClientMessage::Join { passcode } => self.join(conn, &passcode, gateway).map(|_| ()),
            ClientMessage::Swap { passcode } => self.swap(conn, &passcode).map(|_| ()),
            ClientMessage::Hand { passcode, hand } => {
                self.submit_hand(conn, &passcode, &hand, gateway).map(|_| ())
            }
            ClientMessage::Goodbye => {
                self.remove(conn, gateway);
                Ok(())
            }
        };
        match result {
            Ok(()) => {}
            Err(e @ ActionError::Battle(BattleError::InvalidMove(_))) => {
                warn!(%conn, error = %e, "ignoring action");
            }
            Err(e) => debug!(%conn, error = %e, "ignoring action"),
        }
    }

    /// Seat `conn` in the session for `passcode`, creating it if needed. A
    /// refused join is answered with `Rejected`.
    pub fn join(
        &mut self,
        conn: ConnectionId,
        passcode: &str,
        gateway: &mut dyn Gateway,
    ) -> Result<Seat, ActionError> {
        let session = self
            .sessions
            .entry(passcode.to_string())
            .or_insert_with(|| Session::new(passcode));
        let result = session.join(conn, &self.config, gateway);
        if let Err(e) = &result {
            info!(%conn, passcode, reason = %e, "join rejected");
            gateway.deliver(
                conn,
                &ServerMessage::Rejected {
                    reason: e.to_string(),
                },
            );
        }
        result
    }

    pub fn swap(&mut self, conn: ConnectionId, passcode: &str) -> Result<usize, ActionError> {
        self.session_mut(passcode)?.swap(conn)
    }

    /// Validate and record a hand. Returns whether it completed a turn.
    pub fn submit_hand(
        &mut self,
        conn: ConnectionId,
        passcode: &str,
        hand: &str,
        gateway: &mut dyn Gateway,
    ) -> Result<bool, ActionError> {
        let hand: MoveKey = hand.parse()?;
        self.session_mut(passcode)?.submit_hand(conn, hand, gateway)
    }

    /// Remove `conn` from every session and delete sessions left empty.
    /// Safe to call repeatedly. Returns how many sessions `conn` was in.
    pub fn remove(&mut self, conn: ConnectionId, gateway: &mut dyn Gateway) -> usize {
        let mut left = 0;
        for session in self.sessions.values_mut() {
            if session.remove(conn, gateway) {
                left += 1;
            }
        }
        self.sessions.retain(|passcode, session| {
            let keep = !session.is_empty();
            if !keep {
                info!(passcode = %passcode, "session closed");
            }
            keep
        });
        left
    }

    fn session_mut(&mut self, passcode: &str) -> Result<&mut Session, ActionError> {
        self.sessions
            .get_mut(passcode)
            .ok_or_else(|| ActionError::UnknownSession(passcode.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use duel_arena_battle::Outcome;

    use super::*;
    use crate::gateway::RecordingGateway;
    use crate::session::Phase;

    const A: ConnectionId = ConnectionId(0);
    const B: ConnectionId = ConnectionId(1);
    const C: ConnectionId = ConnectionId(2);

    fn registry() -> SessionRegistry {
        SessionRegistry::new(BattleConfig::default())
    }

    fn join(
        reg: &mut SessionRegistry,
        conn: ConnectionId,
        passcode: &str,
        gw: &mut RecordingGateway,
    ) {
        reg.handle(
            conn,
            ClientMessage::Join {
                passcode: passcode.into(),
            },
            gw,
        );
    }

    fn hand(
        reg: &mut SessionRegistry,
        conn: ConnectionId,
        passcode: &str,
        hand: &str,
        gw: &mut RecordingGateway,
    ) {
        reg.handle(
            conn,
            ClientMessage::Hand {
                passcode: passcode.into(),
                hand: hand.into(),
            },
            gw,
        );
    }

    fn active_hp(reg: &SessionRegistry, passcode: &str, conn: ConnectionId) -> u32 {
        reg.session(passcode)
            .and_then(|s| s.participant(conn))
            .map(|p| p.combatant.active().hp)
            .unwrap()
    }

    #[test]
    fn first_join_creates_session() {
        let mut reg = registry();
        let mut gw = RecordingGateway::default();
        join(&mut reg, A, "1234", &mut gw);

        assert_eq!(reg.session_count(), 1);
        assert_eq!(reg.session_len("1234"), 1);
        assert_eq!(reg.session("1234").unwrap().phase(), Phase::Waiting);
        assert!(gw.sent.is_empty());
    }

    #[test]
    fn passcodes_pair_independently() {
        let mut reg = registry();
        let mut gw = RecordingGateway::default();
        join(&mut reg, A, "red", &mut gw);
        join(&mut reg, C, "blue", &mut gw);
        assert!(gw.sent.is_empty());

        join(&mut reg, B, "red", &mut gw);
        assert_eq!(gw.to(A), vec![&ServerMessage::Matched]);
        assert_eq!(gw.to(B), vec![&ServerMessage::Matched]);
        assert!(gw.to(C).is_empty());
        assert_eq!(reg.session_count(), 2);
    }

    #[test]
    fn third_join_gets_rejected_message() {
        let mut reg = registry();
        let mut gw = RecordingGateway::default();
        join(&mut reg, A, "1234", &mut gw);
        join(&mut reg, B, "1234", &mut gw);
        join(&mut reg, C, "1234", &mut gw);

        assert_eq!(
            gw.to(C),
            vec![&ServerMessage::Rejected {
                reason: "session is full".into()
            }]
        );
        assert_eq!(reg.session_len("1234"), 2);
        // A and B saw exactly one Matched each.
        assert_eq!(gw.to(A), vec![&ServerMessage::Matched]);
    }

    #[test]
    fn actions_on_unknown_passcode_are_noops() {
        let mut reg = registry();
        let mut gw = RecordingGateway::default();
        assert_eq!(
            reg.swap(A, "nope"),
            Err(ActionError::UnknownSession("nope".into()))
        );
        assert_eq!(
            reg.submit_hand(A, "nope", "rock", &mut gw),
            Err(ActionError::UnknownSession("nope".into()))
        );
        reg.handle(A, ClientMessage::Swap { passcode: "nope".into() }, &mut gw);
        assert_eq!(reg.session_count(), 0);
        assert!(gw.sent.is_empty());
    }

    #[test]
    fn invalid_hand_is_not_recorded() {
        let mut reg = registry();
        let mut gw = RecordingGateway::default();
        join(&mut reg, A, "1234", &mut gw);
        join(&mut reg, B, "1234", &mut gw);
        gw.clear();

        assert_eq!(
            reg.submit_hand(A, "1234", "lizard", &mut gw),
            Err(ActionError::Battle(BattleError::InvalidMove("lizard".into())))
        );
        hand(&mut reg, B, "1234", "rock", &mut gw);
        let session = reg.session("1234").unwrap();
        assert_eq!(session.participant(A).unwrap().combatant.pending(), None);
        assert!(gw.sent.is_empty());
    }

    #[test]
    fn full_turn_through_handle() {
        let mut reg = registry();
        let mut gw = RecordingGateway::default();
        join(&mut reg, A, "1234", &mut gw);
        join(&mut reg, B, "1234", &mut gw);
        gw.clear();

        hand(&mut reg, A, "1234", "rock", &mut gw);
        assert!(gw.sent.is_empty());
        hand(&mut reg, B, "1234", "scissors", &mut gw);

        assert_eq!(active_hp(&reg, "1234", B), 80);
        assert_eq!(gw.sent.len(), 2);
        assert!(matches!(
            gw.to(A)[0],
            ServerMessage::TurnResult {
                outcome: Outcome::Win,
                ..
            }
        ));
    }

    #[test]
    fn swap_through_handle() {
        let mut reg = registry();
        let mut gw = RecordingGateway::default();
        join(&mut reg, A, "1234", &mut gw);
        reg.handle(A, ClientMessage::Swap { passcode: "1234".into() }, &mut gw);
        let session = reg.session("1234").unwrap();
        assert_eq!(session.participant(A).unwrap().combatant.active_index(), 1);
    }

    #[test]
    fn leaving_shrinks_then_deletes() {
        let mut reg = registry();
        let mut gw = RecordingGateway::default();
        join(&mut reg, A, "1234", &mut gw);
        join(&mut reg, B, "1234", &mut gw);

        assert_eq!(reg.remove(A, &mut gw), 1);
        assert_eq!(reg.session_len("1234"), 1);
        assert_eq!(reg.session_count(), 1);

        assert_eq!(reg.remove(A, &mut gw), 0);
        assert_eq!(reg.session_len("1234"), 1);

        reg.handle(B, ClientMessage::Goodbye, &mut gw);
        assert_eq!(reg.session_count(), 0);
        assert_eq!(reg.session_len("1234"), 0);
    }

    #[test]
    fn join_after_opponent_left_rematches() {
        let mut reg = registry();
        let mut gw = RecordingGateway::default();
        join(&mut reg, A, "p", &mut gw);
        join(&mut reg, B, "p", &mut gw);
        reg.remove(A, &mut gw);
        assert_eq!(reg.session_len("p"), 1);
        gw.clear();

        assert_eq!(
            reg.join(C, "p", &mut gw),
            Ok(Seat::Second)
        );
        assert_eq!(gw.to(C), vec![&ServerMessage::Matched]);
        assert_eq!(gw.to(B), vec![&ServerMessage::Matched]);
        assert_eq!(reg.session("p").unwrap().phase(), Phase::Battling);
    }

    #[test]
    fn remove_covers_every_session() {
        let mut reg = registry();
        let mut gw = RecordingGateway::default();
        join(&mut reg, A, "one", &mut gw);
        join(&mut reg, A, "two", &mut gw);
        join(&mut reg, B, "two", &mut gw);

        assert_eq!(reg.remove(A, &mut gw), 2);
        assert!(reg.session("one").is_none());
        assert_eq!(reg.session_len("two"), 1);
        assert!(reg.session("two").unwrap().contains(B));
    }

    #[test]
    fn config_shapes_rosters() {
        let config = BattleConfig {
            roster_size: 3,
            ..BattleConfig::default()
        };
        let mut reg = SessionRegistry::new(config);
        let mut gw = RecordingGateway::default();
        join(&mut reg, A, "big", &mut gw);
        let session = reg.session("big").unwrap();
        assert_eq!(session.participant(A).unwrap().combatant.roster().len(), 3);
    }
}
