// Test-only player client for end-to-end battle tests.
//
// Wraps the real `NetClient` (from `duel_arena_relay::client`) with a fixed
// passcode and synchronous helpers that block until a particular server
// message arrives. All networking goes through the same code paths a real
// client uses; only the blocking waits are test-specific.
//
// See also: `tests/full_pipeline.rs` for the scenarios.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use duel_arena_battle::{Creature, MoveKey, Outcome};
use duel_arena_protocol::ServerMessage;
use duel_arena_relay::client::NetClient;

/// Default timeout for blocking waits.
const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-message wait inside a blocking poll.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A `TurnResult` pulled apart for assertions.
#[derive(Clone, Debug)]
pub struct TurnView {
    pub your_hand: MoveKey,
    pub opponent_hand: MoveKey,
    pub outcome: Outcome,
    pub your_roster: Vec<Creature>,
    pub opponent_roster: Vec<Creature>,
}

impl TurnView {
    pub fn your_active(&self) -> &Creature {
        active(&self.your_roster)
    }

    pub fn opponent_active(&self) -> &Creature {
        active(&self.opponent_roster)
    }
}

fn active(roster: &[Creature]) -> &Creature {
    roster
        .iter()
        .find(|c| c.is_active)
        .expect("roster has no active creature")
}

/// A player bound to one passcode.
pub struct TestPlayer {
    client: NetClient,
    passcode: String,
}

impl TestPlayer {
    /// Connect and join `passcode`.
    pub fn join(addr: SocketAddr, passcode: &str) -> Self {
        let mut client = NetClient::connect(addr).expect("NetClient::connect failed");
        client.join(passcode).expect("join failed");
        Self {
            client,
            passcode: passcode.into(),
        }
    }

    pub fn throw(&mut self, hand: MoveKey) {
        self.throw_raw(hand.as_str());
    }

    /// Send an arbitrary hand string, including invalid ones.
    pub fn throw_raw(&mut self, hand: &str) {
        self.client
            .submit_hand(&self.passcode, hand)
            .expect("submit_hand failed");
    }

    pub fn swap(&mut self) {
        self.client.swap(&self.passcode).expect("swap failed");
    }

    /// Block until `Matched` arrives. Panics on any other message.
    pub fn wait_matched(&mut self) {
        match self.next_message() {
            ServerMessage::Matched => {}
            other => panic!("expected Matched, got {other:?}"),
        }
    }

    /// Block until the next `TurnResult`. Panics on any other message.
    pub fn wait_turn(&mut self) -> TurnView {
        match self.next_message() {
            ServerMessage::TurnResult {
                your_hand,
                opponent_hand,
                outcome,
                your_roster,
                opponent_roster,
            } => TurnView {
                your_hand,
                opponent_hand,
                outcome,
                your_roster,
                opponent_roster,
            },
            other => panic!("expected TurnResult, got {other:?}"),
        }
    }

    /// Block until the next message of any kind.
    pub fn next_message(&mut self) -> ServerMessage {
        let start = Instant::now();
        loop {
            assert!(
                start.elapsed() < POLL_TIMEOUT,
                "timed out waiting for a server message"
            );
            if let Some(msg) = self.client.recv_timeout(POLL_INTERVAL) {
                return msg;
            }
        }
    }

    /// Everything received within `window`.
    pub fn collect_for(&mut self, window: Duration) -> Vec<ServerMessage> {
        std::thread::sleep(window);
        self.client.poll()
    }

    /// Send Goodbye.
    pub fn leave(&mut self) {
        self.client.disconnect();
    }
}

/// Both players throw, then both wait for their turn results.
pub fn play_turn(
    a: &mut TestPlayer,
    a_hand: MoveKey,
    b: &mut TestPlayer,
    b_hand: MoveKey,
) -> (TurnView, TurnView) {
    a.throw(a_hand);
    b.throw(b_hand);
    (a.wait_turn(), b.wait_turn())
}
