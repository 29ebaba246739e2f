// Error types for the relay.
//
// `ActionError` covers every way a player action can be refused. The registry
// logs these and, apart from join refusals, never tells the sender: a refused
// swap or hand is a silent no-op.

use std::io;

use duel_arena_battle::{BattleError, ConfigError};
use duel_arena_protocol::FrameError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("no session for passcode {0:?}")]
    UnknownSession(String),

    #[error("session is full")]
    SessionFull,

    #[error("already joined")]
    AlreadyJoined,

    #[error("not a member of this session")]
    NotMember,

    #[error("battle is over")]
    BattleOver,

    #[error(transparent)]
    Battle(#[from] BattleError),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to bind {addr}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to relay")]
    Connect(#[source] io::Error),

    #[error("failed to send to relay")]
    Send(#[from] FrameError),
}
