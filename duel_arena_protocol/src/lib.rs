// duel_arena_protocol — wire protocol between Duel Arena clients and the relay.
//
// Shared by the relay server, the relay's `NetClient`, and the integration
// tests.
//
// Module overview:
// - `types.rs`:    `ConnectionId`.
// - `message.rs`:  `ClientMessage` (inbound actions) and `ServerMessage`
//                  (outbound notifications).
// - `framing.rs`:  4-byte big-endian length prefix + JSON payload, over any
//                  `Read`/`Write`.
//
// Roster snapshots are `duel_arena_battle::Creature` values serialized
// as-is, so clients see exactly the fields the battle rules use.

pub mod framing;
pub mod message;
pub mod types;

pub use framing::{FrameError, MAX_FRAME_SIZE, read_frame, recv_json, send_json, write_frame};
pub use message::{ClientMessage, ServerMessage};
pub use types::ConnectionId;
