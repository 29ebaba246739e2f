// duel_arena_relay — passcode matchmaking and battle relay for Duel Arena.
//
// Players connect over TCP, join a session by passcode, and once two players
// share a passcode they battle: each turn both submit a hand, the relay
// resolves it with `duel_arena_battle`, and each player receives the result
// from their own perspective.
//
// Module overview:
// - `session.rs`:  One passcode's participants and battle phase. Joins,
//                  swaps, hand submission, turn resolution, departures.
// - `registry.rs`: `SessionRegistry` — passcode → `Session`, inbound action
//                  dispatch, cleanup of empty sessions.
// - `gateway.rs`:  `Gateway` trait for outbound notifications and the
//                  `TcpGateway` that writes them to sockets.
// - `server.rs`:   TCP listener, reader threads, and the single event loop
//                  that owns the registry.
// - `client.rs`:   `NetClient`, a blocking-socket client with a background
//                  reader thread.
// - `error.rs`:    `ActionError`, `RelayError`, `ClientError`.
//
// The relay runs as a standalone binary (`main.rs`) or embedded via
// `start_relay`.

pub mod client;
pub mod error;
pub mod gateway;
pub mod registry;
pub mod server;
pub mod session;

pub use server::{RelayConfig, RelayHandle, start_relay};
