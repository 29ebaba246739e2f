// duel_arena_battle — battle rules for Duel Arena.
//
// Pure game logic with no networking: the relay crate owns sessions and
// connections and calls into this crate to mutate battle state.
//
// Module overview:
// - `types.rs`:     `MoveKey` (rock/scissors/paper), `Outcome`, `Seat`.
// - `creature.rs`:  `CreatureTemplate` and the independent `Creature`
//                   instances built from it.
// - `combatant.rs`: One player's roster, active creature, and pending hand.
// - `judge.rs`:     `judge()` — the rock-paper-scissors comparison.
// - `resolver.rs`:  `resolve_turn()` — damage, fainting, auto-swap, reports.
// - `config.rs`:    `BattleConfig`, loaded from JSON.
// - `error.rs`:     `BattleError`, `ConfigError`.

pub mod combatant;
pub mod config;
pub mod creature;
pub mod error;
pub mod judge;
pub mod resolver;
pub mod types;

pub use combatant::Combatant;
pub use config::BattleConfig;
pub use creature::{Creature, CreatureTemplate, Move};
pub use error::{BattleError, ConfigError};
pub use judge::{Clash, judge};
pub use resolver::{Faint, TurnReport, TurnResolution, resolve_turn};
pub use types::{MoveKey, Outcome, Seat};
