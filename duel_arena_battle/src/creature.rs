// Creature templates and battle instances.
//
// A `CreatureTemplate` is the shared, immutable description loaded from the
// battle config. Each player gets their own `Creature` instances built from
// it at join time via `instantiate`, which produces a fully owned copy: the
// move set is cloned, so damage dealt to one instance can never show up on
// another instance or on the template.
//
// Hit points and the active flag are the only fields that change during a
// battle, and only `combatant.rs` / `resolver.rs` mutate them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::MoveKey;

/// A named attack and its damage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub name: String,
    pub power: u32,
}

/// Blueprint a roster is built from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureTemplate {
    pub name: String,
    pub max_hp: u32,
    pub moves: BTreeMap<MoveKey, Move>,
}

impl CreatureTemplate {
    /// Build an independent creature at full health.
    pub fn instantiate(&self, is_active: bool) -> Creature {
        Creature {
            name: self.name.clone(),
            hp: self.max_hp,
            max_hp: self.max_hp,
            moves: self.moves.clone(),
            is_active,
        }
    }

    /// The stock dragon every roster starts with.
    pub fn dragon() -> Self {
        let moves = BTreeMap::from([
            (
                MoveKey::Rock,
                Move {
                    name: "Fire Punch".into(),
                    power: 20,
                },
            ),
            (
                MoveKey::Scissors,
                Move {
                    name: "Dragon Claw".into(),
                    power: 15,
                },
            ),
            (
                MoveKey::Paper,
                Move {
                    name: "Breath".into(),
                    power: 25,
                },
            ),
        ]);
        Self {
            name: "Dragon".into(),
            max_hp: 100,
            moves,
        }
    }
}

/// A creature in a player's roster. Also the roster snapshot format sent to
/// clients after each turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub moves: BTreeMap<MoveKey, Move>,
    pub is_active: bool,
}

impl Creature {
    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    pub fn move_for(&self, key: MoveKey) -> Option<&Move> {
        self.moves.get(&key)
    }

    /// Subtract `amount` from hp, stopping at zero. Returns the damage
    /// actually absorbed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }
}
