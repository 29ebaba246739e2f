// Data-driven battle configuration.
//
// `BattleConfig` holds the creature template every roster is built from and
// the number of creatures per roster. The relay loads it from a JSON file at
// startup (`--config`) or falls back to `BattleConfig::default()`, which is
// two stock dragons.
//
// Both players in a session always share the relay's config, so there is no
// per-client negotiation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::creature::CreatureTemplate;
use crate::error::ConfigError;
use crate::types::MoveKey;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub template: CreatureTemplate,
    pub roster_size: usize,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            template: CreatureTemplate::dragon(),
            roster_size: 2,
        }
    }
}

impl BattleConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BattleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// A usable config has at least one creature per roster, a creature with
    /// hp, and a move for every hand.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roster_size == 0 {
            return Err(ConfigError::Invalid("roster_size must be at least 1".into()));
        }
        if self.template.max_hp == 0 {
            return Err(ConfigError::Invalid("template max_hp must be positive".into()));
        }
        if let Some(missing) = MoveKey::ALL
            .into_iter()
            .find(|k| !self.template.moves.contains_key(k))
        {
            return Err(ConfigError::Invalid(format!(
                "template has no move for {missing}"
            )));
        }
        Ok(())
    }
}
