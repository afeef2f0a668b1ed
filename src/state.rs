// Persistent world state for the local game: the JSON save document and
// a small store that reads and writes it as a whole file.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::ships::ShipClass;

/// Default save location, relative to the working directory.
pub const DEFAULT_STATE_PATH: &str = "../data/game_state.json";

/// The whole save document. Every field falls back to its default when it
/// is missing from the file, so older saves without `infrastructure` or
/// `ships` still load. Counters are signed like the original save format;
/// the rules in `world` enforce their bounds.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GameState {
    pub food: i64,
    pub water: i64,
    pub minerals: i64,
    pub population: i64,
    /// Percentage in `[0, 100]`.
    pub happiness: f64,
    #[serde(rename = "researchPoints")]
    pub research_points: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub infrastructure: BTreeMap<String, i64>,
    #[serde(rename = "ticksPassed")]
    pub ticks_passed: i64,
    #[serde(rename = "starCoins")]
    pub star_coins: i64,
    #[serde(rename = "taxRate")]
    pub tax_rate: f64,
    /// Ships keyed by class name, in research order.
    #[serde(deserialize_with = "null_as_default")]
    pub ships: BTreeMap<String, Vec<Ship>>,
}

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A researched ship design plus how many units of it have been built.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Ship {
    pub name: String,
    #[serde(rename = "Class")]
    pub class: ShipClass,
    #[serde(rename = "Health", default)]
    pub health: i64,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Personnel_Limit", default)]
    pub personnel_limit: i64,
    #[serde(rename = "Personnel_Minimum", default)]
    pub personnel_minimum: i64,
    #[serde(rename = "Cargo_Limit", default)]
    pub cargo_limit: i64,
    #[serde(rename = "Fuel_Capacity", default)]
    pub fuel_capacity: i64,
    #[serde(rename = "Fuel_Efficiency", default)]
    pub fuel_efficiency: f64,
    #[serde(rename = "Level", default)]
    pub level: i64,
    #[serde(rename = "Damage", default)]
    pub damage: i64,
    #[serde(rename = "Price", default)]
    pub price: i64,
    #[serde(rename = "Amount", default)]
    pub amount: i64,
}

impl GameState {
    /// Parse a save document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut state: GameState =
            serde_json::from_str(text).context("Parsing game state json")?;
        state.merge_legacy_class_keys();
        Ok(state)
    }

    /// Move designs stored under an alias of a class name (older saves use
    /// `Explorite`) to the canonical key. Legacy designs come first since
    /// they were researched earlier.
    pub fn merge_legacy_class_keys(&mut self) {
        let legacy: Vec<(String, ShipClass)> = self
            .ships
            .keys()
            .filter_map(|key| {
                let class = key.parse::<ShipClass>().ok()?;
                (class.as_str() != key.as_str()).then(|| (key.clone(), class))
            })
            .collect();
        for (key, class) in legacy {
            let Some(mut designs) = self.ships.remove(&key) else {
                continue;
            };
            debug!(from = %key, to = %class, count = designs.len(), "merged legacy ship class key");
            let canonical = self.ships.entry(class.as_str().to_string()).or_default();
            designs.append(canonical);
            *canonical = designs;
        }
    }

    /// Serialize with two-space indentation.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Serializing game state")
    }

    /// Total number of ship designs across all classes.
    pub fn design_count(&self) -> usize {
        self.ships.values().map(Vec::len).sum()
    }
}

/// Reads and writes the save file. Loads and saves are serialized through
/// an in-process lock; nothing protects against a crash mid-write.
pub struct StateStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StateStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<GameState> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("state lock poisoned"))?;
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let state = GameState::from_json(&text)?;
        debug!(path = %self.path.display(), designs = state.design_count(), "loaded state");
        Ok(state)
    }

    pub fn save(&self, state: &GameState) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("state lock poisoned"))?;
        let text = state.to_json()?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), "saved state");
        Ok(())
    }
}
