// Game rules that change the world state. Every operation checks its
// preconditions first, so a failed call leaves the state untouched.

use thiserror::Error;
use tracing::info;

use crate::ships::{derive_ship, Investment, ShipClass};
use crate::state::{GameState, Ship};

/// Minerals consumed per infrastructure unit built.
pub const BUILD_MINERAL_COST: i64 = 10;
/// Minerals recovered per infrastructure unit destroyed.
pub const DESTROY_MINERAL_REFUND: i64 = 5;

#[derive(Debug, Error, PartialEq)]
pub enum WorldError {
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(i64),
    #[error("not enough minerals: need {needed}, have {available}")]
    NotEnoughMinerals { needed: i64, available: i64 },
    #[error("no infrastructure named '{0}'")]
    UnknownInfrastructure(String),
    #[error("cannot destroy {requested} {kind}: only {available} built")]
    NotEnoughInfrastructure {
        kind: String,
        requested: i64,
        available: i64,
    },
    #[error("unknown setting '{0}' (expected TaxRate or Happiness)")]
    UnknownSetting(String),
    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("no researched {0} design to construct")]
    NoDesign(ShipClass),
    #[error("not enough StarCoins: need {needed}, have {available}")]
    NotEnoughStarCoins { needed: i64, available: i64 },
}

/// Settings the `set` command can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    TaxRate,
    Happiness,
}

impl Setting {
    pub fn parse(key: &str) -> Result<Self, WorldError> {
        match key.to_ascii_lowercase().as_str() {
            "taxrate" => Ok(Setting::TaxRate),
            "happiness" => Ok(Setting::Happiness),
            _ => Err(WorldError::UnknownSetting(key.to_string())),
        }
    }
}

/// Research a new ship design and append it to its class list.
pub fn research<'a>(
    state: &'a mut GameState,
    class: ShipClass,
    name: &str,
    investment: Investment,
) -> &'a Ship {
    let ship = derive_ship(class, name, investment);
    info!(class = %class, name, price = ship.price, "researched ship design");
    let designs = state.ships.entry(class.as_str().to_string()).or_default();
    designs.push(ship);
    &designs[designs.len() - 1]
}

fn check_amount(amount: i64) -> Result<(), WorldError> {
    if amount <= 0 {
        return Err(WorldError::NonPositiveAmount(amount));
    }
    Ok(())
}

/// Build `amount` units of an infrastructure type, paying minerals.
pub fn build(state: &mut GameState, kind: &str, amount: i64) -> Result<i64, WorldError> {
    check_amount(amount)?;
    let needed = amount.saturating_mul(BUILD_MINERAL_COST);
    if needed > state.minerals {
        return Err(WorldError::NotEnoughMinerals {
            needed,
            available: state.minerals,
        });
    }
    state.minerals -= needed;
    let count = state.infrastructure.entry(kind.to_string()).or_insert(0);
    *count = count.saturating_add(amount);
    info!(kind, amount, total = *count, "built infrastructure");
    Ok(*count)
}

/// Destroy `amount` units, refunding part of the minerals. The entry is
/// dropped once nothing of that type is left.
pub fn destroy(state: &mut GameState, kind: &str, amount: i64) -> Result<i64, WorldError> {
    check_amount(amount)?;
    let available = *state
        .infrastructure
        .get(kind)
        .ok_or_else(|| WorldError::UnknownInfrastructure(kind.to_string()))?;
    if amount > available {
        return Err(WorldError::NotEnoughInfrastructure {
            kind: kind.to_string(),
            requested: amount,
            available,
        });
    }
    let remaining = available - amount;
    if remaining <= 0 {
        state.infrastructure.remove(kind);
    } else {
        state.infrastructure.insert(kind.to_string(), remaining);
    }
    state.minerals = state
        .minerals
        .saturating_add(amount.saturating_mul(DESTROY_MINERAL_REFUND));
    info!(kind, amount, remaining, "destroyed infrastructure");
    Ok(remaining)
}

pub fn set(state: &mut GameState, setting: Setting, value: f64) -> Result<(), WorldError> {
    let (key, max) = match setting {
        Setting::TaxRate => ("TaxRate", 1.0),
        Setting::Happiness => ("Happiness", 100.0),
    };
    if !(0.0..=max).contains(&value) {
        return Err(WorldError::OutOfRange {
            key,
            min: 0.0,
            max,
            value,
        });
    }
    match setting {
        Setting::TaxRate => state.tax_rate = value,
        Setting::Happiness => state.happiness = value,
    }
    info!(key, value, "updated setting");
    Ok(())
}

/// Construct `amount` ships from the most recent design of `class`.
pub fn construct(
    state: &mut GameState,
    class: ShipClass,
    amount: i64,
) -> Result<&Ship, WorldError> {
    check_amount(amount)?;
    let available = state.star_coins;
    let design = state
        .ships
        .get_mut(class.as_str())
        .and_then(|designs| designs.last_mut())
        .ok_or(WorldError::NoDesign(class))?;
    let needed = design.price.max(0).saturating_mul(amount);
    if needed > available {
        return Err(WorldError::NotEnoughStarCoins { needed, available });
    }
    design.amount = design.amount.saturating_add(amount);
    state.star_coins = available.saturating_sub(needed);
    info!(class = %class, name = %design.name, amount, cost = needed, "constructed ships");
    Ok(design)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rich_state() -> GameState {
        GameState {
            minerals: 100,
            star_coins: 500,
            ..GameState::default()
        }
    }

    #[test]
    fn build_consumes_minerals() {
        let mut state = rich_state();
        assert_eq!(build(&mut state, "farm", 3), Ok(3));
        assert_eq!(build(&mut state, "farm", 2), Ok(5));
        assert_eq!(state.minerals, 50);
        assert_eq!(state.infrastructure["farm"], 5);
    }

    #[test]
    fn build_without_minerals_changes_nothing() {
        let mut state = rich_state();
        let before = state.clone();
        assert_eq!(
            build(&mut state, "mine", 11),
            Err(WorldError::NotEnoughMinerals {
                needed: 110,
                available: 100
            })
        );
        assert_eq!(state, before);
        assert_eq!(build(&mut state, "mine", 0), Err(WorldError::NonPositiveAmount(0)));
        assert_eq!(build(&mut state, "mine", -3), Err(WorldError::NonPositiveAmount(-3)));
    }

    #[test]
    fn negative_minerals_block_building() {
        let mut state = GameState {
            minerals: -5,
            ..GameState::default()
        };
        assert_eq!(
            build(&mut state, "farm", 1),
            Err(WorldError::NotEnoughMinerals {
                needed: 10,
                available: -5
            })
        );
        assert_eq!(state.minerals, -5);
    }

    #[test]
    fn destroy_refunds_and_removes_empty_entries() {
        let mut state = rich_state();
        build(&mut state, "farm", 4).unwrap();
        assert_eq!(destroy(&mut state, "farm", 1), Ok(3));
        assert_eq!(state.minerals, 65);
        assert_eq!(destroy(&mut state, "farm", 3), Ok(0));
        assert!(!state.infrastructure.contains_key("farm"));
    }

    #[test]
    fn destroy_rejects_overdraw() {
        let mut state = rich_state();
        build(&mut state, "farm", 2).unwrap();
        let before = state.clone();
        assert!(matches!(
            destroy(&mut state, "farm", 3),
            Err(WorldError::NotEnoughInfrastructure { available: 2, .. })
        ));
        assert_eq!(
            destroy(&mut state, "silo", 1),
            Err(WorldError::UnknownInfrastructure("silo".into()))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn set_validates_range() {
        let mut state = rich_state();
        set(&mut state, Setting::parse("taxrate").unwrap(), 0.25).unwrap();
        assert_eq!(state.tax_rate, 0.25);
        assert!(set(&mut state, Setting::TaxRate, 1.5).is_err());
        assert_eq!(state.tax_rate, 0.25);
        set(&mut state, Setting::Happiness, 75.0).unwrap();
        assert_eq!(state.happiness, 75.0);
        assert!(Setting::parse("gravity").is_err());
    }

    #[test]
    fn research_appends_in_order() {
        let mut state = rich_state();
        let invest = Investment {
            star_coins: 100,
            dev_points: 1,
        };
        research(&mut state, ShipClass::Enforcer, "First", invest);
        research(&mut state, ShipClass::Enforcer, "Second", invest);
        let names: Vec<_> = state.ships["Enforcer"].iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
        // research is funded separately from the treasury
        assert_eq!(state.star_coins, 500);
    }

    #[test]
    fn construct_uses_latest_design() {
        let mut state = rich_state();
        research(&mut state, ShipClass::Pioneer, "Old", Investment::default());
        research(
            &mut state,
            ShipClass::Pioneer,
            "New",
            Investment {
                star_coins: 0,
                dev_points: 1,
            },
        );
        let ship = construct(&mut state, ShipClass::Pioneer, 3).unwrap();
        assert_eq!(ship.name, "New");
        assert_eq!(ship.amount, 3);
        assert_eq!(state.star_coins, 350);
        assert_eq!(state.ships["Pioneer"][0].amount, 0);
    }

    #[test]
    fn construct_finds_designs_from_legacy_saves() {
        let text = r#"{"starCoins": 1000, "ships": {"Explorite": [
            {"name": "Drift", "Class": "Explorite", "Health": 50, "Level": 1, "Price": 100}
        ]}}"#;
        let mut state = GameState::from_json(text).unwrap();
        let ship = construct(&mut state, ShipClass::Explorer, 1).unwrap();
        assert_eq!(ship.name, "Drift");
        assert_eq!(ship.amount, 1);
        assert_eq!(state.star_coins, 900);
    }

    #[test]
    fn construct_requires_design_and_funds() {
        let mut state = rich_state();
        assert_eq!(
            construct(&mut state, ShipClass::Explorer, 1).unwrap_err(),
            WorldError::NoDesign(ShipClass::Explorer)
        );
        research(&mut state, ShipClass::Explorer, "Scout", Investment::default());
        let before = state.clone();
        assert_eq!(
            construct(&mut state, ShipClass::Explorer, 6).unwrap_err(),
            WorldError::NotEnoughStarCoins {
                needed: 600,
                available: 500
            }
        );
        assert_eq!(state, before);
    }
}
