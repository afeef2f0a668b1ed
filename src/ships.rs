// Ship classes and the research formulas that turn an investment into a
// ship design.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::state::Ship;

pub const BASE_HEALTH: i64 = 50;
pub const BASE_LEVEL: i64 = 1;
pub const BASE_PRICE: i64 = 100;
pub const MIN_PRICE: i64 = 50;
pub const BASE_FUEL_CAPACITY: i64 = 100;
pub const BASE_FUEL_EFFICIENCY: f64 = 1.0;
/// Price reduction per development point.
pub const PRICE_PER_DEV_POINT: i64 = 50;

/// The three buildable ship classes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShipClass {
    #[serde(alias = "Explorite")]
    Explorer,
    Enforcer,
    Pioneer,
}

impl ShipClass {
    pub const ALL: [ShipClass; 3] = [ShipClass::Explorer, ShipClass::Enforcer, ShipClass::Pioneer];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipClass::Explorer => "Explorer",
            ShipClass::Enforcer => "Enforcer",
            ShipClass::Pioneer => "Pioneer",
        }
    }
}

impl fmt::Display for ShipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown ship class: {0}")]
pub struct UnknownShipClass(pub String);

impl FromStr for ShipClass {
    type Err = UnknownShipClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Explorer" | "Explorite" => Ok(ShipClass::Explorer),
            "Enforcer" => Ok(ShipClass::Enforcer),
            "Pioneer" => Ok(ShipClass::Pioneer),
            other => Err(UnknownShipClass(other.to_string())),
        }
    }
}

/// Inputs of a research project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Investment {
    pub star_coins: u64,
    pub dev_points: u64,
}

/// Price after development points, never below [`MIN_PRICE`].
pub fn research_price(dev_points: u64) -> i64 {
    let discount = i64::try_from(dev_points)
        .unwrap_or(i64::MAX)
        .saturating_mul(PRICE_PER_DEV_POINT);
    BASE_PRICE.saturating_sub(discount).max(MIN_PRICE)
}

fn scaled(coins: u64, divisor: u64) -> i64 {
    i64::try_from(coins / divisor).unwrap_or(i64::MAX)
}

/// Derive a new ship design. Deterministic in its inputs.
pub fn derive_ship(class: ShipClass, name: &str, investment: Investment) -> Ship {
    let coins = investment.star_coins;
    let mut ship = Ship {
        name: name.to_string(),
        class,
        health: BASE_HEALTH,
        description: String::new(),
        personnel_limit: 0,
        personnel_minimum: 0,
        cargo_limit: 0,
        fuel_capacity: BASE_FUEL_CAPACITY,
        fuel_efficiency: BASE_FUEL_EFFICIENCY,
        level: BASE_LEVEL,
        damage: 0,
        price: research_price(investment.dev_points),
        amount: 0,
    };

    match class {
        ShipClass::Explorer => {
            ship.fuel_capacity = ship.fuel_capacity.saturating_add(scaled(coins, 10));
            ship.fuel_efficiency += coins as f64 / 100.0;
        }
        ShipClass::Enforcer => {
            ship.damage = ship.damage.saturating_add(scaled(coins, 10));
        }
        ShipClass::Pioneer => {
            ship.personnel_limit = ship.personnel_limit.saturating_add(scaled(coins, 10));
            ship.fuel_capacity = ship.fuel_capacity.saturating_add(scaled(coins, 20));
            ship.fuel_efficiency += coins as f64 / 200.0;
        }
    }

    ship
}
