use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named arm positions, in cycling order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetHeight {
    Ground,
    Low,
    CargoLoad,
    CargoShip,
    RocketMid,
    RocketHigh,
}

impl TargetHeight {
    pub const ALL: [TargetHeight; 6] = [
        TargetHeight::Ground,
        TargetHeight::Low,
        TargetHeight::CargoLoad,
        TargetHeight::CargoShip,
        TargetHeight::RocketMid,
        TargetHeight::RocketHigh,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TargetHeight::Ground => "GROUND",
            TargetHeight::Low => "LOW",
            TargetHeight::CargoLoad => "CARGO_LOAD",
            TargetHeight::CargoShip => "CARGO_SHIP",
            TargetHeight::RocketMid => "ROCKET_MID",
            TargetHeight::RocketHigh => "ROCKET_HIGH",
        }
    }

    fn ordinal(self) -> usize {
        self as usize
    }

    /// Next preset, wrapping from the last back to the first.
    pub fn next(self) -> Self {
        Self::ALL[(self.ordinal() + 1) % Self::ALL.len()]
    }

    /// Previous preset, wrapping from the first to the last.
    pub fn previous(self) -> Self {
        Self::ALL[(self.ordinal() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for TargetHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, PartialEq, Clone)]
#[error("unknown target height: {0:?}")]
pub struct UnknownTargetHeight(pub String);

impl FromStr for TargetHeight {
    type Err = UnknownTargetHeight;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Self::ALL.iter()
            .copied()
            .find(|h| h.name() == wanted)
            .ok_or_else(|| UnknownTargetHeight(s.to_owned()))
    }
}

pub fn default_preset_positions() -> BTreeMap<TargetHeight, f64> {
    BTreeMap::from([
        (TargetHeight::Ground, 0.0),
        (TargetHeight::Low, 350.0),
        (TargetHeight::CargoLoad, 1100.0),
        (TargetHeight::CargoShip, 1650.0),
        (TargetHeight::RocketMid, 2300.0),
        (TargetHeight::RocketHigh, 2950.0),
    ])
}

/// Immutable preset → encoder position table, fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightPresetRegistry {
    positions: [f64; TargetHeight::ALL.len()],
}

impl HeightPresetRegistry {
    /// Presets missing from `positions` fall back to the built-in table.
    pub fn new(positions: &BTreeMap<TargetHeight, f64>) -> Self {
        let defaults = default_preset_positions();
        let mut table = [0.0; TargetHeight::ALL.len()];
        for height in TargetHeight::ALL {
            table[height.ordinal()] = match positions.get(&height) {
                Some(position) => *position,
                None => {
                    let fallback = defaults.get(&height).copied().unwrap_or(0.0);
                    warn!("No position configured for {height}, using {fallback}");
                    fallback
                }
            };
        }
        Self { positions: table }
    }

    pub fn position(&self, height: TargetHeight) -> f64 {
        self.positions[height.ordinal()]
    }
}

impl Default for HeightPresetRegistry {
    fn default() -> Self {
        Self::new(&default_preset_positions())
    }
}
