use crate::ship::ShipDef;

pub const BOARD_SIZE: u8 = 8;
pub const NUM_SHIPS: usize = 3;
pub const SHIPS: [ShipDef; NUM_SHIPS] = [
    ShipDef::new("Battleship", 4),
    ShipDef::new("Cruiser", 3),
    ShipDef::new("Destroyer", 2),
];

/// Total number of ship segments; landing this many hits wins the game.
pub const TOTAL_SHIP_CELLS: usize = 4 + 3 + 2;

/// Whether guesses must alternate between the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum TurnPolicy {
    /// Host fires first, then each fresh guess hands the turn over.
    #[default]
    Alternating,
    /// Either side may fire at any time.
    Free,
}

impl core::str::FromStr for TurnPolicy {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("alternating") {
            Ok(TurnPolicy::Alternating)
        } else if s.eq_ignore_ascii_case("free") {
            Ok(TurnPolicy::Free)
        } else {
            Err("expected `alternating` or `free`")
        }
    }
}

/// Runtime knobs for a session and its node driver.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default, deny_unknown_fields))]
pub struct SessionConfig {
    pub turn_policy: TurnPolicy,
    /// How long an unanswered guess may stay outstanding before it is resent.
    pub guess_timeout_ms: u64,
    /// Resends allowed before an unanswered guess is abandoned.
    pub guess_retries: u8,
    /// Period of the node's poll tick.
    pub tick_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            turn_policy: TurnPolicy::Alternating,
            guess_timeout_ms: 3_000,
            guess_retries: 1,
            tick_ms: 20,
        }
    }
}

#[cfg(feature = "std")]
impl SessionConfig {
    /// Defaults overridden by `BATTLESHIP_TURNS`, `BATTLESHIP_GUESS_TIMEOUT_MS`
    /// and `BATTLESHIP_GUESS_RETRIES`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut c = Self::default();
        if let Ok(s) = std::env::var("BATTLESHIP_TURNS") {
            match s.parse() {
                Ok(p) => c.turn_policy = p,
                Err(e) => log::warn!("ignoring BATTLESHIP_TURNS={}: {}", s, e),
            }
        }
        if let Ok(s) = std::env::var("BATTLESHIP_GUESS_TIMEOUT_MS") {
            if let Ok(ms) = s.parse::<u64>() {
                c.guess_timeout_ms = ms;
            }
        }
        if let Ok(s) = std::env::var("BATTLESHIP_GUESS_RETRIES") {
            if let Ok(n) = s.parse::<u8>() {
                c.guess_retries = n;
            }
        }
        c
    }

    pub fn guess_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.guess_timeout_ms)
    }

    pub fn tick(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_ms.max(1))
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn fleet_cells_add_up() {
        let total: usize = SHIPS.iter().map(|s| s.length()).sum();
        assert_eq!(total, TOTAL_SHIP_CELLS);
    }

    #[test]
    fn config_from_json_fills_defaults() {
        let c: SessionConfig = serde_json::from_str(r#"{"turn_policy":"free"}"#).unwrap();
        assert_eq!(c.turn_policy, TurnPolicy::Free);
        assert_eq!(c.guess_retries, 1);
    }
}
