//! Hit resolution against a fleet.

use crate::common::{Coord, Outcome};
use crate::ship::Ship;

/// Resolve a guess at `coord` against `ships`.
///
/// Ships never overlap, so at most one can cover the cell; the first match
/// decides. Pure: the same fleet and coordinate always give the same outcome.
pub fn resolve(ships: &[Ship], coord: Coord) -> Outcome {
    if ships.iter().any(|ship| ship.covers(coord)) {
        Outcome::Hit
    } else {
        Outcome::Miss
    }
}
