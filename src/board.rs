//! Boards: the ship truth board each side keeps for itself, and the guess
//! view it builds of the opponent from hit/miss replies.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::fmt;
use rand::Rng;

use crate::bitboard::BoardMask;
use crate::common::{Coord, GameError, Outcome};
use crate::config::{BOARD_SIZE, NUM_SHIPS, SHIPS, TOTAL_SHIP_CELLS};
use crate::resolver::resolve;
use crate::ship::{Orientation, Ship, ShipDef};

/// State of a single cell as seen by the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    Empty,
    Ship,
    Hit,
    Miss,
    UnconfirmedShot,
}

/// Placement validator: can a ship of `length` start at `origin` with
/// `orientation` without leaving the grid or touching an existing ship?
pub fn can_place(
    board: &FleetBoard,
    origin: Coord,
    length: usize,
    orientation: Orientation,
) -> bool {
    board.check_placement(origin, length, orientation).is_ok()
}

/// A side's own board: ship layout plus the opponent's shots against it.
#[derive(Clone, PartialEq, Eq)]
pub struct FleetBoard {
    ships: Vec<Ship>,
    ship_map: BoardMask,
    hits: BoardMask,
    misses: BoardMask,
}

impl FleetBoard {
    pub fn new() -> Self {
        Self {
            ships: Vec::with_capacity(NUM_SHIPS),
            ship_map: BoardMask::new(),
            hits: BoardMask::new(),
            misses: BoardMask::new(),
        }
    }

    /// Ships placed so far, in fleet order.
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship_map(&self) -> BoardMask {
        self.ship_map
    }

    /// The fleet entry to be placed next, if any.
    pub fn next_ship(&self) -> Option<ShipDef> {
        SHIPS.get(self.ships.len()).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.ships.len() == NUM_SHIPS
    }

    /// Validate a candidate ship without touching the board.
    pub fn check_placement(
        &self,
        origin: Coord,
        length: usize,
        orientation: Orientation,
    ) -> Result<Ship, GameError> {
        let ship = Ship::new(origin, length, orientation)?;
        if self.ship_map.intersects(&ship.mask()) {
            return Err(GameError::ShipOverlaps);
        }
        Ok(ship)
    }

    /// Commit the next fleet ship. The board is untouched on error.
    pub fn place(&mut self, ship: Ship) -> Result<(), GameError> {
        let def = self.next_ship().ok_or(GameError::FleetComplete)?;
        if def.length() != ship.length() {
            return Err(GameError::WrongShipLength {
                expected: def.length(),
                got: ship.length(),
            });
        }
        let ship = self.check_placement(ship.origin(), ship.length(), ship.orientation())?;
        self.ship_map = self.ship_map | ship.mask();
        self.ships.push(ship);
        debug_assert_eq!(
            self.ship_map.count_ones(),
            self.ships.iter().map(|s| s.length()).sum::<usize>()
        );
        Ok(())
    }

    /// Pick a random legal spot for a ship of `length` by rejection sampling.
    ///
    /// There is no retry cap: the fleet occupies 9 of 64 cells, so a free spot
    /// always exists and uniform sampling finds it quickly.
    pub fn random_placement<R: Rng + ?Sized>(&self, rng: &mut R, length: usize) -> Ship {
        let n = BOARD_SIZE as usize;
        loop {
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (max_x, max_y) = match orientation {
                Orientation::Horizontal => (n - length, n - 1),
                Orientation::Vertical => (n - 1, n - length),
            };
            let origin = Coord {
                x: rng.random_range(0..=max_x) as u8,
                y: rng.random_range(0..=max_y) as u8,
            };
            if let Ok(ship) = self.check_placement(origin, length, orientation) {
                return ship;
            }
        }
    }

    /// Place every remaining fleet ship at random.
    pub fn place_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        while let Some(def) = self.next_ship() {
            let ship = self.random_placement(rng, def.length());
            self.place(ship)?;
        }
        Ok(())
    }

    /// Apply an opponent guess. Returns the outcome and whether it was new.
    ///
    /// A repeated coordinate reports the recorded outcome again without
    /// mutating anything, so retried requests get a consistent answer.
    pub fn receive_guess(&mut self, coord: Coord) -> Result<(Outcome, bool), GameError> {
        if !coord.is_valid() {
            return Err(GameError::OutOfRange {
                x: coord.x,
                y: coord.y,
            });
        }
        let (x, y) = (coord.x as usize, coord.y as usize);
        if self.hits.get(x, y)? {
            return Ok((Outcome::Hit, false));
        }
        if self.misses.get(x, y)? {
            return Ok((Outcome::Miss, false));
        }
        let outcome = resolve(&self.ships, coord);
        match outcome {
            Outcome::Hit => self.hits.set(x, y)?,
            Outcome::Miss => self.misses.set(x, y)?,
        }
        Ok((outcome, true))
    }

    /// Number of our ship cells the opponent has struck.
    pub fn hits_taken(&self) -> usize {
        self.hits.count_ones()
    }

    /// True once every ship cell has been struck.
    pub fn all_struck(&self) -> bool {
        self.is_complete() && self.hits_taken() >= TOTAL_SHIP_CELLS
    }

    pub fn cell_state(&self, coord: Coord) -> CellState {
        let (x, y) = (coord.x as usize, coord.y as usize);
        if self.hits.get(x, y).unwrap_or(false) {
            CellState::Hit
        } else if self.misses.get(x, y).unwrap_or(false) {
            CellState::Miss
        } else if self.ship_map.get(x, y).unwrap_or(false) {
            CellState::Ship
        } else {
            CellState::Empty
        }
    }
}

impl Default for FleetBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FleetBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FleetBoard")
            .field("ships", &self.ships)
            .field("hits", &self.hits.count_ones())
            .field("misses", &self.misses.count_ones())
            .finish()
    }
}

/// A side's record of its own guesses against the opponent. Holds outcomes
/// only, never the opponent's ship layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuessBoard {
    hits: BoardMask,
    misses: BoardMask,
    pending: BoardMask,
}

impl GuessBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> BoardMask {
        self.hits
    }

    pub fn misses(&self) -> BoardMask {
        self.misses
    }

    /// Shots sent but not yet answered.
    pub fn pending(&self) -> BoardMask {
        self.pending
    }

    pub fn pending_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.pending.iter_set_bits().map(|(x, y)| Coord {
            x: x as u8,
            y: y as u8,
        })
    }

    /// Record an outgoing shot. Fails if the cell already has a shot or result.
    pub fn mark_pending(&mut self, coord: Coord) -> Result<(), GameError> {
        if self.cell_state(coord) != CellState::Empty {
            return Err(GameError::DuplicateGuess);
        }
        self.pending.set(coord.x as usize, coord.y as usize)?;
        Ok(())
    }

    /// Settle an outstanding shot. Results for cells that are not pending are
    /// rejected, so a replayed reply cannot count twice.
    pub fn apply_result(&mut self, coord: Coord, outcome: Outcome) -> Result<(), GameError> {
        let (x, y) = (coord.x as usize, coord.y as usize);
        if !self.pending.get(x, y)? {
            return Err(GameError::DuplicateGuess);
        }
        self.pending.clear(x, y)?;
        match outcome {
            Outcome::Hit => self.hits.set(x, y)?,
            Outcome::Miss => self.misses.set(x, y)?,
        }
        Ok(())
    }

    /// Drop an unanswered shot so the cell can be fired at again.
    pub fn abandon(&mut self, coord: Coord) -> bool {
        let (x, y) = (coord.x as usize, coord.y as usize);
        if self.pending.get(x, y).unwrap_or(false) {
            let _ = self.pending.clear(x, y);
            true
        } else {
            false
        }
    }

    pub fn cell_state(&self, coord: Coord) -> CellState {
        let (x, y) = (coord.x as usize, coord.y as usize);
        if self.hits.get(x, y).unwrap_or(false) {
            CellState::Hit
        } else if self.misses.get(x, y).unwrap_or(false) {
            CellState::Miss
        } else if self.pending.get(x, y).unwrap_or(false) {
            CellState::UnconfirmedShot
        } else {
            CellState::Empty
        }
    }
}
