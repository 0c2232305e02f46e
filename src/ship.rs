//! Ship definitions and geometry.

use core::fmt;

use crate::bitboard::BoardMask;
use crate::common::{Coord, GameError};
use crate::config::BOARD_SIZE;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Extends along increasing `x`.
    Horizontal,
    /// Extends along increasing `y`.
    Vertical,
}

impl Orientation {
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Fleet entry: a name and a length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipDef {
    name: &'static str,
    length: usize,
}

impl ShipDef {
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

/// A ship laid out on the grid: origin cell, length and orientation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Ship {
    origin: Coord,
    length: usize,
    orientation: Orientation,
}

impl Ship {
    /// Lay out a ship, failing if any of its cells would leave the grid.
    pub fn new(origin: Coord, length: usize, orientation: Orientation) -> Result<Self, GameError> {
        if !origin.is_valid() || length == 0 {
            return Err(GameError::ShipOutOfBounds);
        }
        let start = match orientation {
            Orientation::Horizontal => origin.x as usize,
            Orientation::Vertical => origin.y as usize,
        };
        if start + length > BOARD_SIZE as usize {
            return Err(GameError::ShipOutOfBounds);
        }
        Ok(Ship {
            origin,
            length,
            orientation,
        })
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The `length` contiguous cells this ship occupies.
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.length as u8).map(move |i| match self.orientation {
            Orientation::Horizontal => Coord {
                x: self.origin.x + i,
                y: self.origin.y,
            },
            Orientation::Vertical => Coord {
                x: self.origin.x,
                y: self.origin.y + i,
            },
        })
    }

    /// True if `coord` is one of this ship's cells.
    pub fn covers(&self, coord: Coord) -> bool {
        let (ox, oy) = (self.origin.x as usize, self.origin.y as usize);
        let (x, y) = (coord.x as usize, coord.y as usize);
        match self.orientation {
            Orientation::Horizontal => y == oy && ox <= x && x < ox + self.length,
            Orientation::Vertical => x == ox && oy <= y && y < oy + self.length,
        }
    }

    /// Occupancy mask of the ship.
    pub fn mask(&self) -> BoardMask {
        let mut mask = BoardMask::new();
        for c in self.cells() {
            // in bounds by construction
            let _ = mask.set(c.x as usize, c.y as usize);
        }
        mask
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ origin: {}, length: {}, orientation: {:?} }}",
            self.origin, self.length, self.orientation
        )
    }
}
