//! Common types shared by the board, codec and session: coordinates, guess
//! outcomes and the error taxonomy.

use core::fmt;

use crate::bitboard::BitBoardError;
use crate::config::BOARD_SIZE;

/// A cell on the 8×8 grid. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: u8,
    pub y: u8,
}

impl Coord {
    /// Build a coordinate, rejecting anything outside `[0, BOARD_SIZE)`.
    pub fn new(x: u8, y: u8) -> Result<Self, GameError> {
        if x >= BOARD_SIZE || y >= BOARD_SIZE {
            return Err(GameError::OutOfRange { x, y });
        }
        Ok(Coord { x, y })
    }

    pub fn is_valid(&self) -> bool {
        self.x < BOARD_SIZE && self.y < BOARD_SIZE
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Result of resolving a guess against a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Hit,
    Miss,
}

/// Which board a query refers to: our own fleet, or our view of the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Local,
    Peer,
}

/// Errors surfaced by the game core. None of them is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Inbound payload did not match any wire shape.
    MalformedMessage,
    /// Coordinate outside the grid.
    OutOfRange { x: u8, y: u8 },
    /// Ship would leave the grid.
    ShipOutOfBounds,
    /// Ship would overlap an already placed ship.
    ShipOverlaps,
    /// All fleet ships are already placed.
    FleetComplete,
    /// Ship length does not match the next fleet entry.
    WrongShipLength { expected: usize, got: usize },
    /// Cell already has a result (or an outstanding shot).
    DuplicateGuess,
    /// Operation needs both sides ready.
    NotPlaying,
    /// Peer guessed before our fleet was placed.
    NotReady,
    /// Guess sent or received while it is the other side's turn.
    OutOfTurn,
    /// Game already decided.
    GameOver,
    /// The link is down.
    TransportDisconnected,
    /// Underlying bitboard error.
    Board(BitBoardError),
}

impl GameError {
    /// Placement errors that the UI should answer by re-prompting.
    pub fn is_invalid_placement(&self) -> bool {
        matches!(
            self,
            GameError::ShipOutOfBounds
                | GameError::ShipOverlaps
                | GameError::FleetComplete
                | GameError::WrongShipLength { .. }
        )
    }
}

impl From<BitBoardError> for GameError {
    fn from(err: BitBoardError) -> Self {
        GameError::Board(err)
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::MalformedMessage => write!(f, "malformed message"),
            GameError::OutOfRange { x, y } => {
                write!(f, "coordinate ({}, {}) is outside the board", x, y)
            }
            GameError::ShipOutOfBounds => write!(f, "ship placement is out of bounds"),
            GameError::ShipOverlaps => write!(f, "ship placement overlaps another ship"),
            GameError::FleetComplete => write!(f, "all ships are already placed"),
            GameError::WrongShipLength { expected, got } => {
                write!(f, "next ship has length {}, got {}", expected, got)
            }
            GameError::DuplicateGuess => write!(f, "cell was already guessed"),
            GameError::NotPlaying => write!(f, "both players must be ready first"),
            GameError::NotReady => write!(f, "local fleet is not placed yet"),
            GameError::OutOfTurn => write!(f, "not this side's turn"),
            GameError::GameOver => write!(f, "game is over"),
            GameError::TransportDisconnected => write!(f, "transport disconnected"),
            GameError::Board(e) => write!(f, "board error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GameError {}

#[cfg(feature = "std")]
impl std::error::Error for BitBoardError {}
