//! Wire codec for the text messages exchanged over the link characteristic.
//!
//! | Message     | Payload          |
//! |-------------|------------------|
//! | Ready       | `READY`          |
//! | Guess       | `GUESS:x,y`      |
//! | GuessResult | `x,y,H` / `x,y,O`|
//!
//! `x` and `y` are single decimal digits `0..8`. The older `x,y,X` hit form
//! is still accepted on decode but never produced.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::fmt;

use crate::common::{Coord, GameError, Outcome};
use crate::config::BOARD_SIZE;

const READY: &[u8] = b"READY";
const GUESS_PREFIX: &[u8] = b"GUESS:";
const HIT: u8 = b'H';
const MISS: u8 = b'O';
const LEGACY_HIT: u8 = b'X';

/// Messages exchanged between the two peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    /// Sender finished placing its fleet.
    Ready,
    /// Sender fires at a cell on the receiver's board.
    Guess { x: u8, y: u8 },
    /// Receiver of a `Guess` reports the outcome back to the requester.
    GuessResult { x: u8, y: u8, outcome: Outcome },
}

impl Message {
    pub fn guess(coord: Coord) -> Self {
        Message::Guess {
            x: coord.x,
            y: coord.y,
        }
    }

    pub fn result(coord: Coord, outcome: Outcome) -> Self {
        Message::GuessResult {
            x: coord.x,
            y: coord.y,
            outcome,
        }
    }
}

/// Why a payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload matches no message shape.
    Malformed,
    /// Digits parsed but name a cell outside the board.
    OutOfRange { x: u8, y: u8 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Malformed => write!(f, "payload matches no message shape"),
            DecodeError::OutOfRange { x, y } => {
                write!(f, "coordinate ({}, {}) is outside the board", x, y)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

impl From<DecodeError> for GameError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Malformed => GameError::MalformedMessage,
            DecodeError::OutOfRange { x, y } => GameError::OutOfRange { x, y },
        }
    }
}

fn digit(c: u8) -> Option<u8> {
    c.is_ascii_digit().then(|| c - b'0')
}

fn coord_digits(x: u8, y: u8) -> Result<(u8, u8), DecodeError> {
    let (x, y) = match (digit(x), digit(y)) {
        (Some(x), Some(y)) => (x, y),
        _ => return Err(DecodeError::Malformed),
    };
    if x >= BOARD_SIZE || y >= BOARD_SIZE {
        return Err(DecodeError::OutOfRange { x, y });
    }
    Ok((x, y))
}

fn coord_chars(x: u8, y: u8) -> Result<(u8, u8), DecodeError> {
    if x >= BOARD_SIZE || y >= BOARD_SIZE {
        return Err(DecodeError::OutOfRange { x, y });
    }
    Ok((b'0' + x, b'0' + y))
}

/// Encode a message into its wire payload. Coordinates off the board have no
/// single-digit form and are refused with `OutOfRange`.
pub fn encode(msg: &Message) -> Result<Vec<u8>, DecodeError> {
    match *msg {
        Message::Ready => Ok(READY.to_vec()),
        Message::Guess { x, y } => {
            let (x, y) = coord_chars(x, y)?;
            let mut out = Vec::with_capacity(GUESS_PREFIX.len() + 3);
            out.extend_from_slice(GUESS_PREFIX);
            out.extend_from_slice(&[x, b',', y]);
            Ok(out)
        }
        Message::GuessResult { x, y, outcome } => {
            let (x, y) = coord_chars(x, y)?;
            let c = match outcome {
                Outcome::Hit => HIT,
                Outcome::Miss => MISS,
            };
            Ok([x, b',', y, b',', c].to_vec())
        }
    }
}

/// Decode a wire payload. Anything that is not exactly one of the known
/// shapes is rejected; nothing is indexed before its length is checked.
pub fn decode(payload: &[u8]) -> Result<Message, DecodeError> {
    if payload == READY {
        return Ok(Message::Ready);
    }
    if let Some(rest) = payload.strip_prefix(GUESS_PREFIX) {
        return match rest {
            [x, b',', y] => {
                let (x, y) = coord_digits(*x, *y)?;
                Ok(Message::Guess { x, y })
            }
            _ => Err(DecodeError::Malformed),
        };
    }
    match payload {
        [x, b',', y, b',', c] => {
            let outcome = match *c {
                HIT | LEGACY_HIT => Outcome::Hit,
                MISS => Outcome::Miss,
                _ => return Err(DecodeError::Malformed),
            };
            let (x, y) = coord_digits(*x, *y)?;
            Ok(Message::GuessResult { x, y, outcome })
        }
        _ => Err(DecodeError::Malformed),
    }
}
