#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;
mod ai;
mod bitboard;
mod board;
mod common;
mod config;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
mod node;
mod player;
pub mod prelude;
pub mod protocol;
mod resolver;
mod session;
mod ship;
#[cfg(feature = "std")]
pub mod transport;

pub use ai::*;
pub use bitboard::{BitBoard, BitBoardError, BoardMask};
pub use board::*;
pub use common::*;
pub use config::*;
#[cfg(feature = "std")]
pub use logging::{init_logging, init_logging_with};
#[cfg(feature = "std")]
pub use node::SessionNode;
pub use player::*;
pub use protocol::{decode, encode, DecodeError, Message};
pub use resolver::resolve;
pub use session::*;
pub use ship::*;
#[cfg(feature = "std")]
pub use transport::{LinkEvent, Transport};
