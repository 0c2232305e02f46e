//! Commonly used types and utilities for ease of import.

pub use crate::{
    can_place, resolve, AiPlayer, Coord, GameError, GameSession, Message, Outcome, Phase, Player,
    Role, SessionConfig, Side, TurnPolicy,
};

#[cfg(feature = "std")]
pub use crate::{init_logging, print_session, CliPlayer, SessionNode};

#[cfg(feature = "std")]
pub use crate::transport::{InMemoryTransport, LinkEvent, TcpTransport, Transport};
