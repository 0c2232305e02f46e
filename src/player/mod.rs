//! Player trait and implementations
//!
//! A player decides where the fleet goes and which cell to fire at next; the
//! node driver takes care of the link and the session bookkeeping.
//! - AiPlayer: density-based targeting, random placement
//! - CliPlayer: interactive terminal player

use rand::rngs::SmallRng;

use crate::board::GuessBoard;
use crate::common::{Coord, GameError, Outcome};
use crate::protocol::Message;
use crate::session::GameSession;

/// Interface implemented by different player types.
pub trait Player: Send {
    /// Place the remaining fleet on the session's board. Returns the message
    /// the session produced on completion (a `Ready`, if the link is up).
    fn place_ships(
        &mut self,
        rng: &mut SmallRng,
        session: &mut GameSession,
    ) -> Result<Option<Message>, GameError>;

    /// Choose the next target. `None` means no decision yet; the node asks
    /// again on its next tick.
    fn select_target(&mut self, rng: &mut SmallRng, view: &GuessBoard) -> Option<Coord>;

    /// Inform the player of the confirmed outcome of one of its shots.
    fn handle_guess_result(&mut self, _coord: Coord, _outcome: Outcome) {}
}

mod ai;
pub use ai::AiPlayer;

#[cfg(feature = "std")]
mod cli;
#[cfg(feature = "std")]
pub use cli::{coord_to_string, parse_coord, print_session, print_view, CliPlayer};
