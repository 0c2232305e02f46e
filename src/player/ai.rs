use rand::rngs::SmallRng;

use super::Player;
use crate::ai;
use crate::board::GuessBoard;
use crate::common::{Coord, GameError};
use crate::protocol::Message;
use crate::session::GameSession;

/// Computer player: random fleet, probability-density targeting.
#[derive(Debug, Default)]
pub struct AiPlayer;

impl AiPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Player for AiPlayer {
    fn place_ships(
        &mut self,
        rng: &mut SmallRng,
        session: &mut GameSession,
    ) -> Result<Option<Message>, GameError> {
        session.auto_place(rng)
    }

    fn select_target(&mut self, rng: &mut SmallRng, view: &GuessBoard) -> Option<Coord> {
        ai::calc_pdf_and_guess(view, rng)
    }
}
