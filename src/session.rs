//! Turn and readiness state machine for one side of a game.
//!
//! A [`GameSession`] owns everything a device knows about the game: its fleet,
//! its view of the opponent, the link and readiness flags and whose turn it
//! is. Every operation is synchronous and non-blocking and returns the message
//! (if any) that the caller must put on the wire. The phase is derived from
//! the flags rather than stored, so a reconnect cannot leave it stale.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use log::{debug, info, warn};
use rand::Rng;

use crate::board::{CellState, FleetBoard, GuessBoard};
use crate::common::{Coord, GameError, Outcome, Side};
use crate::config::{TurnPolicy, BOARD_SIZE, TOTAL_SHIP_CELLS};
use crate::protocol::{self, Message};
use crate::ship::{Orientation, Ship};

/// Link role, fixed for the lifetime of the process. The host advertises and
/// fires first under alternating turns; the guest scans and connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Host,
    Guest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Local fleet not fully placed.
    Placing,
    /// Fleet placed; waiting for the link and/or the peer's `Ready`.
    AwaitingPeerReady,
    /// Both sides ready; guesses may be exchanged.
    Playing,
    /// One side has lost every ship cell.
    GameOver,
}

/// Compact, serializable view of a session for logs and reports.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSummary {
    pub role: Role,
    pub phase: Phase,
    pub hits_landed: usize,
    pub hits_taken: usize,
    pub shots_fired: usize,
    pub winner: Option<Side>,
}

pub struct GameSession {
    role: Role,
    policy: TurnPolicy,
    fleet: FleetBoard,
    view: GuessBoard,
    connected: bool,
    local_ready: bool,
    peer_ready: bool,
    local_turn: bool,
    orientation: Orientation,
    cursor: Coord,
}

impl GameSession {
    pub fn new(role: Role, policy: TurnPolicy) -> Self {
        Self {
            role,
            policy,
            fleet: FleetBoard::new(),
            view: GuessBoard::new(),
            connected: false,
            local_ready: false,
            peer_ready: false,
            local_turn: role == Role::Host,
            orientation: Orientation::Horizontal,
            cursor: Coord { x: 0, y: 0 },
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn policy(&self) -> TurnPolicy {
        self.policy
    }

    pub fn fleet(&self) -> &FleetBoard {
        &self.fleet
    }

    pub fn view(&self) -> &GuessBoard {
        &self.view
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_local_ready(&self) -> bool {
        self.local_ready
    }

    pub fn is_peer_ready(&self) -> bool {
        self.peer_ready
    }

    /// Hits we have landed on the opponent.
    pub fn hits_landed(&self) -> usize {
        self.view.hits().count_ones()
    }

    /// Hits the opponent has landed on us.
    pub fn hits_taken(&self) -> usize {
        self.fleet.hits_taken()
    }

    pub fn is_game_over(&self) -> bool {
        self.winner().is_some()
    }

    /// The side that sank the other's fleet, once the game is decided.
    pub fn winner(&self) -> Option<Side> {
        if self.hits_landed() >= TOTAL_SHIP_CELLS {
            Some(Side::Local)
        } else if self.fleet.all_struck() {
            Some(Side::Peer)
        } else {
            None
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_game_over() {
            Phase::GameOver
        } else if !self.fleet.is_complete() {
            Phase::Placing
        } else if self.local_ready && self.peer_ready {
            Phase::Playing
        } else {
            Phase::AwaitingPeerReady
        }
    }

    /// Whether it is this side's turn. Always true under free turns.
    pub fn is_local_turn(&self) -> bool {
        self.policy == TurnPolicy::Free || self.local_turn
    }

    /// True when `confirm_guess` would be accepted for some empty cell.
    pub fn can_fire(&self) -> bool {
        self.phase() == Phase::Playing && self.is_local_turn()
    }

    /// Shots sent but not yet answered.
    pub fn pending_guesses(&self) -> Vec<Coord> {
        self.view.pending_cells().collect()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            role: self.role,
            phase: self.phase(),
            hits_landed: self.hits_landed(),
            hits_taken: self.hits_taken(),
            shots_fired: self.view.hits().count_ones() + self.view.misses().count_ones(),
            winner: self.winner(),
        }
    }

    /// Cell state for the render layer.
    pub fn cell_state(&self, side: Side, x: u8, y: u8) -> Result<CellState, GameError> {
        let coord = Coord::new(x, y)?;
        Ok(match side {
            Side::Local => self.fleet.cell_state(coord),
            Side::Peer => self.view.cell_state(coord),
        })
    }

    pub fn cursor(&self) -> Coord {
        self.cursor
    }

    pub fn set_cursor(&mut self, x: u8, y: u8) -> Result<(), GameError> {
        self.cursor = Coord::new(x, y)?;
        Ok(())
    }

    /// Move the cursor, wrapping around the grid edges.
    pub fn move_cursor(&mut self, dx: i8, dy: i8) -> Coord {
        let n = BOARD_SIZE as i16;
        let wrap = |v: u8, d: i8| ((v as i16 + d as i16).rem_euclid(n)) as u8;
        self.cursor = Coord {
            x: wrap(self.cursor.x, dx),
            y: wrap(self.cursor.y, dy),
        };
        self.cursor
    }

    /// Orientation used by [`place_ship`](Self::place_ship).
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn rotate_toggle(&mut self) -> Orientation {
        self.orientation = self.orientation.toggled();
        self.orientation
    }

    /// Commit the next fleet ship at `(x, y)` with the current orientation.
    pub fn place_ship(&mut self, x: u8, y: u8) -> Result<Option<Message>, GameError> {
        self.place_ship_with(x, y, self.orientation)
    }

    /// Commit the next fleet ship. Returns `Ready` once the last ship is down
    /// and the link is up.
    pub fn place_ship_with(
        &mut self,
        x: u8,
        y: u8,
        orientation: Orientation,
    ) -> Result<Option<Message>, GameError> {
        let def = self.fleet.next_ship().ok_or(GameError::FleetComplete)?;
        let origin = Coord::new(x, y)?;
        let ship = Ship::new(origin, def.length(), orientation)?;
        self.fleet.place(ship)?;
        debug!("placed {} at {} {:?}", def.name(), origin, orientation);
        self.orientation = Orientation::Horizontal;
        Ok(self.announce_ready())
    }

    /// Place every remaining ship at random.
    pub fn auto_place<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Option<Message>, GameError> {
        if self.fleet.is_complete() {
            return Err(GameError::FleetComplete);
        }
        self.fleet.place_random(rng)?;
        debug!("fleet placed at random: {:?}", self.fleet.ships());
        Ok(self.announce_ready())
    }

    fn announce_ready(&mut self) -> Option<Message> {
        if !self.fleet.is_complete() || !self.connected || self.local_ready {
            return None;
        }
        self.local_ready = true;
        info!("{:?}: fleet placed, sending READY", self.role);
        if self.peer_ready && !self.is_game_over() {
            info!("{:?}: both sides ready", self.role);
        }
        Some(Message::Ready)
    }

    /// Link state change reported by the transport. Going down clears both
    /// readiness flags but keeps boards, counters and the turn; coming back up
    /// re-announces readiness if the fleet is placed.
    pub fn set_connected(&mut self, connected: bool) -> Option<Message> {
        if connected {
            self.connected = true;
            info!("{:?}: link up", self.role);
            self.announce_ready()
        } else {
            if self.connected {
                warn!("{:?}: link down, readiness reset", self.role);
            }
            self.connected = false;
            self.local_ready = false;
            self.peer_ready = false;
            None
        }
    }

    /// Fire at `(x, y)` on the opponent's board. The cell is marked
    /// `UnconfirmedShot` until the reply arrives.
    pub fn confirm_guess(&mut self, x: u8, y: u8) -> Result<Message, GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        let coord = Coord::new(x, y)?;
        if !self.connected {
            return Err(GameError::TransportDisconnected);
        }
        if self.phase() != Phase::Playing {
            return Err(GameError::NotPlaying);
        }
        if !self.is_local_turn() {
            return Err(GameError::OutOfTurn);
        }
        self.view.mark_pending(coord)?;
        self.local_turn = false;
        debug!("{:?}: firing at {}", self.role, coord);
        Ok(Message::guess(coord))
    }

    /// Re-issue the request for a still unanswered shot.
    pub fn resend_guess(&self, coord: Coord) -> Option<Message> {
        (self.connected && self.view.cell_state(coord) == CellState::UnconfirmedShot)
            .then(|| Message::guess(coord))
    }

    /// Give up on an unanswered shot: the cell becomes empty again and, once
    /// nothing else is outstanding, the turn returns to this side.
    pub fn abandon_guess(&mut self, coord: Coord) -> bool {
        if !self.view.abandon(coord) {
            return false;
        }
        warn!("{:?}: no reply for shot at {}, abandoned", self.role, coord);
        if self.view.pending().is_empty() {
            self.local_turn = true;
        }
        true
    }

    /// Decode and apply an inbound payload. Undecodable payloads leave the
    /// session untouched.
    pub fn handle_payload(&mut self, payload: &[u8]) -> Result<Option<Message>, GameError> {
        let msg = protocol::decode(payload).map_err(GameError::from)?;
        self.handle_message(msg)
    }

    /// Apply an inbound message, returning the reply to send, if any.
    ///
    /// Once the game is decided the boards are frozen: late results and fresh
    /// shots are refused with `GameOver`, while a replay of an answered shot
    /// still gets its recorded outcome.
    pub fn handle_message(&mut self, msg: Message) -> Result<Option<Message>, GameError> {
        match msg {
            Message::Ready => {
                if !self.peer_ready {
                    self.peer_ready = true;
                    info!("{:?}: peer is ready", self.role);
                }
                Ok(None)
            }
            Message::Guess { x, y } => self.answer_guess(Coord::new(x, y)?).map(Some),
            Message::GuessResult { x, y, outcome } => {
                self.settle_guess(Coord::new(x, y)?, outcome)?;
                Ok(None)
            }
        }
    }

    fn answer_guess(&mut self, coord: Coord) -> Result<Message, GameError> {
        if !self.fleet.is_complete() {
            return Err(GameError::NotReady);
        }
        if self.is_game_over() {
            return match self.fleet.cell_state(coord) {
                CellState::Hit => Ok(Message::result(coord, Outcome::Hit)),
                CellState::Miss => Ok(Message::result(coord, Outcome::Miss)),
                _ => Err(GameError::GameOver),
            };
        }
        // Ready is never retried; a peer that fires has evidently sent one.
        if !self.peer_ready {
            self.peer_ready = true;
            info!("{:?}: peer fired before its READY arrived, treating it as ready", self.role);
        }
        let (outcome, fresh) = self.fleet.receive_guess(coord)?;
        // Answering hands us the turn even for replays, so a lost reply
        // cannot leave both sides waiting.
        if self.policy == TurnPolicy::Alternating && self.local_turn && fresh {
            warn!("{:?}: peer fired at {} out of turn", self.role, coord);
        }
        self.local_turn = true;
        if fresh {
            debug!("{:?}: peer fired at {}: {:?}", self.role, coord, outcome);
            if self.fleet.all_struck() {
                info!("{:?}: all ships struck, game lost", self.role);
            }
        } else {
            debug!("{:?}: replayed shot at {}: {:?}", self.role, coord, outcome);
        }
        Ok(Message::result(coord, outcome))
    }

    fn settle_guess(&mut self, coord: Coord, outcome: Outcome) -> Result<(), GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        self.view.apply_result(coord, outcome)?;
        debug!("{:?}: shot at {} confirmed: {:?}", self.role, coord, outcome);
        if outcome == Outcome::Hit && self.hits_landed() >= TOTAL_SHIP_CELLS {
            info!("{:?}: all enemy ship cells struck, game won", self.role);
        }
        Ok(())
    }
}
