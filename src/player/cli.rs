#![cfg(feature = "std")]

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use rand::rngs::SmallRng;

use super::Player;
use crate::ai;
use crate::board::{CellState, GuessBoard};
use crate::common::{Coord, GameError, Outcome};
use crate::config::{BOARD_SIZE, NUM_SHIPS};
use crate::protocol::Message;
use crate::session::GameSession;
use crate::ship::Orientation;

/// Terminal player. Placement reads stdin directly; once the game runs, lines
/// come from a reader thread so the node loop never blocks on input.
#[derive(Default)]
pub struct CliPlayer {
    lines: Option<Receiver<String>>,
    prompted: bool,
}

impl CliPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lines(&mut self) -> &Receiver<String> {
        self.lines.get_or_insert_with(|| {
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            });
            rx
        })
    }
}

/// Render a coordinate as column letter plus 1-based row, e.g. `C6`.
pub fn coord_to_string(coord: Coord) -> String {
    format!("{}{}", (b'A' + coord.x) as char, coord.y + 1)
}

/// Parse `C6` (column letter, 1-based row) or `2,5` (0-based `x,y`).
pub fn parse_coord(input: &str) -> Result<Coord, String> {
    let input = input.trim();
    if let Some((x, y)) = input.split_once(',') {
        let x: u8 = x.trim().parse().map_err(|_| format!("invalid column '{}'", x))?;
        let y: u8 = y.trim().parse().map_err(|_| format!("invalid row '{}'", y))?;
        return Coord::new(x, y).map_err(|e| e.to_string());
    }
    let mut chars = input.chars();
    let col = chars
        .next()
        .ok_or("empty input")?
        .to_ascii_uppercase();
    let last = (b'A' + BOARD_SIZE - 1) as char;
    if !('A'..=last).contains(&col) {
        return Err(format!("column '{}' must be A-{}", col, last));
    }
    let row_str: String = chars.collect();
    let row: u8 = row_str
        .trim()
        .parse()
        .map_err(|_| format!("row '{}' must be a number 1-{}", row_str, BOARD_SIZE))?;
    if row == 0 || row > BOARD_SIZE {
        return Err(format!("row {} must be 1-{}", row, BOARD_SIZE));
    }
    Coord::new(col as u8 - b'A', row - 1).map_err(|e| e.to_string())
}

fn cell_char(state: CellState) -> char {
    match state {
        CellState::Empty => '.',
        CellState::Ship => 'S',
        CellState::Hit => 'X',
        CellState::Miss => 'o',
        CellState::UnconfirmedShot => '?',
    }
}

fn print_grid(cell: impl Fn(Coord) -> CellState) {
    print!("     ");
    for x in 0..BOARD_SIZE {
        print!(" {}", (b'A' + x) as char);
    }
    println!();
    for y in 0..BOARD_SIZE {
        print!("   {} ", y + 1);
        for x in 0..BOARD_SIZE {
            print!(" {}", cell_char(cell(Coord { x, y })));
        }
        println!();
    }
}

fn print_fleet(session: &GameSession) {
    print_grid(|c| session.fleet().cell_state(c));
}

/// Print our record of shots at the opponent.
pub fn print_view(view: &GuessBoard) {
    print_grid(|c| view.cell_state(c));
}

/// Print the opponent view (top) and our own board (bottom).
pub fn print_session(session: &GameSession) {
    println!("Opponent board:");
    print_view(session.view());
    println!("\nYour board:");
    print_fleet(session);
    println!("   Legend: S=Ship X=Hit o=Miss ?=Awaiting reply .=Water");
}

fn read_line() -> io::Result<String> {
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

impl Player for CliPlayer {
    fn place_ships(
        &mut self,
        rng: &mut SmallRng,
        session: &mut GameSession,
    ) -> Result<Option<Message>, GameError> {
        println!("\nSHIP PLACEMENT: enter `<cell> [H|V]` (e.g. B3 V), ENTER for random");
        let mut last = None;
        while let Some(def) = session.fleet().next_ship() {
            print_fleet(session);
            print!(
                "Ship {}/{}: {} (length {}) > ",
                session.fleet().ships().len() + 1,
                NUM_SHIPS,
                def.name(),
                def.length()
            );
            let line = match read_line() {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("stdin unavailable ({}), placing at random", e);
                    return session.auto_place(rng);
                }
            };
            if line.is_empty() {
                let ship = session.fleet().random_placement(rng, def.length());
                let origin = ship.origin();
                last = session.place_ship_with(origin.x, origin.y, ship.orientation())?;
                println!("{} placed at {}", def.name(), coord_to_string(origin));
                continue;
            }
            let mut parts = line.split_whitespace();
            let coord = match parts.next().map(parse_coord) {
                Some(Ok(coord)) => coord,
                Some(Err(e)) => {
                    println!("invalid cell: {}", e);
                    continue;
                }
                None => continue,
            };
            let orientation = match parts.next().map(|s| s.to_ascii_uppercase()) {
                None => Orientation::Horizontal,
                Some(s) if s == "H" => Orientation::Horizontal,
                Some(s) if s == "V" => Orientation::Vertical,
                Some(s) => {
                    println!("invalid orientation '{}': use H or V", s);
                    continue;
                }
            };
            match session.place_ship_with(coord.x, coord.y, orientation) {
                Ok(msg) => last = msg,
                Err(e) if e.is_invalid_placement() => println!("cannot place there: {}", e),
                Err(e) => return Err(e),
            }
        }
        print_fleet(session);
        println!("All ships placed.");
        Ok(last)
    }

    fn select_target(&mut self, rng: &mut SmallRng, view: &GuessBoard) -> Option<Coord> {
        let suggestion = ai::calc_pdf_and_guess(view, rng);
        if !self.prompted {
            self.prompted = true;
            println!();
            print_view(view);
            match suggestion {
                Some(s) => print!("Your turn. Target [ENTER for {}] > ", coord_to_string(s)),
                None => print!("Your turn. Target > "),
            }
            let _ = io::stdout().flush();
        }
        let line = match self.lines().try_recv() {
            Ok(line) => line,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => return suggestion,
        };
        self.prompted = false;
        let line = line.trim();
        if line.is_empty() {
            return suggestion;
        }
        match parse_coord(line) {
            Ok(coord) if view.cell_state(coord) == CellState::Empty => Some(coord),
            Ok(coord) => {
                println!("{} was already targeted", coord_to_string(coord));
                None
            }
            Err(e) => {
                println!("invalid cell: {}", e);
                None
            }
        }
    }

    fn handle_guess_result(&mut self, coord: Coord, outcome: Outcome) {
        match outcome {
            Outcome::Hit => println!("HIT at {}!", coord_to_string(coord)),
            Outcome::Miss => println!("Miss at {}.", coord_to_string(coord)),
        }
    }
}
