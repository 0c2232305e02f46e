// Probability-based targeting against the opponent's board.
// no_std, no heap allocations.

use rand::Rng;

use crate::board::GuessBoard;
use crate::common::Coord;
use crate::config::{BOARD_SIZE, SHIPS};
use crate::ship::Orientation;

const GRID_SIZE: usize = BOARD_SIZE as usize;

/// Placements covering more confirmed hits get this much more weight per hit,
/// so cells next to a hit stand out.
const HIT_BIAS: f64 = 10.0;

pub type Pdf = [[f64; GRID_SIZE]; GRID_SIZE];

/// Relative likelihood of a ship segment on each cell, indexed `[y][x]`.
///
/// Every fleet ship is counted in every orientation and position that avoids
/// known misses. Cells that already have a result or an outstanding shot get
/// zero mass. The wire protocol never reports sinkings, so all fleet lengths
/// stay in play for the whole game.
pub fn calc_pdf(view: &GuessBoard) -> Pdf {
    let hits = view.hits();
    let misses = view.misses();
    let closed = hits | misses | view.pending();
    let mut matrix = [[0.0f64; GRID_SIZE]; GRID_SIZE];

    for def in SHIPS.iter() {
        let len = def.length();
        for orient in [Orientation::Horizontal, Orientation::Vertical] {
            let (max_x, max_y) = match orient {
                Orientation::Horizontal => (GRID_SIZE - len + 1, GRID_SIZE),
                Orientation::Vertical => (GRID_SIZE, GRID_SIZE - len + 1),
            };
            for y in 0..max_y {
                for x in 0..max_x {
                    let cell = |k: usize| match orient {
                        Orientation::Horizontal => (x + k, y),
                        Orientation::Vertical => (x, y + k),
                    };
                    let mut n_hits = 0;
                    let mut valid = true;
                    for k in 0..len {
                        let (cx, cy) = cell(k);
                        if misses.get(cx, cy).unwrap_or(false) {
                            valid = false;
                            break;
                        }
                        if hits.get(cx, cy).unwrap_or(false) {
                            n_hits += 1;
                        }
                    }
                    if !valid {
                        continue;
                    }
                    let weight = libm::pow(HIT_BIAS, n_hits as f64);
                    for k in 0..len {
                        let (cx, cy) = cell(k);
                        if !closed.get(cx, cy).unwrap_or(true) {
                            matrix[cy][cx] += weight;
                        }
                    }
                }
            }
        }
    }

    normalize(matrix)
}

fn normalize(mut matrix: Pdf) -> Pdf {
    let total: f64 = matrix.iter().flatten().sum();
    if total == 0.0 {
        return matrix;
    }
    for v in matrix.iter_mut().flatten() {
        *v /= total;
    }
    matrix
}

/// Sample a cell from `pdf`, sharpened by `temperature` (< 1 favours the
/// most likely cells). Returns `None` when no cell has any mass.
pub fn sample_pdf<R: Rng + ?Sized>(pdf: &Pdf, temperature: f64, rng: &mut R) -> Option<Coord> {
    let mut adjusted = [[0.0f64; GRID_SIZE]; GRID_SIZE];
    let mut total = 0.0;
    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
            let v = if pdf[y][x] > 0.0 {
                libm::pow(pdf[y][x], 1.0 / temperature)
            } else {
                0.0
            };
            adjusted[y][x] = v;
            total += v;
        }
    }
    if total <= 0.0 {
        return None;
    }
    let threshold: f64 = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last = None;
    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
            if adjusted[y][x] <= 0.0 {
                continue;
            }
            let coord = Coord {
                x: x as u8,
                y: y as u8,
            };
            cumulative += adjusted[y][x];
            if threshold < cumulative {
                return Some(coord);
            }
            last = Some(coord);
        }
    }
    last
}

/// First empty cell in row-major order, for when the density is exhausted.
pub fn first_open_cell(view: &GuessBoard) -> Option<Coord> {
    let closed = view.hits() | view.misses() | view.pending();
    (!closed).iter_set_bits().next().map(|(x, y)| Coord {
        x: x as u8,
        y: y as u8,
    })
}

/// Calculate the density and pick a target from it.
pub fn calc_pdf_and_guess<R: Rng + ?Sized>(view: &GuessBoard, rng: &mut R) -> Option<Coord> {
    let pdf = calc_pdf(view);
    sample_pdf(&pdf, 0.5, rng).or_else(|| first_open_cell(view))
}
