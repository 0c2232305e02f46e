//! A fixed-size bitboard using const generics.
//!
//! The grid is `N×N` cells packed row-major into an unsigned integer `T`, so an
//! 8×8 board fits exactly in a `u64`. Cells are addressed by column `x` and
//! row `y`. The type is `no_std` friendly and never allocates.

use core::ops::{BitAnd, BitOr, Not};
use core::{fmt, mem};
use num_traits::{PrimInt, Unsigned, Zero};

/// Errors returned by bitboard operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitBoardError {
    /// Requested board size N*N exceeds the capacity of `T`.
    SizeTooLarge { n: usize, capacity: usize },
    /// Column or row index is outside `[0, N)`.
    IndexOutOfBounds { x: usize, y: usize },
}

impl fmt::Display for BitBoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitBoardError::SizeTooLarge { n, capacity } => {
                write!(f, "board of {}x{} cells exceeds {} bits", n, n, capacity)
            }
            BitBoardError::IndexOutOfBounds { x, y } => {
                write!(f, "cell ({}, {}) is outside the board", x, y)
            }
        }
    }
}

/// A fixed-size N×N bitboard stored in the unsigned integer `T`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitBoard<T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    bits: T,
}

impl<T, const N: usize> BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    const BOARD_BITS: usize = N * N;

    #[inline]
    fn mask() -> T {
        if Self::BOARD_BITS == mem::size_of::<T>() * 8 {
            !T::zero()
        } else {
            (T::one() << Self::BOARD_BITS) - T::one()
        }
    }

    /// Create an empty bitboard.
    #[inline]
    pub fn new() -> Self {
        BitBoard { bits: T::zero() }
    }

    /// Fallible constructor: returns `Err(SizeTooLarge)` if N*N does not fit in `T`.
    pub fn try_new() -> Result<Self, BitBoardError> {
        let capacity = mem::size_of::<T>() * 8;
        if Self::BOARD_BITS > capacity {
            Err(BitBoardError::SizeTooLarge { n: N, capacity })
        } else {
            Ok(Self::new())
        }
    }

    /// Number of set cells.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    #[inline]
    fn index(x: usize, y: usize) -> Result<usize, BitBoardError> {
        if x >= N || y >= N {
            Err(BitBoardError::IndexOutOfBounds { x, y })
        } else {
            Ok(y * N + x)
        }
    }

    /// Gets the cell at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Result<bool, BitBoardError> {
        let idx = Self::index(x, y)?;
        Ok(((self.bits >> idx) & T::one()) != T::zero())
    }

    /// Sets the cell at column `x`, row `y`.
    pub fn set(&mut self, x: usize, y: usize) -> Result<(), BitBoardError> {
        let idx = Self::index(x, y)?;
        self.bits = self.bits | (T::one() << idx);
        Ok(())
    }

    /// Clears the cell at column `x`, row `y`.
    pub fn clear(&mut self, x: usize, y: usize) -> Result<(), BitBoardError> {
        let idx = Self::index(x, y)?;
        self.bits = self.bits & !(T::one() << idx);
        Ok(())
    }

    /// True when both boards share at least one set cell.
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.bits & other.bits).is_zero()
    }

    #[inline]
    pub fn into_raw(self) -> T {
        self.bits
    }

    /// Creates a bitboard from the raw integer, masking out bits past `N*N`.
    #[inline]
    pub fn from_raw(raw: T) -> Self {
        BitBoard {
            bits: raw & Self::mask(),
        }
    }

    /// Iterator over the `(x, y)` positions of set cells, row by row.
    pub fn iter_set_bits(&self) -> SetBits<'_, T, N> {
        SetBits {
            board: self,
            idx: 0,
        }
    }
}

impl<T, const N: usize> Default for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitBoard<{}>:", N)?;
        for y in 0..N {
            for x in 0..N {
                let bit = if ((self.bits >> (y * N + x)) & T::one()) != T::zero() {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{}", bit)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The game grid: 8×8 cells in a `u64`.
pub type BoardMask = BitBoard<u64, { crate::config::BOARD_SIZE as usize }>;

/// Iterator over the set cells of a bitboard.
pub struct SetBits<'a, T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    board: &'a BitBoard<T, N>,
    idx: usize,
}

impl<T, const N: usize> Iterator for SetBits<'_, T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.idx < N * N {
            let idx = self.idx;
            self.idx += 1;
            if ((self.board.bits >> idx) & T::one()) != T::zero() {
                return Some((idx % N, idx / N));
            }
        }
        None
    }
}

impl<T, const N: usize> BitAnd for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        BitBoard::from_raw(self.bits & rhs.bits)
    }
}

impl<T, const N: usize> BitOr for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        BitBoard::from_raw(self.bits | rhs.bits)
    }
}

impl<T, const N: usize> Not for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn not(self) -> Self {
        Self::from_raw(!self.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type BB = BitBoard<u64, 8>;

    #[test]
    fn full_u64_board_masks_every_bit() {
        let full = !BB::new();
        assert_eq!(full.count_ones(), 64);
        assert_eq!(full.into_raw(), u64::MAX);
    }

    #[test]
    fn x_is_column_and_y_is_row() {
        let mut b = BB::new();
        b.set(3, 5).unwrap();
        assert_eq!(b.into_raw(), 1u64 << (5 * 8 + 3));
        assert_eq!(b.iter_set_bits().collect::<Vec<_>>(), vec![(3, 5)]);
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let mut b = BB::new();
        assert_eq!(
            b.set(8, 0),
            Err(BitBoardError::IndexOutOfBounds { x: 8, y: 0 })
        );
        assert!(b.get(0, 8).is_err());
        assert!(b.is_empty());
    }

    #[test]
    fn oversized_board_fails_try_new() {
        assert!(BitBoard::<u16, 5>::try_new().is_err());
        assert!(BitBoard::<u16, 4>::try_new().is_ok());
    }
}
