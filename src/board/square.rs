/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};

use super::Color;

/// Defines an associated constant on [`Square`] for every named square of the board.
macro_rules! named_squares {
    ($($name:ident = $file:literal, $rank:literal;)*) => {
        impl Square {
            $(pub const $name: Self = Self::new($file, $rank);)*
        }
    };
}

/// Represents a single square on an `8x8` chess board.
///
/// Squares use [Least Significant File Mapping](https://www.chessprogramming.org/Square_Mapping_Considerations#Deduction_on_Files_and_Ranks),
/// so `square = file + rank * 8`, where both the file and the rank are 0-indexed:
/// ```text
/// 8| 56 57 58 59 60 61 62 63
/// 7| 48 49 50 51 52 53 54 55
/// 6| 40 41 42 43 44 45 46 47
/// 5| 32 33 34 35 36 37 38 39
/// 4| 24 25 26 27 28 29 30 31
/// 3| 16 17 18 19 20 21 22 23
/// 2|  8  9 10 11 12 13 14 15
/// 1|  0  1  2  3  4  5  6  7
///  +------------------------
///    a  b  c  d  e  f  g  h
/// ```
///
/// The absence of a square (such as "no en passant target") is expressed as `Option<Square>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Square(pub(crate) u8);

#[rustfmt::skip]
named_squares! {
    A1 = 0, 0; B1 = 1, 0; C1 = 2, 0; D1 = 3, 0; E1 = 4, 0; F1 = 5, 0; G1 = 6, 0; H1 = 7, 0;
    A2 = 0, 1; B2 = 1, 1; C2 = 2, 1; D2 = 3, 1; E2 = 4, 1; F2 = 5, 1; G2 = 6, 1; H2 = 7, 1;
    A3 = 0, 2; B3 = 1, 2; C3 = 2, 2; D3 = 3, 2; E3 = 4, 2; F3 = 5, 2; G3 = 6, 2; H3 = 7, 2;
    A4 = 0, 3; B4 = 1, 3; C4 = 2, 3; D4 = 3, 3; E4 = 4, 3; F4 = 5, 3; G4 = 6, 3; H4 = 7, 3;
    A5 = 0, 4; B5 = 1, 4; C5 = 2, 4; D5 = 3, 4; E5 = 4, 4; F5 = 5, 4; G5 = 6, 4; H5 = 7, 4;
    A6 = 0, 5; B6 = 1, 5; C6 = 2, 5; D6 = 3, 5; E6 = 4, 5; F6 = 5, 5; G6 = 6, 5; H6 = 7, 5;
    A7 = 0, 6; B7 = 1, 6; C7 = 2, 6; D7 = 3, 6; E7 = 4, 6; F7 = 5, 6; G7 = 6, 6; H7 = 7, 6;
    A8 = 0, 7; B8 = 1, 7; C8 = 2, 7; D8 = 3, 7; E8 = 4, 7; F8 = 5, 7; G8 = 6, 7; H8 = 7, 7;
}

impl Square {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 63;
    pub const COUNT: usize = 64;

    /// Returns an iterator over all squares, from `a1` to `h8`.
    ///
    /// # Example
    /// ```
    /// # use arbiter::Square;
    /// let mut iter = Square::iter();
    /// assert_eq!(iter.len(), 64);
    /// assert_eq!(iter.next().unwrap(), Square::A1);
    /// assert_eq!(iter.last().unwrap(), Square::H8);
    /// ```
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    /// Creates a new [`Square`] from a 0-indexed file and rank.
    ///
    /// # Example
    /// ```
    /// # use arbiter::Square;
    /// assert_eq!(Square::new(2, 3), Square::C4);
    /// ```
    #[inline(always)]
    pub const fn new(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8, "File and rank must be between [0,8)");
        Self(file | rank << 3)
    }

    /// Creates a new [`Square`] from the provided index value, without error checking.
    ///
    /// # Panics
    ///
    /// If `index` is greater than `63` and debug assertions are enabled.
    #[inline(always)]
    pub const fn from_index_unchecked(index: usize) -> Self {
        debug_assert!(index < 64, "Index must be between [0,64)");
        Self(index as u8)
    }

    /// Returns this [`Square`] as a `usize`, for indexing into the board.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// The 0-indexed file (column) of this square; `a` is `0`.
    #[inline(always)]
    pub const fn file(&self) -> u8 {
        self.0 % 8
    }

    /// The 0-indexed rank (row) of this square; rank `1` is `0`.
    #[inline(always)]
    pub const fn rank(&self) -> u8 {
        self.0 / 8
    }

    /// Returns `true` if this is a light square (`h1` is light, `a1` is dark).
    #[inline(always)]
    pub const fn is_light(&self) -> bool {
        (self.file() + self.rank()) % 2 == 1
    }

    /// Moves this square by `files` columns and `ranks` rows.
    ///
    /// The destination index is computed first, then its file and rank are recomputed
    /// and compared against the requested deltas, so a step that would wrap around the
    /// edge of the board (e.g. from the h-file onto the a-file) yields `None`.
    ///
    /// # Example
    /// ```
    /// # use arbiter::Square;
    /// assert_eq!(Square::G1.offset(-1, 2), Some(Square::F3));
    /// assert_eq!(Square::H1.offset(1, 0), None);
    /// assert_eq!(Square::A8.offset(0, 1), None);
    /// ```
    #[inline(always)]
    pub const fn offset(self, files: i8, ranks: i8) -> Option<Self> {
        let index = self.0 as i8 + ranks * 8 + files;
        if index < Self::MIN as i8 || index > Self::MAX as i8 {
            return None;
        }

        let to = Self(index as u8);
        if to.file() as i8 - self.file() as i8 != files || to.rank() as i8 - self.rank() as i8 != ranks
        {
            return None;
        }

        Some(to)
    }

    /// Takes a single step in `direction`, or `None` at the edge of the board.
    #[inline(always)]
    pub const fn step(self, direction: Direction) -> Option<Self> {
        let (files, ranks) = direction.delta();
        self.offset(files, ranks)
    }

    /// Returns a [`Ray`] of every square from here (exclusive) to the edge of the board in `direction`.
    ///
    /// # Example
    /// ```
    /// # use arbiter::{Direction, Square};
    /// let ray = Square::F6.ray(Direction::NorthEast).collect::<Vec<_>>();
    /// assert_eq!(ray, [Square::G7, Square::H8]);
    /// ```
    #[inline(always)]
    pub const fn ray(self, direction: Direction) -> Ray {
        Ray {
            current: Some(self),
            direction,
        }
    }

    /// Parses a [`Square`] from its name, such as `"e4"`.
    ///
    /// # Example
    /// ```
    /// # use arbiter::Square;
    /// assert_eq!(Square::from_uci("e4").unwrap(), Square::E4);
    /// assert!(Square::from_uci("i9").is_err());
    /// ```
    pub fn from_uci(name: &str) -> Result<Self> {
        let mut chars = name.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Square name must be exactly two characters. Got {name:?}");
        };

        let file = match file.to_ascii_lowercase() {
            f @ 'a'..='h' => f as u8 - b'a',
            _ => bail!("Invalid file {file:?} in square name {name:?}"),
        };
        let rank = rank
            .to_digit(10)
            .filter(|r| (1..=8).contains(r))
            .ok_or(anyhow!("Invalid rank {rank:?} in square name {name:?}"))?;

        Ok(Self::new(file, rank as u8 - 1))
    }

    /// Converts this [`Square`] to its name, such as `"e4"`.
    #[inline(always)]
    pub fn to_uci(&self) -> String {
        format!("{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }

    /// The square on which `color`'s King starts the game.
    #[inline(always)]
    pub const fn king_home(color: Color) -> Self {
        Self::new(4, color.home_rank())
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Square {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for Square {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_uci(), self.0)
    }
}

/// One of the eight rank, file or diagonal directions a piece can travel in.
///
/// "North" is towards rank 8 and "East" is towards the h-file.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Directions a Rook travels in.
    pub const ORTHOGONAL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Directions a Bishop travels in.
    pub const DIAGONAL: [Self; 4] = [
        Self::NorthEast,
        Self::SouthEast,
        Self::SouthWest,
        Self::NorthWest,
    ];

    /// Directions a Queen or King travels in.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// The `(files, ranks)` delta of a single step in this direction.
    #[inline(always)]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Self::North => (0, 1),
            Self::NorthEast => (1, 1),
            Self::East => (1, 0),
            Self::SouthEast => (1, -1),
            Self::South => (0, -1),
            Self::SouthWest => (-1, -1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, 1),
        }
    }

    /// The direction to travel from `from` to reach `to` along a rank, file or diagonal.
    ///
    /// Returns `None` if the squares are equal or do not share a line.
    ///
    /// # Example
    /// ```
    /// # use arbiter::{Direction, Square};
    /// assert_eq!(Direction::between(Square::A1, Square::H8), Some(Direction::NorthEast));
    /// assert_eq!(Direction::between(Square::E1, Square::A1), Some(Direction::West));
    /// assert_eq!(Direction::between(Square::G1, Square::F3), None);
    /// ```
    pub fn between(from: Square, to: Square) -> Option<Self> {
        let files = to.file() as i8 - from.file() as i8;
        let ranks = to.rank() as i8 - from.rank() as i8;

        if (files, ranks) == (0, 0) || (files != 0 && ranks != 0 && files.abs() != ranks.abs()) {
            return None;
        }

        let delta = (files.signum(), ranks.signum());
        Self::ALL.into_iter().find(|dir| dir.delta() == delta)
    }
}

/// An iterator over the squares from an origin (exclusive) to the edge of the board, in one [`Direction`].
///
/// This is the single ray-walking primitive behind sliding-piece movement, attack detection,
/// castling path checks and check-blocking squares.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    current: Option<Square>,
    direction: Direction,
}

impl Ray {
    /// Yields squares until (and including) the first square for which `stop` returns `true`.
    ///
    /// # Example
    /// ```
    /// # use arbiter::{Direction, Square};
    /// let ray = Square::A1
    ///     .ray(Direction::North)
    ///     .until(|sq| sq == Square::A3)
    ///     .collect::<Vec<_>>();
    /// assert_eq!(ray, [Square::A2, Square::A3]);
    /// ```
    #[inline(always)]
    pub fn until<P: FnMut(Square) -> bool>(self, stop: P) -> Until<P> {
        Until {
            ray: self,
            stop,
            done: false,
        }
    }
}

impl Iterator for Ray {
    type Item = Square;
    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.current = self.current?.step(self.direction);
        self.current
    }
}

/// A [`Ray`] that halts after the first square matching a stop predicate. See [`Ray::until`].
#[derive(Clone, Copy, Debug)]
pub struct Until<P> {
    ray: Ray,
    stop: P,
    done: bool,
}

impl<P: FnMut(Square) -> bool> Iterator for Until<P> {
    type Item = Square;
    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let square = self.ray.next()?;
        self.done = (self.stop)(square);
        Some(square)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_square_file_and_rank() {
        assert_eq!(Square::A1.index(), 0);
        assert_eq!(Square::H8.index(), 63);
        assert_eq!(Square::E4.file(), 4);
        assert_eq!(Square::E4.rank(), 3);
        assert_eq!(Square::new(7, 0), Square::H1);
    }

    #[test]
    fn test_square_names_round_trip() {
        for square in Square::iter() {
            assert_eq!(Square::from_uci(&square.to_uci()).unwrap(), square);
        }
        assert!(Square::from_uci("").is_err());
        assert!(Square::from_uci("e").is_err());
        assert!(Square::from_uci("e44").is_err());
        assert!(Square::from_uci("j4").is_err());
        assert!(Square::from_uci("e0").is_err());
        assert!(Square::from_uci("e9").is_err());
    }

    #[test]
    fn test_offsets_reject_wraparound() {
        assert_eq!(Square::H4.offset(1, 0), None);
        assert_eq!(Square::A4.offset(-1, 0), None);
        assert_eq!(Square::H4.offset(1, 1), None);
        assert_eq!(Square::B1.offset(-2, 1), None);
        assert_eq!(Square::G8.offset(2, -1), None);
        assert_eq!(Square::A1.offset(0, -1), None);
        assert_eq!(Square::B1.offset(-1, 2), Some(Square::A3));
    }

    #[test]
    fn test_rays_stop_at_edges() {
        assert_eq!(Square::H1.ray(Direction::East).count(), 0);
        assert_eq!(Square::H1.ray(Direction::North).count(), 7);
        assert_eq!(Square::D4.ray(Direction::SouthWest).count(), 3);
        assert_eq!(Square::A8.ray(Direction::SouthEast).last(), Some(Square::H1));
    }

    #[test]
    fn test_ray_until_is_inclusive() {
        let squares = Square::E1
            .ray(Direction::West)
            .until(|sq| sq == Square::C1)
            .collect::<Vec<_>>();
        assert_eq!(squares, [Square::D1, Square::C1]);
    }

    #[test]
    fn test_direction_between() {
        assert_eq!(Direction::between(Square::E1, Square::E8), Some(Direction::North));
        assert_eq!(Direction::between(Square::H8, Square::A1), Some(Direction::SouthWest));
        assert_eq!(Direction::between(Square::A2, Square::B4), None);
        assert_eq!(Direction::between(Square::C3, Square::C3), None);
    }

    #[test]
    fn test_square_colors() {
        assert!(!Square::A1.is_light());
        assert!(Square::H1.is_light());
        assert!(Square::D1.is_light());
        assert!(!Square::E1.is_light());
    }
}
