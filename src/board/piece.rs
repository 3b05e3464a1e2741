/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut, Neg},
    str::FromStr,
};

use anyhow::{bail, Result};

/// Represents the color of a player or piece.
///
/// In Western chess, White traditionally moves first, and therefore [`Color`] defaults to [`Color::White`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    /// Number of color variants.
    pub const COUNT: usize = 2;

    /// An array of both colors, starting with White.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::White, Self::Black]
    }

    /// Returns this [`Color`]'s opponent.
    ///
    /// # Example
    /// ```
    /// # use arbiter::Color;
    /// assert_eq!(Color::White.opponent(), Color::Black);
    /// assert_eq!(Color::Black.opponent(), Color::White);
    /// ```
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// The sign of this color's piece codes: `1` for White, `-1` for Black.
    #[inline(always)]
    pub const fn sign(&self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// Returns this [`Color`] as a `usize`, for indexing into lists.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// The rank this color's pieces start on (0-indexed).
    #[inline(always)]
    pub const fn home_rank(&self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => 7,
        }
    }

    /// The rank this color's Pawns start on, and may double-step from.
    #[inline(always)]
    pub const fn pawn_rank(&self) -> u8 {
        match self {
            Self::White => 1,
            Self::Black => 6,
        }
    }

    /// The rank on which this color's Pawns promote.
    #[inline(always)]
    pub const fn promotion_rank(&self) -> u8 {
        self.opponent().home_rank()
    }

    /// The number of ranks a Pawn of this color advances per step.
    #[inline(always)]
    pub const fn forward(&self) -> i8 {
        self.sign()
    }

    /// Parses a [`Color`] from the side-to-move field of a FEN string.
    #[inline(always)]
    pub fn from_uci(color: char) -> Result<Self> {
        match color {
            'w' | 'W' => Ok(Self::White),
            'b' | 'B' => Ok(Self::Black),
            _ => bail!("Color must be either 'w' or 'b' (case-insensitive). Found {color:?}"),
        }
    }

    /// Converts this [`Color`] to its FEN char.
    #[inline(always)]
    pub const fn to_uci(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    /// Human-readable name of this [`Color`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl Neg for Color {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self::Output {
        self.opponent()
    }
}

impl<T> Index<Color> for [T; Color::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Color) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Color> for [T; Color::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Color) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" | "W" | "white" => Ok(Self::White),
            "b" | "B" | "black" => Ok(Self::Black),
            _ => bail!("Invalid color {s:?}"),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The six kinds of chess pieces.
///
/// Discriminants are the magnitudes of the signed [`Piece`] codes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(i8)]
pub enum PieceKind {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

impl PieceKind {
    /// The kinds a Pawn may promote to, in the order promotion moves are generated.
    pub const PROMOTIONS: [Self; 4] = [Self::Bishop, Self::Knight, Self::Rook, Self::Queen];

    /// Converts a code magnitude (`1..=6`) back into a [`PieceKind`].
    #[inline(always)]
    pub const fn from_code(code: i8) -> Option<Self> {
        match code {
            1 => Some(Self::Pawn),
            2 => Some(Self::Knight),
            3 => Some(Self::Bishop),
            4 => Some(Self::Rook),
            5 => Some(Self::Queen),
            6 => Some(Self::King),
            _ => None,
        }
    }

    /// Returns `true` if a Pawn may promote to this kind.
    #[inline(always)]
    pub const fn is_promotable(&self) -> bool {
        matches!(self, Self::Knight | Self::Bishop | Self::Rook | Self::Queen)
    }

    /// Parses a [`PieceKind`] from its letter, ignoring case.
    #[inline(always)]
    pub fn from_uci(kind: char) -> Result<Self> {
        match kind {
            'P' | 'p' => Ok(Self::Pawn),
            'N' | 'n' => Ok(Self::Knight),
            'B' | 'b' => Ok(Self::Bishop),
            'R' | 'r' => Ok(Self::Rook),
            'Q' | 'q' => Ok(Self::Queen),
            'K' | 'k' => Ok(Self::King),
            _ => bail!("Invalid char for PieceKind: Got {kind:?}."),
        }
    }

    /// Lowercase letter of this [`PieceKind`].
    #[inline(always)]
    pub const fn to_uci(&self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    /// Human-readable name of this [`PieceKind`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }
}

impl FromStr for PieceKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_uci(c),
            _ => match s.to_ascii_lowercase().as_str() {
                "pawn" => Ok(Self::Pawn),
                "knight" => Ok(Self::Knight),
                "bishop" => Ok(Self::Bishop),
                "rook" => Ok(Self::Rook),
                "queen" => Ok(Self::Queen),
                "king" => Ok(Self::King),
                _ => bail!("Invalid piece kind {s:?}"),
            },
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// The contents of a single board cell, as a signed code.
///
/// White pieces are positive, Black pieces are the negated code of the same kind, and `0` is an
/// empty cell. The sign answers "whose piece" and the magnitude answers "what kind":
/// ```text
///  Pawn  Knight  Bishop  Rook  Queen  King
///    1      2       3      4      5     6    (White)
///   -1     -2      -3     -4     -5    -6    (Black)
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Piece(i8);

impl Piece {
    /// An empty cell.
    pub const EMPTY: Self = Self(0);

    pub const WHITE_PAWN: Self = Self::new(Color::White, PieceKind::Pawn);
    pub const WHITE_KNIGHT: Self = Self::new(Color::White, PieceKind::Knight);
    pub const WHITE_BISHOP: Self = Self::new(Color::White, PieceKind::Bishop);
    pub const WHITE_ROOK: Self = Self::new(Color::White, PieceKind::Rook);
    pub const WHITE_QUEEN: Self = Self::new(Color::White, PieceKind::Queen);
    pub const WHITE_KING: Self = Self::new(Color::White, PieceKind::King);

    pub const BLACK_PAWN: Self = Self::new(Color::Black, PieceKind::Pawn);
    pub const BLACK_KNIGHT: Self = Self::new(Color::Black, PieceKind::Knight);
    pub const BLACK_BISHOP: Self = Self::new(Color::Black, PieceKind::Bishop);
    pub const BLACK_ROOK: Self = Self::new(Color::Black, PieceKind::Rook);
    pub const BLACK_QUEEN: Self = Self::new(Color::Black, PieceKind::Queen);
    pub const BLACK_KING: Self = Self::new(Color::Black, PieceKind::King);

    /// Creates a [`Piece`] of the given color and kind.
    #[inline(always)]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self(kind as i8 * color.sign())
    }

    /// The raw signed code of this [`Piece`].
    #[inline(always)]
    pub const fn code(&self) -> i8 {
        self.0
    }

    /// Returns `true` if this cell holds no piece.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if this cell holds a piece.
    #[inline(always)]
    pub const fn is_occupied(&self) -> bool {
        self.0 != 0
    }

    /// The [`Color`] of this piece, or `None` for an empty cell.
    #[inline(always)]
    pub const fn color(&self) -> Option<Color> {
        match self.0.signum() {
            1 => Some(Color::White),
            -1 => Some(Color::Black),
            _ => None,
        }
    }

    /// The [`PieceKind`] of this piece, or `None` for an empty cell.
    #[inline(always)]
    pub const fn kind(&self) -> Option<PieceKind> {
        PieceKind::from_code(self.0.abs())
    }

    /// Both the color and kind of this piece, or `None` for an empty cell.
    #[inline(always)]
    pub const fn parts(&self) -> Option<(Color, PieceKind)> {
        match (self.color(), self.kind()) {
            (Some(color), Some(kind)) => Some((color, kind)),
            _ => None,
        }
    }

    /// Returns `true` if this is a piece belonging to `color`.
    #[inline(always)]
    pub const fn is_color(&self, color: Color) -> bool {
        self.0.signum() == color.sign()
    }

    /// Returns `true` if this is a piece of the given kind, of either color.
    #[inline(always)]
    pub const fn is_kind(&self, kind: PieceKind) -> bool {
        self.0.abs() == kind as i8
    }

    /// Returns `true` if `self` and `other` are both pieces, of opposing colors.
    #[inline(always)]
    pub const fn is_enemy_of(&self, other: Self) -> bool {
        self.0.signum() * other.0.signum() == -1
    }

    /// The same piece after promoting to `kind`.
    #[inline(always)]
    pub const fn promoted(self, kind: PieceKind) -> Self {
        Self(kind as i8 * self.0.signum())
    }

    /// Parses a [`Piece`] from its FEN letter: uppercase is White, lowercase is Black.
    ///
    /// # Example
    /// ```
    /// # use arbiter::Piece;
    /// assert_eq!(Piece::from_uci('Q').unwrap(), Piece::WHITE_QUEEN);
    /// assert_eq!(Piece::from_uci('n').unwrap(), Piece::BLACK_KNIGHT);
    /// assert_eq!(-Piece::BLACK_KNIGHT, Piece::WHITE_KNIGHT);
    /// ```
    #[inline(always)]
    pub fn from_uci(piece: char) -> Result<Self> {
        let kind = PieceKind::from_uci(piece)?;
        let color = if piece.is_ascii_lowercase() {
            Color::Black
        } else {
            Color::White
        };
        Ok(Self::new(color, kind))
    }

    /// The FEN letter of this piece, or `'.'` for an empty cell.
    #[inline(always)]
    pub const fn to_uci(&self) -> char {
        match self.parts() {
            Some((Color::White, kind)) => kind.to_uci().to_ascii_uppercase(),
            Some((Color::Black, kind)) => kind.to_uci(),
            None => '.',
        }
    }

    /// Human-readable name of this piece, such as `"white queen"`.
    pub fn name(&self) -> String {
        match self.parts() {
            Some((color, kind)) => format!("{} {}", color.name(), kind.name()),
            None => String::from("empty"),
        }
    }
}

impl Neg for Piece {
    type Output = Self;
    /// The same kind of piece, belonging to the other color.
    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl FromStr for Piece {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_uci(c),
            _ => bail!("Invalid str for Piece: Must be a single character. Got {s:?}"),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_uci(), self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_piece_codes_are_signed() {
        assert_eq!(Piece::WHITE_PAWN.code(), 1);
        assert_eq!(Piece::WHITE_KING.code(), 6);
        assert_eq!(Piece::BLACK_PAWN.code(), -1);
        assert_eq!(Piece::BLACK_KING.code(), -6);
        assert_eq!(Piece::EMPTY.code(), 0);
        assert_eq!(-Piece::WHITE_ROOK, Piece::BLACK_ROOK);
        assert_eq!(-Piece::EMPTY, Piece::EMPTY);
    }

    #[test]
    fn test_piece_parts() {
        assert_eq!(
            Piece::BLACK_QUEEN.parts(),
            Some((Color::Black, PieceKind::Queen))
        );
        assert_eq!(Piece::EMPTY.parts(), None);
        assert!(Piece::WHITE_BISHOP.is_color(Color::White));
        assert!(!Piece::WHITE_BISHOP.is_color(Color::Black));
        assert!(!Piece::EMPTY.is_color(Color::White));
        assert!(Piece::WHITE_BISHOP.is_kind(PieceKind::Bishop));
        assert!(Piece::BLACK_BISHOP.is_kind(PieceKind::Bishop));
    }

    #[test]
    fn test_enemies() {
        assert!(Piece::WHITE_PAWN.is_enemy_of(Piece::BLACK_KING));
        assert!(!Piece::WHITE_PAWN.is_enemy_of(Piece::WHITE_KING));
        assert!(!Piece::WHITE_PAWN.is_enemy_of(Piece::EMPTY));
        assert!(!Piece::EMPTY.is_enemy_of(Piece::EMPTY));
    }

    #[test]
    fn test_promotion_keeps_color() {
        assert_eq!(
            Piece::BLACK_PAWN.promoted(PieceKind::Knight),
            Piece::BLACK_KNIGHT
        );
        assert_eq!(
            Piece::WHITE_PAWN.promoted(PieceKind::Queen),
            Piece::WHITE_QUEEN
        );
    }

    #[test]
    fn test_piece_letters() {
        for letter in "PNBRQKpnbrqk".chars() {
            assert_eq!(Piece::from_uci(letter).unwrap().to_uci(), letter);
        }
        assert!(Piece::from_uci('x').is_err());
        assert_eq!("queen".parse::<PieceKind>().unwrap(), PieceKind::Queen);
        assert_eq!("N".parse::<PieceKind>().unwrap(), PieceKind::Knight);
    }
}
