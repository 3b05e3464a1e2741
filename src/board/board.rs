/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Deref, Index},
};

use anyhow::{bail, Result};

use super::{Color, Direction, Move, Piece, PieceKind, Placement, Square};

/// The 64 cells of a chess board, indexed by [`Square`].
///
/// Cells only change through [`Board::apply`], which writes a [`Move`]'s placement list
/// (or its inverse), so every change to a board can be undone exactly.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board([Piece; Square::COUNT]);

impl Board {
    /// Creates a new, empty [`Board`].
    #[inline(always)]
    pub const fn new() -> Self {
        Self([Piece::EMPTY; Square::COUNT])
    }

    /// Parses the piece-placement field of a FEN string, such as `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR`.
    pub fn from_fen(placements: &str) -> Result<Self> {
        let mut board = Self::new();
        let ranks = placements.split('/').collect::<Vec<_>>();
        if ranks.len() != 8 {
            bail!("FEN placements must have 8 ranks. Got {} in {placements:?}", ranks.len());
        }

        // FEN lists rank 8 first
        for (rank, row) in ranks.into_iter().rev().enumerate() {
            let mut file = 0;
            for c in row.chars() {
                if let Some(empty) = c.to_digit(10) {
                    file += empty as u8;
                    if file > 8 {
                        bail!("Too many squares on rank {} in {placements:?}", rank + 1);
                    }
                } else {
                    if file >= 8 {
                        bail!("Too many squares on rank {} in {placements:?}", rank + 1);
                    }
                    board.0[Square::new(file, rank as u8).index()] = Piece::from_uci(c)?;
                    file += 1;
                }
            }

            if file != 8 {
                bail!(
                    "Rank {} must describe exactly 8 squares in {placements:?}. Got {file}",
                    rank + 1
                );
            }
        }

        Ok(board)
    }

    /// Generates the piece-placement field of a FEN string for this board.
    pub fn to_fen(&self) -> String {
        let mut placements = String::with_capacity(64);

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let piece = self[Square::new(file, rank)];
                if piece.is_empty() {
                    empty += 1;
                    continue;
                }

                if empty > 0 {
                    placements.push_str(&empty.to_string());
                    empty = 0;
                }
                placements.push(piece.to_uci());
            }

            if empty > 0 {
                placements.push_str(&empty.to_string());
            }
            if rank > 0 {
                placements.push('/');
            }
        }

        placements
    }

    /// Writes every placement, in order.
    #[inline(always)]
    pub fn apply(&mut self, placements: &[Placement]) {
        for placement in placements {
            self.0[placement.square.index()] = placement.piece;
        }
    }

    /// Plays `mv` on this board.
    #[inline(always)]
    pub fn apply_move(&mut self, mv: &Move) {
        self.apply(mv.placements());
    }

    /// Takes `mv` back, assuming it was the last move played on this board.
    #[inline(always)]
    pub fn undo_move(&mut self, mv: &Move) {
        self.apply(mv.inverse());
    }

    /// Copies `self` and returns the [`Board`] after having played `mv`.
    #[inline(always)]
    pub fn with_move_applied(&self, mv: &Move) -> Self {
        let mut copied = *self;
        copied.apply_move(mv);
        copied
    }

    /// Plays `mv` on this board until the returned guard is dropped, at which point `mv` is taken back.
    ///
    /// The board is restored on every path out of the scope that holds the guard,
    /// including early returns and unwinding.
    ///
    /// # Example
    /// ```
    /// # use arbiter::*;
    /// let mut board = Board::default();
    /// let mv = Move::new(&board, Square::G1, Square::F3, MoveKind::Quiet);
    /// {
    ///     let simulated = board.simulate(&mv);
    ///     assert_eq!(simulated[Square::F3], Piece::WHITE_KNIGHT);
    /// }
    /// assert_eq!(board, Board::default());
    /// ```
    #[inline(always)]
    pub fn simulate<'a>(&'a mut self, mv: &'a Move) -> Simulation<'a> {
        self.apply_move(mv);
        Simulation { board: self, mv }
    }

    /// Returns `true` if there is no piece on `square`.
    #[inline(always)]
    pub const fn is_empty(&self, square: Square) -> bool {
        self.0[square.index()].is_empty()
    }

    /// Iterates over every occupied square and its piece.
    #[inline(always)]
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter()
            .map(|square| (square, self[square]))
            .filter(|(_, piece)| piece.is_occupied())
    }

    /// Iterates over every square occupied by `color` and its piece.
    #[inline(always)]
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.is_color(color))
    }

    /// The square of `color`'s King, if they have one.
    #[inline(always)]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceKind::King);
        Square::iter().find(|&square| self[square] == king)
    }

    /// Number of pieces of the given color and kind on the board.
    #[inline(always)]
    pub fn count(&self, piece: Piece) -> usize {
        self.0.iter().filter(|&&p| p == piece).count()
    }

    /// The squares a slider on `from` can reach in `direction`: every empty square, up to and
    /// including the first occupied one, stopping at the edge of the board.
    #[inline(always)]
    pub fn slide(&self, from: Square, direction: Direction) -> impl Iterator<Item = Square> + '_ {
        from.ray(direction)
            .until(move |square| self[square].is_occupied())
    }
}

impl Index<Square> for Board {
    type Output = Piece;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self.0[index.index()]
    }
}

impl Default for Board {
    /// Standard starting position for Chess.
    fn default() -> Self {
        let mut board = Self::new();
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        for color in Color::all() {
            for (file, kind) in back_rank.into_iter().enumerate() {
                let file = file as u8;
                board.0[Square::new(file, color.home_rank()).index()] = Piece::new(color, kind);
                board.0[Square::new(file, color.pawn_rank()).index()] =
                    Piece::new(color, PieceKind::Pawn);
            }
        }

        board
    }
}

impl fmt::Display for Board {
    /// Displays the board as an 8x8 grid of FEN letters, rank 8 at the top.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{}|", rank + 1)?;
            for file in 0..8 {
                write!(f, " {}", self[Square::new(file, rank)])?;
            }
            writeln!(f)?;
        }
        write!(f, " +----------------\n   a b c d e f g h")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

/// A [`Board`] with a [`Move`] temporarily played on it. See [`Board::simulate`].
///
/// Dropping the guard takes the move back.
pub struct Simulation<'a> {
    board: &'a mut Board,
    mv: &'a Move,
}

impl Deref for Simulation<'_> {
    type Target = Board;
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        self.board
    }
}

impl Drop for Simulation<'_> {
    #[inline(always)]
    fn drop(&mut self) {
        self.board.undo_move(self.mv);
    }
}
