/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{anyhow, bail, Result};
use arrayvec::ArrayVec;

use super::{Board, Piece, PieceKind, Square};

/// Maximum possible number of moves in a given chess position.
///
/// Found [here](<https://www.chessprogramming.org/Chess_Position#cite_note-4>)
pub const MAX_NUM_MOVES: usize = 218;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_NUM_MOVES`] moves.
pub type MoveList = ArrayVec<Move, MAX_NUM_MOVES>;

/// Most cells a single move can write: castling touches two squares for each of King and Rook.
pub const MAX_PLACEMENTS: usize = 4;

/// The ordered list of cell writes that make up one move.
pub type Placements = ArrayVec<Placement, MAX_PLACEMENTS>;

/// A single write to the board: `piece` is placed on `square` (or the square is emptied).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Placement {
    pub square: Square,
    pub piece: Piece,
}

impl Placement {
    #[inline(always)]
    pub const fn new(square: Square, piece: Piece) -> Self {
        Self { square, piece }
    }
}

/// Represents the different kinds of moves that can be made during a chess game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum MoveKind {
    /// A piece moves to an empty square.
    Quiet,

    /// A Pawn's first move, advancing two squares forward.
    PawnDoublePush,

    /// The King and the h-file Rook slide past each other.
    ShortCastle,

    /// The King and the a-file Rook slide past each other.
    LongCastle,

    /// A piece moves onto a square occupied by an enemy piece, removing it from the board.
    Capture,

    /// A Pawn captures an enemy Pawn that just double-pushed past it.
    EnPassantCapture,

    /// A Pawn reaches the last rank and becomes the given kind.
    Promote(PieceKind),

    /// A Pawn captures onto the last rank and becomes the given kind.
    CaptureAndPromote(PieceKind),
}

impl MoveKind {
    /// Returns `true` for any kind of capture (including en passant).
    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        matches!(
            self,
            Self::Capture | Self::EnPassantCapture | Self::CaptureAndPromote(_)
        )
    }

    /// Returns `true` for either castling move.
    #[inline(always)]
    pub const fn is_castle(&self) -> bool {
        matches!(self, Self::ShortCastle | Self::LongCastle)
    }

    /// The kind a Pawn is promoted to, if this is a promotion.
    #[inline(always)]
    pub const fn promotion(&self) -> Option<PieceKind> {
        match self {
            Self::Promote(kind) | Self::CaptureAndPromote(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for MoveKind {
    /// Displays a human-readable description for this [`MoveKind`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "Quiet"),
            Self::PawnDoublePush => write!(f, "Pawn Double Push"),
            Self::ShortCastle => write!(f, "Short Castle"),
            Self::LongCastle => write!(f, "Long Castle"),
            Self::Capture => write!(f, "Capture"),
            Self::EnPassantCapture => write!(f, "En Passant Capture"),
            Self::Promote(kind) => write!(f, "Promotion ({})", kind.name()),
            Self::CaptureAndPromote(kind) => write!(f, "Capture and Promotion ({})", kind.name()),
        }
    }
}

/// A move of one piece, together with the exact board delta it causes.
///
/// A [`Move`] is built against the board it will be played on. Its placement list writes every
/// affected cell (including the Rook on castling and the captured Pawn on en passant), and its
/// inverse list writes those cells back to their previous contents, in reverse order.
/// Applying the placements and then the inverse is the identity on that board.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Move {
    piece: Piece,
    from: Square,
    to: Square,
    kind: MoveKind,
    placements: Placements,
    inverse: Placements,
}

impl Move {
    /// Creates a new [`Move`] of the piece on `from` to `to`, against the contents of `board`.
    ///
    /// For castling, `from` and `to` are the King's squares; the Rook's squares are derived
    /// from the side of the board being castled to.
    ///
    /// # Panics
    ///
    /// If `from` is empty. Moves are only ever built by the move generator from occupied squares.
    ///
    /// # Example
    /// ```
    /// # use arbiter::*;
    /// let board = Board::default();
    /// let e2e4 = Move::new(&board, Square::E2, Square::E4, MoveKind::PawnDoublePush);
    /// assert_eq!(e2e4.to_string(), "e2e4");
    /// assert_eq!(e2e4.piece(), Piece::WHITE_PAWN);
    /// ```
    pub fn new(board: &Board, from: Square, to: Square, kind: MoveKind) -> Self {
        let piece = board[from];
        assert!(piece.is_occupied(), "Cannot build a move from empty square {from}");

        let mut placements = Placements::new();
        placements.push(Placement::new(from, Piece::EMPTY));

        match kind {
            MoveKind::ShortCastle | MoveKind::LongCastle => {
                let (rook_from, rook_to) = Self::castling_rook_squares(kind, from.rank());
                placements.push(Placement::new(rook_from, Piece::EMPTY));
                placements.push(Placement::new(to, piece));
                placements.push(Placement::new(rook_to, board[rook_from]));
            }

            MoveKind::EnPassantCapture => {
                let captured = Square::new(to.file(), from.rank());
                placements.push(Placement::new(captured, Piece::EMPTY));
                placements.push(Placement::new(to, piece));
            }

            MoveKind::Promote(promotion) | MoveKind::CaptureAndPromote(promotion) => {
                placements.push(Placement::new(to, piece.promoted(promotion)));
            }

            MoveKind::Quiet | MoveKind::PawnDoublePush | MoveKind::Capture => {
                placements.push(Placement::new(to, piece));
            }
        }

        // Every written cell is restored to what it held before, newest write first.
        let inverse = placements
            .iter()
            .rev()
            .map(|placement| Placement::new(placement.square, board[placement.square]))
            .collect();

        Self {
            piece,
            from,
            to,
            kind,
            placements,
            inverse,
        }
    }

    /// The Rook's source and destination squares for a castling move on `rank`.
    #[inline(always)]
    fn castling_rook_squares(kind: MoveKind, rank: u8) -> (Square, Square) {
        if kind == MoveKind::ShortCastle {
            (Square::new(7, rank), Square::new(5, rank))
        } else {
            (Square::new(0, rank), Square::new(3, rank))
        }
    }

    /// The piece being moved, as it stood on the source square.
    #[inline(always)]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    /// Fetches the source (or "from") part of this [`Move`], as a [`Square`].
    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    /// Fetches the destination (or "to") part of this [`Move`], as a [`Square`].
    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Fetches the [`MoveKind`] of this [`Move`].
    #[inline(always)]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// The cell writes that play this move.
    #[inline(always)]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// The cell writes that take this move back.
    #[inline(always)]
    pub fn inverse(&self) -> &[Placement] {
        &self.inverse
    }

    /// Returns `true` if this [`Move`] is a capture of any kind (capture, promotion-capture, en passant capture).
    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.kind.is_capture()
    }

    /// Returns `true` if this [`Move`] is en passant.
    #[inline(always)]
    pub const fn is_en_passant(&self) -> bool {
        matches!(self.kind, MoveKind::EnPassantCapture)
    }

    /// Returns `true` if this [`Move`] is castling, to either side.
    #[inline(always)]
    pub const fn is_castle(&self) -> bool {
        self.kind.is_castle()
    }

    /// Returns `true` if this [`Move`] is a Pawn advancing two squares.
    #[inline(always)]
    pub const fn is_pawn_double_push(&self) -> bool {
        matches!(self.kind, MoveKind::PawnDoublePush)
    }

    /// The kind a Pawn is promoted to, if this is a promotion.
    #[inline(always)]
    pub const fn promotion(&self) -> Option<PieceKind> {
        self.kind.promotion()
    }

    /// The square of the piece this move removes from the board, if any.
    ///
    /// This is the destination for ordinary captures, and the square behind it for en passant.
    #[inline(always)]
    pub const fn captured_square(&self) -> Option<Square> {
        if self.is_en_passant() {
            Some(Square::new(self.to.file(), self.from.rank()))
        } else if self.is_capture() {
            Some(self.to)
        } else {
            None
        }
    }

    /// Converts this [`Move`] to coordinate notation, such as `e2e4` or `e7e8q`.
    ///
    /// Castling is written as the King's two squares, e.g. `e1g1`.
    pub fn to_uci(&self) -> String {
        if let Some(promotion) = self.promotion() {
            format!("{}{}{}", self.from, self.to, promotion)
        } else {
            format!("{}{}", self.from, self.to)
        }
    }

    /// Splits a coordinate-notation string such as `e7e8q` into its squares and optional promotion.
    ///
    /// # Example
    /// ```
    /// # use arbiter::*;
    /// let (from, to, promotion) = Move::parse_coordinates("e7e8q").unwrap();
    /// assert_eq!((from, to, promotion), (Square::E7, Square::E8, Some(PieceKind::Queen)));
    /// assert!(Move::parse_coordinates("e7").is_err());
    /// ```
    pub fn parse_coordinates(uci: &str) -> Result<(Square, Square, Option<PieceKind>)> {
        let uci = uci.trim();
        let from = uci.get(0..2).ok_or(anyhow!(
            "Move str must contain a `from` square. Got {uci:?}"
        ))?;
        let to = uci
            .get(2..4)
            .ok_or(anyhow!("Move str must contain a `to` square. Got {uci:?}"))?;

        let promotion = match uci.get(4..) {
            None | Some("") => None,
            Some(promotion) => {
                let mut chars = promotion.chars();
                let (Some(c), None) = (chars.next(), chars.next()) else {
                    bail!("Trailing characters after move {uci:?}");
                };
                Some(PieceKind::from_uci(c)?)
            }
        };

        Ok((from.parse()?, to.parse()?, promotion))
    }
}

impl fmt::Display for Move {
    /// A [`Move`] is displayed in coordinate notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for Move {
    /// Debug formatting also displays the move's [`MoveKind`] in a human-readable format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({})", self.kind)
    }
}

impl<T: AsRef<str>> PartialEq<T> for Move {
    #[inline(always)]
    fn eq(&self, other: &T) -> bool {
        self.to_uci().eq(other.as_ref())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::*;

    /// Plays `mv` on a copy of `board`, takes it back, and asserts nothing changed.
    fn assert_reversible(board: &Board, mv: &Move) {
        let mut copy = *board;
        copy.apply(mv.placements());
        assert_ne!(&copy, board, "{mv:?} did not change the board");
        copy.apply(mv.inverse());
        assert_eq!(&copy, board, "{mv:?} did not undo cleanly");
    }

    fn board(fen: &str) -> Board {
        Position::from_fen(fen).unwrap().board
    }

    #[test]
    fn test_quiet_and_capture_placements() {
        let board = board("4k3/8/8/3p4/4N3/8/8/4K3 w - - 0 1");

        let quiet = Move::new(&board, Square::E4, Square::F6, MoveKind::Quiet);
        assert_eq!(
            quiet.placements(),
            [
                Placement::new(Square::E4, Piece::EMPTY),
                Placement::new(Square::F6, Piece::WHITE_KNIGHT)
            ]
        );
        assert_reversible(&board, &quiet);

        let capture = Move::new(&board, Square::E4, Square::D5, MoveKind::Capture);
        assert_eq!(
            capture.inverse(),
            [
                Placement::new(Square::D5, Piece::BLACK_PAWN),
                Placement::new(Square::E4, Piece::WHITE_KNIGHT)
            ]
        );
        assert_eq!(capture.captured_square(), Some(Square::D5));
        assert_reversible(&board, &capture);
    }

    #[test]
    fn test_castling_moves_both_pieces() {
        let board = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");

        let short = Move::new(&board, Square::E1, Square::G1, MoveKind::ShortCastle);
        let mut after = board;
        after.apply(short.placements());
        assert_eq!(after[Square::G1], Piece::WHITE_KING);
        assert_eq!(after[Square::F1], Piece::WHITE_ROOK);
        assert!(after[Square::E1].is_empty());
        assert!(after[Square::H1].is_empty());
        assert_reversible(&board, &short);

        let long = Move::new(&board, Square::E8, Square::C8, MoveKind::LongCastle);
        after = board;
        after.apply(long.placements());
        assert_eq!(after[Square::C8], Piece::BLACK_KING);
        assert_eq!(after[Square::D8], Piece::BLACK_ROOK);
        assert!(after[Square::A8].is_empty());
        assert_reversible(&board, &long);
    }

    #[test]
    fn test_en_passant_removes_the_passed_pawn() {
        let board = board("4k3/8/8/4Pp2/8/8/8/4K3 w - f6 0 1");
        let ep = Move::new(&board, Square::E5, Square::F6, MoveKind::EnPassantCapture);
        assert_eq!(ep.captured_square(), Some(Square::F5));

        let mut after = board;
        after.apply(ep.placements());
        assert_eq!(after[Square::F6], Piece::WHITE_PAWN);
        assert!(after[Square::F5].is_empty());
        assert!(after[Square::E5].is_empty());
        assert_reversible(&board, &ep);
    }

    #[test]
    fn test_promotion_places_new_piece() {
        let board = board("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1");

        let push = Move::new(&board, Square::A7, Square::A8, MoveKind::Promote(PieceKind::Knight));
        assert_eq!(push.to_string(), "a7a8n");
        let mut after = board;
        after.apply(push.placements());
        assert_eq!(after[Square::A8], Piece::WHITE_KNIGHT);
        assert_reversible(&board, &push);

        let capture = Move::new(
            &board,
            Square::A7,
            Square::B8,
            MoveKind::CaptureAndPromote(PieceKind::Queen),
        );
        assert!(capture.is_capture());
        assert_eq!(capture.promotion(), Some(PieceKind::Queen));
        assert_reversible(&board, &capture);
    }

    #[test]
    fn test_move_kind_flags() {
        assert!(MoveKind::EnPassantCapture.is_capture());
        assert!(MoveKind::CaptureAndPromote(PieceKind::Rook).is_capture());
        assert!(!MoveKind::Promote(PieceKind::Rook).is_capture());
        assert!(!MoveKind::PawnDoublePush.is_capture());
        assert!(MoveKind::LongCastle.is_castle());
        assert!(!MoveKind::Quiet.is_castle());
        assert_eq!(MoveKind::Quiet.promotion(), None);
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(
            Move::parse_coordinates("g1f3").unwrap(),
            (Square::G1, Square::F3, None)
        );
        assert_eq!(
            Move::parse_coordinates("b7c8N").unwrap(),
            (Square::B7, Square::C8, Some(PieceKind::Knight))
        );
        assert!(Move::parse_coordinates("z1f3").is_err());
        assert!(Move::parse_coordinates("e7e8qq").is_err());
        assert!(Move::parse_coordinates("e7e8x").is_err());
    }
}
