/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Board, Color, Direction, PieceKind, Square, SquareSet};

/// `(files, ranks)` offsets of every Knight jump.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// `(files, ranks)` offsets of every King step.
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// The directions a sliding piece of `kind` travels in, or an empty slice for non-sliders.
#[inline(always)]
pub const fn slider_directions(kind: PieceKind) -> &'static [Direction] {
    match kind {
        PieceKind::Bishop => &Direction::DIAGONAL,
        PieceKind::Rook => &Direction::ORTHOGONAL,
        PieceKind::Queen => &Direction::ALL,
        _ => &[],
    }
}

/// Every square reachable from `from` by one of `offsets`, skipping any that would leave the board.
#[inline(always)]
pub fn offset_squares(from: Square, offsets: &[(i8, i8)]) -> impl Iterator<Item = Square> + '_ {
    offsets
        .iter()
        .filter_map(move |&(files, ranks)| from.offset(files, ranks))
}

/// The two squares diagonally in front of a Pawn of `color` on `from`.
///
/// Unlike a Pawn's moves, these are the squares it threatens: never straight ahead, and never
/// an en passant square.
///
/// # Example
/// ```
/// # use arbiter::*;
/// let attacks = pawn_attacks(Square::E4, Color::Black);
/// assert_eq!(attacks.iter().collect::<Vec<_>>(), [Square::D3, Square::F3]);
/// assert_eq!(pawn_attacks(Square::A2, Color::White).len(), 1);
/// ```
#[inline(always)]
pub fn pawn_attacks(from: Square, color: Color) -> SquareSet {
    [-1, 1]
        .into_iter()
        .filter_map(|files| from.offset(files, color.forward()))
        .collect()
}

/// Every square the piece on `from` threatens, regardless of what stands there.
///
/// Sliding attacks run up to and including the first occupied square in each direction.
///
/// # Panics
///
/// If `from` is empty.
pub fn attacks(board: &Board, from: Square) -> SquareSet {
    let Some((color, kind)) = board[from].parts() else {
        panic!("Cannot compute attacks for empty square {from}");
    };

    match kind {
        PieceKind::Pawn => pawn_attacks(from, color),
        PieceKind::Knight => offset_squares(from, &KNIGHT_OFFSETS).collect(),
        PieceKind::King => offset_squares(from, &KING_OFFSETS).collect(),
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => slider_directions(kind)
            .iter()
            .flat_map(|&direction| board.slide(from, direction))
            .collect(),
    }
}

/// The enemy-occupied squares the piece on `from` attacks.
///
/// # Panics
///
/// If `from` is empty.
///
/// # Example
/// ```
/// # use arbiter::*;
/// let position = Position::from_fen("4k3/8/8/8/8/3p1P2/4P3/4K3 w - - 0 1").unwrap();
/// let targets = targets(position.board(), Square::E2);
/// assert_eq!(targets.iter().collect::<Vec<_>>(), [Square::D3]);
/// ```
pub fn targets(board: &Board, from: Square) -> SquareSet {
    let piece = board[from];
    attacks(board, from)
        .into_iter()
        .filter(|&square| board[square].is_enemy_of(piece))
        .collect()
}

/// Returns `true` if the King on `king_square` is attacked by any opposing piece.
///
/// Every enemy piece's [`targets`] are computed and searched for the King's square.
/// An empty `king_square` is never in check.
///
/// # Example
/// ```
/// # use arbiter::*;
/// let position = Position::from_fen("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1").unwrap();
/// assert!(in_check(position.board(), Square::E1));
/// assert!(!in_check(position.board(), Square::E8));
/// ```
pub fn in_check(board: &Board, king_square: Square) -> bool {
    let king = board[king_square];
    board
        .pieces()
        .filter(|(_, piece)| piece.is_enemy_of(king))
        .any(|(square, _)| targets(board, square).contains(king_square))
}

/// Returns `true` if `color`'s King is in check. A side without a King is never in check.
#[inline(always)]
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king_square(color)
        .is_some_and(|king| in_check(board, king))
}

/// All squares holding a piece that attacks the King on `king_square`.
pub fn checkers(board: &Board, king_square: Square) -> SquareSet {
    let king = board[king_square];
    board
        .pieces()
        .filter(|(_, piece)| piece.is_enemy_of(king))
        .filter(|&(square, _)| targets(board, square).contains(king_square))
        .map(|(square, _)| square)
        .collect()
}

/// Returns `true` if any piece of color `by` could capture on `square`, were an enemy piece standing there.
pub fn is_attacked(board: &Board, square: Square, by: Color) -> bool {
    board
        .pieces_of(by)
        .any(|(from, _)| attacks(board, from).contains(square))
}

/// The squares on which a check from `attacker` against `king_square` can be answered by a
/// capture or a block: the attacker's own square, plus every square on its ray up to but
/// not including the King.
pub fn blocking_squares(board: &Board, attacker: Square, king_square: Square) -> SquareSet {
    let mut squares = SquareSet::from_square(attacker);

    let is_slider = board[attacker]
        .kind()
        .is_some_and(|kind| !slider_directions(kind).is_empty());

    if is_slider {
        if let Some(direction) = Direction::between(attacker, king_square) {
            squares.extend(
                attacker
                    .ray(direction)
                    .take_while(|&square| square != king_square),
            );
        }
    }

    squares
}
