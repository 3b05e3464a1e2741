/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::iter;

use super::{
    is_attacked, offset_squares, pawn_attacks, slider_directions, Board, CastlingRights, Color,
    Context, Direction, Move, MoveKind, MoveList, Piece, PieceKind, Square, KING_OFFSETS,
    KNIGHT_OFFSETS,
};

/// Generates every pseudo-legal move of the piece on `from`.
///
/// Pseudo-legal moves obey how each piece moves, but may leave the mover's own King in check.
/// See [`crate::legal_moves`] for the filtered list.
///
/// # Panics
///
/// If `from` is empty.
///
/// # Example
/// ```
/// # use arbiter::*;
/// let position = Position::default();
/// let moves = pseudo_legal_moves(position.board(), Square::G1, position.context());
/// assert_eq!(moves.len(), 2);
/// ```
pub fn pseudo_legal_moves(board: &Board, from: Square, context: &Context) -> MoveList {
    let Some((color, kind)) = board[from].parts() else {
        panic!("Cannot generate moves for empty square {from}");
    };

    let mut moves = MoveList::new();

    match kind {
        PieceKind::Pawn => generate_pawn_moves(board, from, color, context.ep_square(), &mut moves),

        PieceKind::Knight => generate_offset_moves(board, from, &KNIGHT_OFFSETS, &mut moves),

        PieceKind::King => {
            generate_offset_moves(board, from, &KING_OFFSETS, &mut moves);
            generate_castling_moves(
                board,
                from,
                color,
                context.castling_rights()[color],
                &mut moves,
            );
        }

        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
            generate_slider_moves(board, from, slider_directions(kind), &mut moves)
        }
    }

    moves
}

/// Pushes a [`MoveKind::Quiet`] or [`MoveKind::Capture`] to `to`, unless a friendly piece stands there.
#[inline(always)]
fn serialize_normal_move(board: &Board, from: Square, to: Square, moves: &mut MoveList) {
    let target = board[to];

    if target.is_empty() {
        moves.push(Move::new(board, from, to, MoveKind::Quiet));
    } else if target.is_enemy_of(board[from]) {
        moves.push(Move::new(board, from, to, MoveKind::Capture));
    }
}

fn generate_slider_moves(
    board: &Board,
    from: Square,
    directions: &[Direction],
    moves: &mut MoveList,
) {
    for &direction in directions {
        for to in board.slide(from, direction) {
            serialize_normal_move(board, from, to, moves);
        }
    }
}

fn generate_offset_moves(board: &Board, from: Square, offsets: &[(i8, i8)], moves: &mut MoveList) {
    for to in offset_squares(from, offsets) {
        serialize_normal_move(board, from, to, moves);
    }
}

/// Pushes a Pawn move to `to`, fanning it out into one move per promotion piece if `to` is on the last rank.
#[inline(always)]
fn serialize_pawn_move(
    board: &Board,
    from: Square,
    to: Square,
    color: Color,
    is_capture: bool,
    moves: &mut MoveList,
) {
    if to.rank() == color.promotion_rank() {
        for promotion in PieceKind::PROMOTIONS {
            let kind = if is_capture {
                MoveKind::CaptureAndPromote(promotion)
            } else {
                MoveKind::Promote(promotion)
            };
            moves.push(Move::new(board, from, to, kind));
        }
    } else {
        let kind = if is_capture {
            MoveKind::Capture
        } else {
            MoveKind::Quiet
        };
        moves.push(Move::new(board, from, to, kind));
    }
}

fn generate_pawn_moves(
    board: &Board,
    from: Square,
    color: Color,
    ep_square: Option<Square>,
    moves: &mut MoveList,
) {
    let pawn = board[from];
    let forward = color.forward();

    // Pushes need empty squares; the double push also needs the Pawn on its starting rank
    if let Some(single) = from.offset(0, forward).filter(|&sq| board.is_empty(sq)) {
        serialize_pawn_move(board, from, single, color, false, moves);

        if from.rank() == color.pawn_rank() {
            if let Some(double) = single.offset(0, forward).filter(|&sq| board.is_empty(sq)) {
                moves.push(Move::new(board, from, double, MoveKind::PawnDoublePush));
            }
        }
    }

    for to in pawn_attacks(from, color) {
        if board[to].is_enemy_of(pawn) {
            serialize_pawn_move(board, from, to, color, true, moves);
        } else if ep_square == Some(to) && board.is_empty(to) {
            // The Pawn being passed must still be beside us
            let passed = Square::new(to.file(), from.rank());
            if board[passed] == -pawn {
                moves.push(Move::new(board, from, to, MoveKind::EnPassantCapture));
            }
        }
    }
}

/// Pushes every castling move available to the King of `color` on `king`.
///
/// For each side still allowed by `rights`:
///   - the King must be on its home square and the friendly Rook on its corner,
///   - every square strictly between the two must be empty,
///   - the King's starting square, the square it passes over and its destination must not be attacked.
///
/// Safety is judged with [`is_attacked`], not by where enemy pieces could move, so a Pawn guards its diagonals only.
fn generate_castling_moves(
    board: &Board,
    king: Square,
    color: Color,
    rights: CastlingRights,
    moves: &mut MoveList,
) {
    if king != Square::king_home(color) {
        return;
    }

    let rank = color.home_rank();
    let rook = Piece::new(color, PieceKind::Rook);
    let sides = [
        (rights.short, MoveKind::ShortCastle, 7, 6, Direction::East),
        (rights.long, MoveKind::LongCastle, 0, 2, Direction::West),
    ];

    for (allowed, kind, rook_file, king_file, direction) in sides {
        let rook_square = Square::new(rook_file, rank);
        if !allowed || board[rook_square] != rook {
            continue;
        }

        let path_is_clear = king
            .ray(direction)
            .take_while(|&sq| sq != rook_square)
            .all(|sq| board.is_empty(sq));
        if !path_is_clear {
            continue;
        }

        let destination = Square::new(king_file, rank);
        let path_is_safe = iter::once(king)
            .chain(king.ray(direction).until(|sq| sq == destination))
            .all(|sq| !is_attacked(board, sq, color.opponent()));

        if path_is_safe {
            moves.push(Move::new(board, king, destination, kind));
        }
    }
}
