/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{
    blocking_squares, checkers, in_check, pseudo_legal_moves, Board, Color, Context, Move,
    MoveList, PieceKind, Square, SquareSet,
};

/// Returns `true` if playing `mv` would leave `color`'s King attacked.
///
/// The move is simulated on `board` and taken back before returning.
/// A side without a King can never be left in check.
#[inline(always)]
pub fn leaves_king_in_check(board: &mut Board, mv: &Move, color: Color) -> bool {
    let simulated = board.simulate(mv);
    simulated
        .king_square(color)
        .is_some_and(|king| in_check(&simulated, king))
}

/// Keeps only the moves in `moves` that do not leave `color`'s King in check.
///
/// Every candidate is played and taken back on `board`, which is identical before and after this call.
pub fn filter_legal(board: &mut Board, mut moves: MoveList, color: Color) -> MoveList {
    moves.retain(|mv| !leaves_king_in_check(board, mv, color));
    moves
}

/// All legal moves of the piece on `square`. Empty squares have no moves.
///
/// # Example
/// ```
/// # use arbiter::*;
/// // The e2 Pawn is pinned by the Rook on e8
/// let position = Position::from_fen("4r1k1/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
/// let moves = legal_moves(position.board(), Square::E2, position.context());
/// assert_eq!(moves.len(), 2);
///
/// // A pinned Knight cannot move at all
/// let position = Position::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
/// let moves = legal_moves(position.board(), Square::E2, position.context());
/// assert!(moves.is_empty());
/// ```
pub fn legal_moves(board: &Board, square: Square, context: &Context) -> MoveList {
    let Some(color) = board[square].color() else {
        return MoveList::new();
    };

    let mut scratch = *board;
    filter_legal(&mut scratch, pseudo_legal_moves(board, square, context), color)
}

/// All legal moves available to `color`, in square order.
pub fn all_legal_moves(board: &Board, color: Color, context: &Context) -> MoveList {
    let mut scratch = *board;
    let mut moves = MoveList::new();

    for (square, _) in board.pieces_of(color) {
        moves.extend(filter_legal(
            &mut scratch,
            pseudo_legal_moves(board, square, context),
            color,
        ));
    }

    moves
}

/// Returns `true` if `color` has at least one legal move.
pub fn has_legal_move(board: &Board, color: Color, context: &Context) -> bool {
    let mut scratch = *board;
    board.pieces_of(color).any(|(square, _)| {
        pseudo_legal_moves(board, square, context)
            .iter()
            .any(|mv| !leaves_king_in_check(&mut scratch, mv, color))
    })
}

/// Returns `true` if `color` is checkmated.
///
/// The King is in check, and:
///   1. no King move escapes check,
///   2. with two or more checkers, nothing else can help,
///   3. otherwise, no other friendly piece can capture the checker or block its ray.
///
/// A side without a King is never checkmated.
///
/// # Panics
///
/// If the King is in check but no checking piece can be found.
pub fn is_checkmate(board: &Board, color: Color, context: &Context) -> bool {
    let Some(king) = board.king_square(color) else {
        return false;
    };
    if !in_check(board, king) {
        return false;
    }

    let mut scratch = *board;

    let can_escape = pseudo_legal_moves(board, king, context)
        .iter()
        .any(|mv| !leaves_king_in_check(&mut scratch, mv, color));
    if can_escape {
        return false;
    }

    let checkers = checkers(board, king);
    assert!(
        !checkers.is_empty(),
        "{color} is in check on {king}, but no checking piece was found in {board:?}"
    );

    // Double check can only be answered by moving the King
    if checkers.len() > 1 {
        return true;
    }

    let block = checkers
        .into_iter()
        .fold(SquareSet::EMPTY, |set, attacker| {
            set | blocking_squares(board, attacker, king)
        });

    let can_block = board
        .pieces_of(color)
        .filter(|(_, piece)| !piece.is_kind(PieceKind::King))
        .any(|(square, _)| {
            pseudo_legal_moves(board, square, context)
                .iter()
                .filter(|mv| {
                    block.contains(mv.to())
                        || mv.captured_square().is_some_and(|sq| block.contains(sq))
                })
                .any(|mv| !leaves_king_in_check(&mut scratch, mv, color))
        });

    !can_block
}

/// Returns `true` if `color` is not in check but has no legal moves.
pub fn is_stalemate(board: &Board, color: Color, context: &Context) -> bool {
    let in_check = board
        .king_square(color)
        .is_some_and(|king| in_check(board, king));

    !in_check && !has_legal_move(board, color, context)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::*;

    /// Runs `f` against `board` and asserts the board is unchanged afterwards.
    fn assert_untouched<T>(board: &mut Board, f: impl FnOnce(&mut Board) -> T) -> T {
        let before = *board;
        let result = f(board);
        assert_eq!(*board, before, "board was modified");
        result
    }

    fn load(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn test_filter_restores_board() {
        let position = load(FEN_KIWIPETE);
        let mut board = *position.board();

        for (square, _) in position.board().pieces_of(Color::White) {
            let moves = pseudo_legal_moves(position.board(), square, position.context());
            assert_untouched(&mut board, |board| filter_legal(board, moves, Color::White));
        }
    }

    #[test]
    fn test_pinned_piece_cannot_leave_the_line() {
        let position = load("4k3/4r3/8/8/8/8/4R3/4K3 w - - 0 1");
        let moves = legal_moves(position.board(), Square::E2, position.context());
        assert_eq!(moves.len(), 5);
        assert!(moves.iter().all(|mv| mv.to().file() == 4));
    }

    #[test]
    fn test_king_cannot_step_into_check() {
        // The Rook covers the second rank and the d-file; the Pawn defends the Rook
        let position = load("4k3/8/8/8/8/4p3/3r4/4K3 w - - 0 1");
        let moves = legal_moves(position.board(), Square::E1, position.context());
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0], "e1f1");
    }

    #[test]
    fn test_kingless_side_keeps_all_moves() {
        let position = load("8/8/8/8/8/8/1P6/8 w - - 0 1");
        let moves = legal_moves(position.board(), Square::B2, position.context());
        assert_eq!(moves.len(), 2);
        assert!(!is_checkmate(position.board(), Color::White, position.context()));
    }

    #[test]
    fn test_en_passant_discovered_check_is_illegal() {
        // Capturing en passant would expose the King on a5 to the Rook on h5
        let position = load("8/8/8/KPp4r/8/8/8/4k3 w - c6 0 1");
        let moves = legal_moves(position.board(), Square::B5, position.context());
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0], "b5b6");
    }

    #[test]
    fn test_back_rank_mate() {
        let position = load("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert!(is_checkmate(position.board(), Color::Black, position.context()));
        assert!(!is_stalemate(position.board(), Color::Black, position.context()));
    }

    #[test]
    fn test_check_answered_by_block_or_capture() {
        // A Knight that cannot reach the back rank does not help
        let position = load("3R2k1/5ppp/8/8/8/8/2n5/6K1 b - - 0 1");
        assert!(is_checkmate(position.board(), Color::Black, position.context()));

        // Capturing the checker
        let position = load("3R2k1/5ppp/8/8/8/8/7K/3r4 b - - 0 1");
        assert!(!is_checkmate(position.board(), Color::Black, position.context()));

        // Blocking on f8
        let position = load("3R2k1/5ppp/8/8/1b6/8/8/6K1 b - - 0 1");
        assert!(!is_checkmate(position.board(), Color::Black, position.context()));
    }

    #[test]
    fn test_en_passant_resolves_check() {
        // The Pawn that just double-pushed gives check; capturing it en passant is the only defence
        let position = load("1RB5/3Q4/8/k7/1Pp5/P7/8/7K b - b3 0 1");
        assert!(in_check(position.board(), Square::A5));
        assert!(!is_checkmate(position.board(), Color::Black, position.context()));

        let position = load("1RB5/3Q4/8/k7/1Pp5/P7/8/7K b - - 0 1");
        assert!(is_checkmate(position.board(), Color::Black, position.context()));
    }

    #[test]
    fn test_double_check_needs_a_king_move() {
        let position = load("4k3/8/5N2/8/1b6/8/8/4R1K1 b - - 0 1");
        assert!(!is_checkmate(position.board(), Color::Black, position.context()));

        let position = load("3qkb2/3p1p2/5N2/8/8/8/8/4R1K1 b - - 0 1");
        assert!(is_checkmate(position.board(), Color::Black, position.context()));
    }

    #[test]
    fn test_stalemate() {
        let position = load("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(is_stalemate(position.board(), Color::Black, position.context()));
        assert!(!is_checkmate(position.board(), Color::Black, position.context()));
        assert!(all_legal_moves(position.board(), Color::Black, position.context()).is_empty());
    }

    #[test]
    fn test_start_position_move_count() {
        let position = Position::default();
        let moves = all_legal_moves(position.board(), Color::White, position.context());
        assert_eq!(moves.len(), 20);
        assert!(has_legal_move(position.board(), Color::Black, position.context()));
    }
}
