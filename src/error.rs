/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

use crate::{Color, GameState, PieceKind, Square};

/// Reasons a [`crate::Game`] refused a request.
///
/// None of these leave the game in a different state than before the request.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum GameError {
    /// The game has ended in checkmate or a draw.
    #[error("The game is over ({state})")]
    GameOver { state: GameState },

    /// A Pawn is waiting on the last rank for its promotion piece.
    #[error("A promotion piece must be chosen before playing another move")]
    AwaitingPromotion,

    /// A promotion piece was given, but no Pawn is waiting for one.
    #[error("No Pawn is awaiting promotion")]
    NoPendingPromotion,

    #[error("There is no piece on {0}")]
    EmptySquare(Square),

    /// The piece on `square` does not belong to the side to move.
    #[error("The piece on {square} cannot move: it is {color}'s turn")]
    NotYourTurn { square: Square, color: Color },

    #[error("{from}{to} is not a legal move")]
    IllegalMove { from: Square, to: Square },

    /// The piece kind cannot be promoted to, or does not fit the move.
    #[error("Cannot promote to {}", .0.name())]
    InvalidPromotion(PieceKind),

    #[error("There are no moves to undo")]
    NothingToUndo,

    /// A move written in coordinate notation could not be parsed.
    #[error("Invalid move notation: {0}")]
    Notation(String),
}

/// Result type alias for [`crate::Game`] operations.
pub type GameResult<T> = Result<T, GameError>;
