/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Attack sets, check detection, and check-blocking squares.
mod attacks;

/// The 64 cells of the board, and how moves are applied to and taken back from them.
mod board;

/// The referee: turns, legality, promotion choices, history and the end of the game.
mod game;

/// Filtering pseudo-legal moves down to legal ones, and checkmate/stalemate detection.
mod legality;

/// Pseudo-legal move generation for every kind of piece, including castling.
mod movegen;

/// Moves, their kinds, and the board writes that play and undo them.
mod moves;

/// Counting reachable positions, for validating move generation.
mod perft;

/// Colors, kinds of pieces, and the signed piece codes stored on the board.
mod piece;

/// A board plus castling rights, en passant, move counters and game state.
mod position;

/// Squares, directions, and rays across the board.
mod square;

/// Sets of squares.
mod squareset;

/// Misc constants.
mod utils;

pub use attacks::*;
pub use board::*;
pub use game::*;
pub use legality::*;
pub use movegen::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use square::*;
pub use squareset::*;
pub use utils::*;
