/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// All board-related code: pieces, squares, moves, legality and the game referee.
mod board;

/// Commands understood by the interactive shell.
mod cli;

/// Reasons the referee can refuse a request.
mod error;

/// The interactive shell, reading commands and reporting the game's state.
mod session;

pub use board::*;
pub use cli::*;
pub use error::*;
pub use session::*;
