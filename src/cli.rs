/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::Parser;

use crate::{PieceKind, Square};

/// A command typed into the interactive shell.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<COMMAND>")
)]
pub enum ShellCommand {
    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Quit the shell.
    #[command(alias = "quit")]
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Shows all legal moves in the current position, or for a specific piece.
    Moves {
        square: Option<Square>,

        /// If set, moves will be printed using their debug formatter, which displays what kind of move it is (quiet, en passant, etc.).
        #[arg(short, long, default_value = "false")]
        debug: bool,
    },

    /// Play a move in coordinate notation, such as `e2e4` or `e7e8q`.
    ///
    /// A Pawn move to the last rank without a promotion letter waits for `promote`.
    #[command(alias = "m")]
    Move { mv: String },

    /// Choose the piece for a pending promotion: `q`, `r`, `b`, `n`, or the piece's name.
    Promote { piece: PieceKind },

    /// Take back the last move, or cancel a pending promotion.
    Undo,

    /// Print the state of the game, and the winner if there is one.
    State,

    /// Start a new game from `startpos` or from a FEN string.
    Position {
        #[arg(required = true, num_args = 1..)]
        fen: Vec<String>,
    },

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Performs a split perft on the current position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },
}

impl FromStr for ShellCommand {
    type Err = clap::Error;
    /// Attempt to parse a [`ShellCommand`] from a line of input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("d".parse::<ShellCommand>().unwrap(), ShellCommand::Display);
        assert_eq!("quit".parse::<ShellCommand>().unwrap(), ShellCommand::Exit);
        assert_eq!(
            "moves e2".parse::<ShellCommand>().unwrap(),
            ShellCommand::Moves {
                square: Some(Square::E2),
                debug: false
            }
        );
        assert_eq!(
            "move e7e8q".parse::<ShellCommand>().unwrap(),
            ShellCommand::Move {
                mv: String::from("e7e8q")
            }
        );
        assert_eq!(
            "promote knight".parse::<ShellCommand>().unwrap(),
            ShellCommand::Promote {
                piece: PieceKind::Knight
            }
        );
        assert_eq!(
            "position 8/8/8/8/8/8/8/8 w - - 0 1"
                .parse::<ShellCommand>()
                .unwrap(),
            ShellCommand::Position {
                fen: ["8/8/8/8/8/8/8/8", "w", "-", "-", "0", "1"]
                    .map(String::from)
                    .to_vec()
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("moves z9".parse::<ShellCommand>().is_err());
        assert!("perft".parse::<ShellCommand>().is_err());
        assert!("position".parse::<ShellCommand>().is_err());
        assert!("castle".parse::<ShellCommand>().is_err());
    }
}
