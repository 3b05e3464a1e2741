/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io::{self, BufRead, Write},
    time::Instant,
};

use anyhow::{Context as _, Result};
use tracing::{debug, warn};

use crate::{perft, splitperft, Game, GameResult, ShellCommand};

/// An interactive session refereeing a single [`Game`] from text commands.
#[derive(Debug, Default)]
pub struct Session {
    /// The game being refereed.
    ///
    /// This is modified whenever moves are played or taken back,
    /// and is replaced whenever a new position is given.
    game: Game,
}

impl Session {
    /// Constructs a new [`Session`] around `game`, to be executed with [`Session::run`].
    pub fn new(game: Game) -> Self {
        Self { game }
    }

    /// Execute the main event loop on `stdin` and `stdout`.
    pub fn run(&mut self) -> Result<()> {
        self.run_with(io::stdin().lock(), io::stdout().lock())
    }

    /// Execute the main event loop, reading commands from `input` until it is exhausted
    /// or an `exit` command is read.
    ///
    /// Invalid commands and refused moves are reported to `output`, and the loop keeps running.
    pub fn run_with(&mut self, mut input: impl BufRead, mut output: impl Write) -> Result<()> {
        let mut buffer = String::with_capacity(256);

        loop {
            // Clear the buffer, read input, and trim the trailing newline
            buffer.clear();
            let bytes = input
                .read_line(&mut buffer)
                .context("Failed to read line when parsing commands")?;

            // For ctrl + d
            if 0 == bytes {
                debug!("input closed; exiting");
                break;
            }

            // Ignore empty lines
            let line = buffer.trim();
            if line.is_empty() {
                continue;
            }

            let command = match line.parse::<ShellCommand>() {
                Ok(command) => command,
                Err(err) => {
                    // Clap renders its own help and usage messages
                    writeln!(output, "{err}")?;
                    continue;
                }
            };

            if !self.execute(command, &mut output)? {
                break;
            }
        }

        output.flush()?;
        Ok(())
    }

    /// Executes a single [`ShellCommand`], writing any results to `output`.
    ///
    /// Returns `false` if the session should end.
    pub fn execute(&mut self, command: ShellCommand, output: &mut impl Write) -> Result<bool> {
        match command {
            ShellCommand::Display => writeln!(output, "{:?}", self.game)?,

            ShellCommand::Exit => return Ok(false),

            ShellCommand::Fen => writeln!(output, "{}", self.game.to_fen())?,

            ShellCommand::Moves { square, debug } => {
                // Get the legal moves
                let moves = if let Some(square) = square {
                    self.game.legal_moves_from(square)
                } else {
                    self.game.legal_moves()
                };

                // If there are none, print "(none)"
                let moves_string = if moves.is_empty() {
                    String::from("(none)")
                } else {
                    // Otherwise, join them by comma-space
                    moves
                        .into_iter()
                        .map(|mv| {
                            if debug {
                                format!("{mv:?}")
                            } else {
                                mv.to_string()
                            }
                        })
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                writeln!(output, "{moves_string}")?;
            }

            ShellCommand::Move { mv } => {
                let result = self.game.make_move_uci(&mv);
                self.report(result, output)?;
            }

            ShellCommand::Promote { piece } => {
                let result = self.game.promote(piece);
                self.report(result, output)?;
            }

            ShellCommand::Undo => {
                let result = self.game.undo();
                self.report(result, output)?;
            }

            ShellCommand::State => self.print_state(output)?,

            ShellCommand::Position { fen } => {
                let fen = fen.join(" ");
                let game = if fen == "startpos" {
                    Ok(Game::default())
                } else {
                    Game::from_fen(&fen)
                };

                match game {
                    Ok(game) => {
                        self.game = game;
                        self.print_state(output)?;
                    }
                    Err(err) => {
                        warn!(%fen, "rejected position");
                        writeln!(output, "Error: {err}")?;
                    }
                }
            }

            ShellCommand::Perft { depth } => {
                let now = Instant::now();
                let nodes = perft(self.game.position(), depth);
                let elapsed = now.elapsed();
                let nps = (nodes as f64 / elapsed.as_secs_f64().max(f64::EPSILON)) as u64;
                writeln!(output, "{nodes} nodes in {elapsed:?} ({nps} nps)")?;
            }

            ShellCommand::Splitperft { depth } => {
                let split = splitperft(self.game.position(), depth);
                let total: u64 = split.iter().map(|(_, nodes)| nodes).sum();
                for (mv, nodes) in split {
                    writeln!(output, "{mv}\t{nodes}")?;
                }
                writeln!(output, "\n{total}")?;
            }
        }

        Ok(true)
    }

    /// Prints the game's state after a move, promotion or undo, or the reason it was refused.
    fn report<T>(&self, result: GameResult<T>, output: &mut impl Write) -> Result<()> {
        match result {
            Ok(_) => self.print_state(output),
            Err(err) => Ok(writeln!(output, "Error: {err}")?),
        }
    }

    fn print_state(&self, output: &mut impl Write) -> Result<()> {
        match self.game.winner() {
            Some(winner) => writeln!(output, "{} ({winner} wins)", self.game.state())?,
            None => writeln!(
                output,
                "{} ({} to move)",
                self.game.state(),
                self.game.side_to_move()
            )?,
        }
        Ok(())
    }
}
