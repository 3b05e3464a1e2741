/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arbiter::{Game, Session};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Referee a game of chess from commands typed on standard input.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Start from this FEN string instead of the standard starting position.
    #[arg(short, long)]
    fen: Option<String>,

    /// Log filter directives, such as `debug` or `arbiter=trace`. Overrides `RUST_LOG`.
    #[arg(short, long)]
    log: Option<String>,
}

fn main() {
    let args = Args::parse();

    // Logs go to stderr so they never interleave with command output
    let filter = match args.log.as_deref() {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let game = match args.fen.as_deref().map(Game::from_fen).transpose() {
        Ok(game) => game.unwrap_or_default(),
        Err(e) => {
            eprintln!("{} encountered an error: {e}", env!("CARGO_PKG_NAME"));
            std::process::exit(1);
        }
    };

    if let Err(e) = Session::new(game).run() {
        eprintln!("{} encountered an error: {e}", env!("CARGO_PKG_NAME"));
    }
}
