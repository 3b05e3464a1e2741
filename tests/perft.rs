/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arbiter::{perft, Game, Position};

fn test_perft_fen_nodes(depth: usize, fen: &str, expected: u64) {
    let game = Game::from_fen(fen).unwrap();
    let res = game.perft(depth);
    assert_eq!(res, expected, "PERFT({depth}) failed on {fen}");

    // The referee and a bare position must count the same tree
    let position = Position::from_fen(fen).unwrap();
    assert_eq!(perft(&position, depth), expected);
}

#[cfg(test)]
mod promotion_perft {
    use crate::test_perft_fen_nodes;

    #[test]
    fn test_promotion_perft_1() {
        test_perft_fen_nodes(1, "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1 ", 24);
    }
    #[test]
    fn test_promotion_perft_2() {
        test_perft_fen_nodes(2, "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1 ", 496);
    }
    #[test]
    fn test_promotion_perft_3() {
        test_perft_fen_nodes(3, "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1 ", 9483);
    }
}

/// https://www.chessprogramming.org/Perft_Results
#[cfg(test)]
mod simple_perfts {
    use super::*;

    #[test]
    fn test_startpos_perft() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        test_perft_fen_nodes(1, fen, 20);
        test_perft_fen_nodes(2, fen, 400);
        test_perft_fen_nodes(3, fen, 8902);
        test_perft_fen_nodes(4, fen, 197281);
    }

    #[test]
    fn test_kiwipete_perft() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        test_perft_fen_nodes(1, fen, 48);
        test_perft_fen_nodes(2, fen, 2039);
        test_perft_fen_nodes(3, fen, 97862);
    }

    #[test]
    fn test_endgame_perft() {
        let fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -";
        test_perft_fen_nodes(1, fen, 14);
        test_perft_fen_nodes(2, fen, 191);
        test_perft_fen_nodes(3, fen, 2812);
        test_perft_fen_nodes(4, fen, 43238);
    }

    #[test]
    fn test_mirrored_castling_perft() {
        let fen = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
        test_perft_fen_nodes(1, fen, 6);
        test_perft_fen_nodes(2, fen, 264);
        test_perft_fen_nodes(3, fen, 9467);
    }

    #[test]
    fn test_promotion_into_check_perft() {
        let fen = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
        test_perft_fen_nodes(1, fen, 44);
        test_perft_fen_nodes(2, fen, 1486);
        test_perft_fen_nodes(3, fen, 62379);
    }
}
