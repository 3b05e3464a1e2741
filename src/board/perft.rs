/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Move, Position};

/// Perform a perft at the specified depth, collecting only data about the number of possible positions (nodes).
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
///
/// # Example
/// ```
/// # use arbiter::*;
/// assert_eq!(perft(&Position::default(), 2), 400);
/// ```
pub fn perft(position: &Position, depth: usize) -> u64 {
    // Bulk counting; no need to recurse again just to apply a singular move and return 1.
    if depth == 1 {
        return position.legal_moves().len() as u64;
    } else
    // Recursion limit; return 1, since we're fathoming this node.
    if depth == 0 {
        return 1;
    }

    // Recursively accumulate the nodes from the remaining depths
    position.legal_moves().into_iter().fold(0, |nodes, mv| {
        nodes + perft(&position.with_move_made(&mv), depth - 1)
    })
}

/// Perform a splitperft at the specified depth, returning the number of nodes reachable after
/// each move available at the root node, in generation order.
///
/// The sum of all counts equals [`perft`] at the same depth.
pub fn splitperft(position: &Position, depth: usize) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }

    position
        .legal_moves()
        .into_iter()
        .map(|mv| {
            let nodes = perft(&position.with_move_made(&mv), depth - 1);
            (mv, nodes)
        })
        .collect()
}
