/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Deref, str::FromStr};

use anyhow::{bail, Result};
use tracing::{debug, trace};

use crate::{GameError, GameResult};

use super::{
    in_check, is_checkmate, Board, Color, Context, DrawReason, GameState, Move, MoveList, Piece,
    PieceKind, Position, Square,
};

/// Number of half-moves without a capture or Pawn move after which the game is drawn.
pub const FIFTY_MOVE_RULE_PLIES: usize = 100;

/// A move that was committed to a [`Game`], with everything needed to take it back.
#[derive(Clone, PartialEq, Eq, Debug)]
struct HistoryEntry {
    /// The position before `mv` was played.
    previous: Position,

    mv: Move,
}

/// A Pawn move to the last rank that is waiting for its promotion piece.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct PendingPromotion {
    from: Square,
    to: Square,

    /// The state to return to if the promotion is cancelled.
    resume: GameState,
}

/// A game of chess, refereed.
///
/// This type owns a [`Position`] and enforces whose turn it is, which moves are legal,
/// and when the game is over. Every committed move is recorded so it can be taken back.
///
/// The basic methods you're probably looking for are [`Game::from_fen`], [`Game::make_move`], and [`Game::legal_moves_from`].
///
/// # Example
/// ```
/// # use arbiter::*;
/// let mut game = Game::default();
/// for (from, to) in [(Square::F2, Square::F3), (Square::E7, Square::E5), (Square::G2, Square::G4)] {
///     game.make_move(from, to).unwrap();
/// }
/// let context = game.make_move(Square::D8, Square::H4).unwrap();
/// assert_eq!(context.state(), GameState::Checkmate);
/// assert_eq!(context.winner(), Some(Color::Black));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Game {
    /// The current [`Position`] of the game, including piece layouts, castling rights, turn counters, etc.
    position: Position,

    /// Every committed move, oldest first.
    history: Vec<HistoryEntry>,

    pending: Option<PendingPromotion>,
}

impl Game {
    /// Creates a new [`Game`] from the provided [`Position`], classifying its state.
    ///
    /// # Panics
    ///
    /// If either side does not have exactly one King. Use [`Game::from_fen`] to have this reported as an error.
    pub fn new(position: Position) -> Self {
        Self::check_kings(&position.board)
            .unwrap_or_else(|err| panic!("Cannot start a game from {position}: {err}"));

        let mut game = Self {
            position,
            history: Vec::new(),
            pending: None,
        };
        game.classify();
        game
    }

    /// Creates a new [`Game`] from the provided FEN string.
    ///
    /// Each side must have exactly one King, and the side that just moved must not be in check.
    /// A loaded position may already be check, checkmate or a draw.
    ///
    /// # Example
    /// ```
    /// # use arbiter::*;
    /// let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    /// assert_eq!(game.state(), GameState::Draw(DrawReason::Stalemate));
    ///
    /// assert!(Game::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let position = Position::from_fen(fen)?;
        trace!(%fen, "loading position");

        Self::check_kings(&position.board)?;
        let waiting = position.side_to_move().opponent();
        if position
            .board
            .king_square(waiting)
            .is_some_and(|king| in_check(&position.board, king))
        {
            bail!(
                "{waiting} is in check, but it is {}'s turn in {fen:?}",
                position.side_to_move()
            );
        }

        Ok(Self::new(position))
    }

    /// Ensures each side has exactly one King.
    fn check_kings(board: &Board) -> Result<()> {
        for color in Color::all() {
            let kings = board.count(Piece::new(color, PieceKind::King));
            if kings != 1 {
                bail!("{color} must have exactly one King. Found {kings}");
            }
        }

        Ok(())
    }

    /// Fetches the current [`Position`].
    #[inline(always)]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// A snapshot of the current [`Context`].
    #[inline(always)]
    pub const fn context(&self) -> Context {
        self.position.context
    }

    #[inline(always)]
    pub const fn state(&self) -> GameState {
        self.position.context.state
    }

    /// The player who delivered checkmate, if the game ended that way.
    #[inline(always)]
    pub const fn winner(&self) -> Option<Color> {
        self.position.context.winner
    }

    /// Iterates over every committed move, oldest first.
    pub fn moves_played(&self) -> impl ExactSizeIterator<Item = &Move> + '_ {
        self.history.iter().map(|entry| &entry.mv)
    }

    /// If a promotion is pending, returns the squares of the Pawn move awaiting a piece choice.
    #[inline(always)]
    pub fn pending_promotion(&self) -> Option<(Square, Square)> {
        self.pending.map(|pending| (pending.from, pending.to))
    }

    /// Legal moves of the piece on `square`, which may belong to either side.
    ///
    /// Empty squares have no moves.
    #[inline(always)]
    pub fn legal_moves_from(&self, square: Square) -> MoveList {
        self.position.legal_moves_from(square)
    }

    /// Returns `true` if the side to move is in check.
    #[inline(always)]
    pub fn is_in_check(&self) -> bool {
        self.position.is_in_check()
    }

    /// Attempts to move the piece on `from` to `to`, returning the [`Context`] afterwards.
    ///
    /// If this is a Pawn reaching the last rank, nothing is played yet: the game enters
    /// [`GameState::Promotion`] until [`Game::promote`] is called with the piece to promote to.
    ///
    /// On error, the game is left exactly as it was.
    pub fn make_move(&mut self, from: Square, to: Square) -> GameResult<Context> {
        self.play(from, to, None)
    }

    /// Attempts to move the Pawn on `from` to `to`, promoting it to `promotion`.
    ///
    /// # Example
    /// ```
    /// # use arbiter::*;
    /// let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    /// game.make_move_with_promotion(Square::A7, Square::A8, PieceKind::Queen).unwrap();
    /// assert_eq!(game[Square::A8], Piece::WHITE_QUEEN);
    /// assert_eq!(game.state(), GameState::Check);
    /// ```
    pub fn make_move_with_promotion(
        &mut self,
        from: Square,
        to: Square,
        promotion: PieceKind,
    ) -> GameResult<Context> {
        self.play(from, to, Some(promotion))
    }

    /// Plays a move written in coordinate notation, such as `e2e4` or `e7e8q`.
    ///
    /// Without a promotion letter, a Pawn reaching the last rank waits for [`Game::promote`].
    pub fn make_move_uci(&mut self, uci: &str) -> GameResult<Context> {
        let (from, to, promotion) =
            Move::parse_coordinates(uci).map_err(|err| GameError::Notation(err.to_string()))?;
        self.play(from, to, promotion)
    }

    /// Completes a pending promotion with the chosen piece.
    ///
    /// # Example
    /// ```
    /// # use arbiter::*;
    /// let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    /// let context = game.make_move(Square::A7, Square::A8).unwrap();
    /// assert_eq!(context.state(), GameState::Promotion);
    /// assert_eq!(game[Square::A7], Piece::WHITE_PAWN);
    ///
    /// game.promote(PieceKind::Knight).unwrap();
    /// assert_eq!(game[Square::A8], Piece::WHITE_KNIGHT);
    /// assert_eq!(game.side_to_move(), Color::Black);
    /// ```
    pub fn promote(&mut self, promotion: PieceKind) -> GameResult<Context> {
        let Some(pending) = self.pending else {
            return Err(GameError::NoPendingPromotion);
        };
        if !promotion.is_promotable() {
            return Err(GameError::InvalidPromotion(promotion));
        }

        let mv = self
            .find_move(pending.from, pending.to, Some(promotion))
            .ok_or(GameError::InvalidPromotion(promotion))?;

        self.pending = None;
        self.position.context.state = pending.resume;
        Ok(self.commit(mv))
    }

    /// Takes back the last committed move, returning the restored [`Context`].
    ///
    /// If a promotion is pending, it is cancelled instead and no move is taken back.
    /// Works in every state, including after the game has ended.
    ///
    /// # Example
    /// ```
    /// # use arbiter::*;
    /// let mut game = Game::default();
    /// game.make_move(Square::E2, Square::E4).unwrap();
    /// game.undo().unwrap();
    /// assert_eq!(game.position(), &Position::default());
    /// assert_eq!(game.undo(), Err(GameError::NothingToUndo));
    /// ```
    pub fn undo(&mut self) -> GameResult<Context> {
        if let Some(pending) = self.pending.take() {
            self.position.context.state = pending.resume;
            debug!(from = %pending.from, to = %pending.to, "cancelled pending promotion");
            return Ok(self.context());
        }

        let entry = self.history.pop().ok_or(GameError::NothingToUndo)?;
        self.position.board.undo_move(&entry.mv);
        debug_assert_eq!(
            self.position.board, entry.previous.board,
            "inverse of {:?} did not restore the board",
            entry.mv
        );
        self.position.context = entry.previous.context;

        debug!(mv = %entry.mv, state = %self.state(), "undid move");
        Ok(self.context())
    }

    /// Counts the leaf nodes reachable from the current position in `depth` half-moves.
    #[inline(always)]
    pub fn perft(&self, depth: usize) -> u64 {
        super::perft(&self.position, depth)
    }

    /// Validates and commits a move, shared by every public move entry point.
    fn play(&mut self, from: Square, to: Square, promotion: Option<PieceKind>) -> GameResult<Context> {
        let result = self.validate(from, to, promotion);
        let mv = match result {
            Ok(Some(mv)) => mv,

            // A promotion piece is still needed
            Ok(None) => {
                self.pending = Some(PendingPromotion {
                    from,
                    to,
                    resume: self.state(),
                });
                self.position.context.state = GameState::Promotion;
                debug!(%from, %to, "awaiting promotion piece");
                return Ok(self.context());
            }

            Err(err) => {
                debug!(%from, %to, %err, "rejected move");
                return Err(err);
            }
        };

        Ok(self.commit(mv))
    }

    /// Checks whether `from` to `to` may be played right now.
    ///
    /// Returns the move to commit, or `None` if a promotion piece has to be chosen first.
    fn validate(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> GameResult<Option<Move>> {
        let state = self.state();
        if state == GameState::Promotion {
            return Err(GameError::AwaitingPromotion);
        } else if state.is_over() {
            return Err(GameError::GameOver { state });
        }

        let side_to_move = self.side_to_move();
        let Some(color) = self.position.board[from].color() else {
            return Err(GameError::EmptySquare(from));
        };
        if color != side_to_move {
            return Err(GameError::NotYourTurn {
                square: from,
                color: side_to_move,
            });
        }

        if let Some(kind) = promotion.filter(|kind| !kind.is_promotable()) {
            return Err(GameError::InvalidPromotion(kind));
        }

        let candidates = self
            .legal_moves_from(from)
            .into_iter()
            .filter(|mv| mv.to() == to)
            .collect::<MoveList>();

        let Some(first) = candidates.first() else {
            return Err(GameError::IllegalMove { from, to });
        };

        match (first.promotion(), promotion) {
            (None, None) => Ok(Some(first.clone())),
            (Some(_), None) => Ok(None),
            (None, Some(kind)) => Err(GameError::InvalidPromotion(kind)),
            (Some(_), Some(kind)) => candidates
                .into_iter()
                .find(|mv| mv.promotion() == Some(kind))
                .map(Some)
                .ok_or(GameError::InvalidPromotion(kind)),
        }
    }

    /// Finds the legal move from `from` to `to` with the given promotion, if there is one.
    fn find_move(&self, from: Square, to: Square, promotion: Option<PieceKind>) -> Option<Move> {
        self.legal_moves_from(from)
            .into_iter()
            .find(|mv| mv.to() == to && mv.promotion() == promotion)
    }

    /// Plays a validated move, records it, and classifies the resulting state.
    fn commit(&mut self, mv: Move) -> Context {
        let previous = self.position;
        self.position.make_move(&mv);
        self.classify();

        debug!(
            mv = %mv,
            kind = %mv.kind(),
            fen = %self.position,
            state = %self.state(),
            "committed move"
        );

        self.history.push(HistoryEntry { previous, mv });
        self.context()
    }

    /// Classifies the current position from the point of view of the side to move.
    fn classify(&mut self) {
        let color = self.side_to_move();
        let (state, winner) = if is_checkmate(&self.position.board, color, &self.position.context) {
            (GameState::Checkmate, Some(color.opponent()))
        } else if let Some(reason) = self.draw_reason() {
            (GameState::Draw(reason), None)
        } else if self.is_in_check() {
            (GameState::Check, None)
        } else {
            (GameState::Playing, None)
        };

        if state != self.state() {
            debug!(from = %self.state(), to = %state, "state changed");
        }

        self.position.context.state = state;
        self.position.context.winner = winner;
    }

    /// Returns the reason the current position is drawn, if it is.
    ///
    /// Checkmate takes priority and must already have been ruled out.
    fn draw_reason(&self) -> Option<DrawReason> {
        if !self.is_in_check() && !self.position.has_legal_move() {
            Some(DrawReason::Stalemate)
        } else if self.position.can_draw_by_insufficient_material() {
            Some(DrawReason::InsufficientMaterial)
        } else if self.position.context.halfmove >= FIFTY_MOVE_RULE_PLIES {
            Some(DrawReason::FiftyMoveRule)
        } else if self.is_threefold_repetition() {
            Some(DrawReason::ThreefoldRepetition)
        } else {
            None
        }
    }

    /// Returns `true` if the current position has occurred twice before.
    ///
    /// Only positions since the last irreversible move (a capture or Pawn move) can repeat.
    fn is_threefold_repetition(&self) -> bool {
        let reversible = self.position.context.halfmove;
        let earlier = self
            .history
            .iter()
            .rev()
            .take(reversible)
            .filter(|entry| entry.previous.is_same_as(&self.position))
            .count();

        earlier >= 2
    }
}

impl Deref for Game {
    type Target = Position;
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.position
    }
}

impl Default for Game {
    /// A new game from the standard starting position.
    #[inline(always)]
    fn default() -> Self {
        Self::new(Position::default())
    }
}

impl FromStr for Game {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Game {
    /// Displays the current position as a FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.position)
    }
}

impl fmt::Debug for Game {
    /// Displays the board alongside the position's FEN fields and the game's state.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.position)?;
        if let Some((from, to)) = self.pending_promotion() {
            writeln!(f, "Pending promotion: {from}{to}")?;
        }
        if let Some(winner) = self.winner() {
            writeln!(f, "Winner: {winner}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::*;

    fn play(game: &mut Game, moves: &[&str]) -> Context {
        let mut context = game.context();
        for uci in moves {
            context = game
                .make_move_uci(uci)
                .unwrap_or_else(|err| panic!("{uci} failed: {err}\n{game:?}"));
        }
        context
    }

    #[test]
    fn test_turns_are_enforced() {
        let mut game = Game::default();
        assert_eq!(
            game.make_move(Square::E7, Square::E5),
            Err(GameError::NotYourTurn {
                square: Square::E7,
                color: Color::White
            })
        );
        assert_eq!(
            game.make_move(Square::E4, Square::E5),
            Err(GameError::EmptySquare(Square::E4))
        );
        assert_eq!(
            game.make_move(Square::E2, Square::E5),
            Err(GameError::IllegalMove {
                from: Square::E2,
                to: Square::E5
            })
        );
        assert_eq!(game.position(), &Position::default());
        assert_eq!(game.moves_played().len(), 0);
    }

    #[test]
    fn test_check_then_escape() {
        let mut game = Game::default();
        let context = play(&mut game, &["e2e4", "e7e5", "f2f4", "d8h4"]);
        assert_eq!(context.state(), GameState::Check);
        assert!(game.is_in_check());

        let context = play(&mut game, &["g2g3"]);
        assert_eq!(context.state(), GameState::Playing);
    }

    #[test]
    fn test_moves_rejected_after_checkmate() {
        let mut game = Game::default();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(game.state(), GameState::Checkmate);
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(
            game.make_move(Square::A2, Square::A3),
            Err(GameError::GameOver {
                state: GameState::Checkmate
            })
        );

        // Taking back the mating move re-opens the game
        game.undo().unwrap();
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.winner(), None);
        assert!(game.make_move(Square::A7, Square::A6).is_ok());
    }

    #[test]
    fn test_promotion_flow() {
        let mut game = Game::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();

        game.make_move(Square::A7, Square::B8).unwrap();
        assert_eq!(game.state(), GameState::Promotion);
        assert_eq!(game.pending_promotion(), Some((Square::A7, Square::B8)));
        assert_eq!(
            game.make_move(Square::E1, Square::E2),
            Err(GameError::AwaitingPromotion)
        );
        assert_eq!(
            game.promote(PieceKind::King),
            Err(GameError::InvalidPromotion(PieceKind::King))
        );
        assert_eq!(game.state(), GameState::Promotion);

        let context = game.promote(PieceKind::Rook).unwrap();
        assert_eq!(game[Square::B8], Piece::WHITE_ROOK);
        assert_eq!(context.state(), GameState::Check);
        assert_eq!(context.halfmove(), 0);
        assert_eq!(game.promote(PieceKind::Rook), Err(GameError::NoPendingPromotion));
    }

    #[test]
    fn test_undo_cancels_pending_promotion() {
        let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let before = game.clone();
        game.make_move(Square::A7, Square::A8).unwrap();
        game.undo().unwrap();
        assert_eq!(game, before);
        assert_eq!(game.undo(), Err(GameError::NothingToUndo));
    }

    #[test]
    fn test_promotion_rejected_for_other_moves() {
        let mut game = Game::default();
        assert_eq!(
            game.make_move_with_promotion(Square::E2, Square::E4, PieceKind::Queen),
            Err(GameError::InvalidPromotion(PieceKind::Queen))
        );
        assert!(matches!(
            game.make_move_uci("e2"),
            Err(GameError::Notation(_))
        ));
    }

    #[test]
    fn test_promotion_to_unpromotable_kind() {
        let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let start = game.clone();
        for kind in [PieceKind::Pawn, PieceKind::King] {
            assert_eq!(
                game.make_move_with_promotion(Square::A7, Square::A8, kind),
                Err(GameError::InvalidPromotion(kind))
            );
        }
        assert_eq!(game, start);
        assert!(game
            .make_move_with_promotion(Square::A7, Square::A8, PieceKind::Rook)
            .is_ok());
    }

    #[test]
    fn test_undo_restores_everything() {
        let mut game = Game::from_fen(FEN_KIWIPETE).unwrap();
        let start = game.clone();
        play(&mut game, &["e1g1", "h3g2", "d5e6", "e8c8", "a2a4", "b4a3"]);
        assert_eq!(game.moves_played().len(), 6);

        while game.undo().is_ok() {}
        assert_eq!(game, start);
    }

    #[test]
    fn test_threefold_repetition() {
        let mut game = Game::default();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        play(&mut game, &shuffle);
        assert_eq!(game.state(), GameState::Playing);

        let context = play(&mut game, &shuffle);
        assert_eq!(
            context.state(),
            GameState::Draw(DrawReason::ThreefoldRepetition)
        );
        assert_eq!(context.winner(), None);
    }

    #[test]
    fn test_fifty_move_rule() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/R7/4K3 w - - 99 80").unwrap();
        assert_eq!(game.state(), GameState::Playing);
        let context = play(&mut game, &["a2a3"]);
        assert_eq!(context.state(), GameState::Draw(DrawReason::FiftyMoveRule));
        assert_eq!(context.halfmove(), 100);
    }

    #[test]
    fn test_insufficient_material_after_capture() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/3r4/3NK3 w - - 0 1").unwrap();
        let context = play(&mut game, &["e1d2"]);
        assert_eq!(
            context.state(),
            GameState::Draw(DrawReason::InsufficientMaterial)
        );
    }

    #[test]
    fn test_loaded_positions_are_classified() {
        let game = Game::from_fen("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        assert_eq!(game.state(), GameState::Checkmate);
        assert_eq!(game.winner(), Some(Color::White));

        // White to move while Black is in check cannot arise in play
        assert!(Game::from_fen("3R2k1/5ppp/8/8/8/8/8/6K1 w - - 0 1").is_err());
        assert!(Game::from_fen("4k3/8/8/8/8/8/8/3KK3 w - - 0 1").is_err());
    }
}
