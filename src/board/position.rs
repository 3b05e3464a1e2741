/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Deref, str::FromStr};

use anyhow::{anyhow, bail, Result};

use super::{
    all_legal_moves, has_legal_move, is_in_check, legal_moves, Board, Color, Move, MoveList,
    PieceKind, Square,
};

/// Represents the castling rights of a single player
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct CastlingRights {
    /// May castle with the Rook on the King's side (`h` file).
    pub short: bool,
    /// May castle with the Rook on the Queen's side (`a` file).
    pub long: bool,
}

impl CastlingRights {
    /// Both sides still permitted.
    pub const BOTH: Self = Self::new(true, true);

    /// Neither side permitted.
    pub const NONE: Self = Self::new(false, false);

    #[inline(always)]
    pub const fn new(short: bool, long: bool) -> Self {
        Self { short, long }
    }
}

/// Why a game ended in a draw.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum DrawReason {
    /// The side to move has no legal moves, but is not in check.
    Stalemate,
    /// One hundred half-moves have passed without a capture or a Pawn move.
    FiftyMoveRule,
    /// Neither side has enough pieces left to deliver checkmate.
    InsufficientMaterial,
    /// The same position has occurred three times with the same side to move.
    ThreefoldRepetition,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Stalemate => "stalemate",
            Self::FiftyMoveRule => "fifty-move rule",
            Self::InsufficientMaterial => "insufficient material",
            Self::ThreefoldRepetition => "threefold repetition",
        };
        write!(f, "{reason}")
    }
}

/// The state of a game, from the point of view of the side to move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub enum GameState {
    /// Normal play.
    #[default]
    Playing,

    /// The side to move is in check, but has a way out.
    Check,

    /// The side to move is in check and has no way out. The game is over.
    Checkmate,

    /// The game is over without a winner.
    Draw(DrawReason),

    /// A Pawn has reached the last rank and is waiting for its promotion piece to be chosen.
    Promotion,
}

impl GameState {
    /// Returns `true` if no further moves may be played.
    #[inline(always)]
    pub const fn is_over(&self) -> bool {
        matches!(self, Self::Checkmate | Self::Draw(_))
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing => write!(f, "playing"),
            Self::Check => write!(f, "check"),
            Self::Checkmate => write!(f, "checkmate"),
            Self::Draw(reason) => write!(f, "draw by {reason}"),
            Self::Promotion => write!(f, "awaiting promotion"),
        }
    }
}

/// Everything about a game that the pieces on the board do not tell you.
///
/// This is analogous to the last five fields of a FEN string, plus the game's state and winner.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Context {
    /// The [`Color`] of the current player.
    pub(crate) side_to_move: Color,

    /// Castling rights for each player.
    pub(crate) castling_rights: [CastlingRights; Color::COUNT],

    /// The square a Pawn just skipped over with a double push, if any.
    pub(crate) ep_square: Option<Square>,

    /// Used to enforce the fifty-move rule.
    ///
    /// - Incremented after each move.
    /// - Reset after a capture or a pawn moves.
    pub(crate) halfmove: usize,

    /// Number of moves since the beginning of the game.
    ///
    /// A fullmove is a complete turn by white and then by black.
    pub(crate) fullmove: usize,

    pub(crate) state: GameState,

    /// Only set once the game has ended in checkmate.
    pub(crate) winner: Option<Color>,
}

impl Context {
    /// Creates a new [`Context`] with White to move, no castling rights, no en passant square,
    /// a halfmove clock of 0 and a fullmove counter of 1.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            side_to_move: Color::White,
            castling_rights: [CastlingRights::NONE; Color::COUNT],
            ep_square: None,
            halfmove: 0,
            fullmove: 1,
            state: GameState::Playing,
            winner: None,
        }
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Returns the [`CastlingRights`] of both players, indexable by [`Color`].
    #[inline(always)]
    pub const fn castling_rights(&self) -> &[CastlingRights; Color::COUNT] {
        &self.castling_rights
    }

    /// If en passant can be performed, returns the en passant [`Square`].
    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline(always)]
    pub const fn halfmove(&self) -> usize {
        self.halfmove
    }

    #[inline(always)]
    pub const fn fullmove(&self) -> usize {
        self.fullmove
    }

    #[inline(always)]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// The player who delivered checkmate, if the game ended that way.
    #[inline(always)]
    pub const fn winner(&self) -> Option<Color> {
        self.winner
    }

    /// Returns the [`CastlingRights`] in FEN notation, such as `KQkq`, or `-` if nobody can castle.
    pub fn castling_rights_uci(&self) -> String {
        let mut castling = String::with_capacity(4);

        if self.castling_rights[Color::White].short {
            castling.push('K');
        }
        if self.castling_rights[Color::White].long {
            castling.push('Q');
        }
        if self.castling_rights[Color::Black].short {
            castling.push('k');
        }
        if self.castling_rights[Color::Black].long {
            castling.push('q');
        }

        if castling.is_empty() {
            castling.push('-');
        }
        castling
    }

    /// Updates castling rights, en passant, the move counters and the side to move after `mv`
    /// has been played on the board.
    ///
    /// The game's state is left untouched.
    pub(crate) fn record_move(&mut self, mv: &Move) {
        // Anything leaving or landing on a King or Rook home square ends that castling right
        self.revoke_castling_rights(mv.from());
        self.revoke_castling_rights(mv.to());

        self.ep_square = mv.is_pawn_double_push().then(|| {
            let rank = (mv.from().rank() + mv.to().rank()) / 2;
            Square::new(mv.from().file(), rank)
        });

        if mv.piece().is_kind(PieceKind::Pawn) || mv.is_capture() {
            self.halfmove = 0;
        } else {
            self.halfmove += 1;
        }

        if self.side_to_move == Color::Black {
            self.fullmove += 1;
        }
        self.side_to_move = self.side_to_move.opponent();
    }

    #[inline(always)]
    fn revoke_castling_rights(&mut self, square: Square) {
        match square {
            Square::A1 => self.castling_rights[Color::White].long = false,
            Square::H1 => self.castling_rights[Color::White].short = false,
            Square::E1 => self.castling_rights[Color::White] = CastlingRights::NONE,
            Square::A8 => self.castling_rights[Color::Black].long = false,
            Square::H8 => self.castling_rights[Color::Black].short = false,
            Square::E8 => self.castling_rights[Color::Black] = CastlingRights::NONE,
            _ => {}
        }
    }
}

impl Default for Context {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

/// A [`Board`] together with its [`Context`].
///
/// This is analogous to a FEN string. It knows how to play a move, but not whether the game is over;
/// that is the job of [`crate::Game`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub(crate) board: Board,
    pub(crate) context: Context,
}

impl Position {
    /// Creates a new, empty [`Position`] with the following properties:
    /// * No pieces on the board
    /// * White moves first
    /// * No castling rights
    /// * No en passant square available
    /// * Halfmove counter set to 0
    /// * Fullmove counter set to 1
    ///
    /// # Example
    /// ```
    /// # use arbiter::Position;
    /// let position = Position::new();
    /// assert_eq!(position.to_fen(), "8/8/8/8/8/8/8/8 w - - 0 1");
    /// ```
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            board: Board::new(),
            context: Context::new(),
        }
    }

    /// Creates a new [`Position`] from the provided FEN string.
    ///
    /// Only the piece placements are required. Missing fields default to `w - - 0 1`.
    ///
    /// # Example
    /// ```
    /// # use arbiter::*;
    /// let position = Position::from_fen("4k3/8/8/8/8/8/8/4K2R").unwrap();
    /// assert_eq!(position.to_fen(), "4k3/8/8/8/8/8/8/4K2R w - - 0 1");
    /// assert!(Position::from_fen("4k3/8/8/8/8/8/8/4K2R w KX - 0 1").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut pos = Self::new();
        let mut split = fen.split_ascii_whitespace();
        let placements = split
            .next()
            .ok_or(anyhow!("FEN string must have piece placements."))?;
        pos.board = Board::from_fen(placements)?;

        let active_color = split.next().unwrap_or("w");
        pos.context.side_to_move = Color::from_str(active_color)?;

        let castling = split.next().unwrap_or("-");
        if castling != "-" {
            for c in castling.chars() {
                match c {
                    'K' => pos.context.castling_rights[Color::White].short = true,
                    'Q' => pos.context.castling_rights[Color::White].long = true,
                    'k' => pos.context.castling_rights[Color::Black].short = true,
                    'q' => pos.context.castling_rights[Color::Black].long = true,
                    _ => bail!("Invalid castling rights {castling:?} in FEN {fen:?}"),
                }
            }
        }

        let en_passant_target = split.next().unwrap_or("-");
        pos.context.ep_square = match en_passant_target {
            "-" => None,
            square => {
                let square = Square::from_uci(square)?;
                if square.rank() != 2 && square.rank() != 5 {
                    bail!("En passant square must be on the third or sixth rank. Got {square}");
                }
                Some(square)
            }
        };

        let halfmove = split.next().unwrap_or("0");
        pos.context.halfmove = halfmove.parse().or(Err(anyhow!(
            "FEN string must have valid halfmove counter. Got {halfmove:?}"
        )))?;

        let fullmove = split.next().unwrap_or("1");
        pos.context.fullmove = fullmove.parse().or(Err(anyhow!(
            "FEN string must have valid fullmove counter. Got {fullmove:?}"
        )))?;

        if let Some(extra) = split.next() {
            bail!("Unexpected trailing field {extra:?} in FEN {fen:?}");
        }

        Ok(pos)
    }

    /// Generates a FEN string from this [`Position`].
    ///
    /// # Example
    /// ```
    /// # use arbiter::Position;
    /// let position = Position::default();
    /// assert_eq!(position.to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    /// ```
    pub fn to_fen(&self) -> String {
        format!("{self}")
    }

    /// Fetches this position's [`Board`]
    #[inline(always)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Fetches this position's [`Context`]
    #[inline(always)]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the current player as a [`Color`].
    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.context.side_to_move
    }

    /// Plays `mv`, updating the board and every counter and right in the [`Context`].
    ///
    /// No legality is enforced. `mv` must have been generated for this position.
    #[inline(always)]
    pub fn make_move(&mut self, mv: &Move) {
        self.board.apply_move(mv);
        self.context.record_move(mv);
    }

    /// Copies `self` and returns a [`Position`] after having applied the provided [`Move`].
    #[inline(always)]
    pub fn with_move_made(&self, mv: &Move) -> Self {
        let mut copied = *self;
        copied.make_move(mv);
        copied
    }

    /// All legal moves of the piece on `square`, whichever side it belongs to.
    #[inline(always)]
    pub fn legal_moves_from(&self, square: Square) -> MoveList {
        legal_moves(&self.board, square, &self.context)
    }

    /// All legal moves for the side to move.
    #[inline(always)]
    pub fn legal_moves(&self) -> MoveList {
        all_legal_moves(&self.board, self.side_to_move(), &self.context)
    }

    /// Returns `true` if the side to move has at least one legal move.
    #[inline(always)]
    pub fn has_legal_move(&self) -> bool {
        has_legal_move(&self.board, self.side_to_move(), &self.context)
    }

    /// Returns `true` if the side to move is in check.
    #[inline(always)]
    pub fn is_in_check(&self) -> bool {
        is_in_check(&self.board, self.side_to_move())
    }

    /// According to [FIDE](https://en.wikipedia.org/wiki/Threefold_repetition#Statement_of_the_rule) rules,
    /// two positions are considered the same if they share the same piece layout, side to move,
    /// castling rights, and en passant square. Move counters and game state are ignored.
    #[inline(always)]
    pub fn is_same_as(&self, other: &Self) -> bool {
        self.side_to_move() == other.side_to_move()
            && self.context.ep_square == other.context.ep_square
            && self.context.castling_rights == other.context.castling_rights
            && self.board == other.board
    }

    /// Checks if the position has insufficient material.
    ///
    /// Insufficient material is when neither side can deliver checkmate:
    /// lone Kings, a King and a single minor piece against a lone King,
    /// or a King and Bishop each where the Bishops share a square color.
    ///
    /// # Example
    /// ```
    /// # use arbiter::*;
    /// // Opposing Bishops on the same color square
    /// let same_square_bishops: Position = "8/2b1k3/8/8/3K4/8/5B2/8 w - - 0 1".parse().unwrap();
    /// assert!(same_square_bishops.can_draw_by_insufficient_material());
    ///
    /// // Opposing Bishops on different color squares
    /// let diff_square_bishops: Position = "8/3bk3/8/8/3K4/8/5B2/8 w - - 0 1".parse().unwrap();
    /// assert!(!diff_square_bishops.can_draw_by_insufficient_material());
    /// ```
    pub fn can_draw_by_insufficient_material(&self) -> bool {
        let mut minors = Vec::with_capacity(2);

        for (square, piece) in self.board.pieces() {
            match piece.kind() {
                Some(PieceKind::King) | None => {}
                Some(PieceKind::Knight | PieceKind::Bishop) => minors.push((square, piece)),
                // If either side has a Queen, Rook, or Pawn, there remains sufficient material
                Some(_) => return false,
            }
        }

        match minors.as_slice() {
            // Lone kings, or a single minor piece
            [] | [_] => true,

            // Each King has a single Bishop, on the same square color
            [(a, first), (b, second)] => {
                first.is_kind(PieceKind::Bishop)
                    && second.is_kind(PieceKind::Bishop)
                    && first.is_enemy_of(*second)
                    && a.is_light() == b.is_light()
            }

            // All other cases have sufficient material, even if checkmate requires coercion.
            _ => false,
        }
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Deref for Position {
    type Target = Board;
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        self.board()
    }
}

impl Default for Position {
    /// Standard starting position for Chess.
    #[inline(always)]
    fn default() -> Self {
        Self {
            board: Board::default(),
            context: Context {
                castling_rights: [CastlingRights::BOTH; Color::COUNT],
                ..Context::new()
            },
        }
    }
}

impl fmt::Display for Position {
    /// Display this position's FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let placements = self.board.to_fen();
        let active_color = self.side_to_move().to_uci();
        let castling = self.context.castling_rights_uci();

        let en_passant_target = if let Some(square) = self.context.ep_square {
            square.to_string()
        } else {
            String::from("-")
        };

        let halfmove = self.context.halfmove;
        let fullmove = self.context.fullmove;

        write!(
            f,
            "{placements} {active_color} {castling} {en_passant_target} {halfmove} {fullmove}"
        )
    }
}

impl fmt::Debug for Position {
    /// Displays the board with the FEN fields beside it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.board.to_string();
        let ep = self
            .context
            .ep_square
            .map(|square| square.to_uci())
            .unwrap_or(String::from("-"));

        for (i, line) in board.lines().enumerate() {
            write!(f, "{line}")?;
            match i {
                1 => write!(f, "           FEN: {}", self.to_fen())?,
                2 => write!(f, "          Side: {}", self.side_to_move())?,
                3 => write!(f, "      Castling: {}", self.context.castling_rights_uci())?,
                4 => write!(f, "            EP: {ep}")?,
                5 => write!(f, "     Half-move: {}", self.context.halfmove)?,
                6 => write!(f, "     Full-move: {}", self.context.fullmove)?,
                7 => write!(f, "         State: {}", self.context.state)?,
                _ => {}
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::*;

    fn play(position: &mut Position, moves: &[&str]) {
        for uci in moves {
            let (from, to, promotion) = Move::parse_coordinates(uci).unwrap();
            let mv = position
                .legal_moves_from(from)
                .into_iter()
                .find(|mv| mv.to() == to && mv.promotion() == promotion)
                .unwrap_or_else(|| panic!("{uci} is not legal in {position}"));
            position.make_move(&mv);
        }
    }

    #[test]
    fn test_fen_round_trips() {
        for fen in [FEN_STARTPOS, FEN_KIWIPETE, "8/8/8/4Pp2/8/8/8/k6K w - f6 0 42"] {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn test_bad_fens() {
        assert!(Position::from_fen("").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 x").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - e4").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - - x").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1 extra").is_err());
    }

    #[test]
    fn test_counters_and_ep() {
        let mut position = Position::default();
        play(&mut position, &["e2e4"]);
        assert_eq!(position.context().ep_square(), Some(Square::E3));
        assert_eq!(position.context().fullmove(), 1);
        assert_eq!(position.side_to_move(), Color::Black);

        play(&mut position, &["g8f6"]);
        assert_eq!(position.context().ep_square(), None);
        assert_eq!(position.context().halfmove(), 1);
        assert_eq!(position.context().fullmove(), 2);

        play(&mut position, &["g1f3", "f6e4"]);
        // Captures reset the clock
        assert_eq!(position.context().halfmove(), 0);
    }

    #[test]
    fn test_castling_rights_revoked() {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        play(&mut position, &["h1h8"]);
        assert_eq!(position.context().castling_rights_uci(), "Qq");

        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        play(&mut position, &["e1g1"]);
        assert_eq!(position.context().castling_rights_uci(), "kq");
        assert_eq!(position[Square::F1], Piece::WHITE_ROOK);

        play(&mut position, &["a8a1"]);
        assert_eq!(position.context().castling_rights_uci(), "k");
    }

    #[test]
    fn test_repetition_identity_ignores_counters() {
        let start = Position::default();
        let mut position = start;
        play(&mut position, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert!(position.is_same_as(&start));
        assert_ne!(position, start);
    }

    #[test]
    fn test_insufficient_material() {
        let lone_kings: Position = "8/8/3k4/8/8/4K3/8/8 w - - 0 1".parse().unwrap();
        assert!(lone_kings.can_draw_by_insufficient_material());

        let knight: Position = "8/8/3k4/8/8/4K3/8/6N1 w - - 0 1".parse().unwrap();
        assert!(knight.can_draw_by_insufficient_material());

        let two_knights: Position = "8/8/3k4/8/8/4K3/8/5NN1 w - - 0 1".parse().unwrap();
        assert!(!two_knights.can_draw_by_insufficient_material());

        let pawn: Position = "8/8/3k4/8/8/4K3/7P/8 w - - 0 1".parse().unwrap();
        assert!(!pawn.can_draw_by_insufficient_material());
    }
}
