//! San Jego positions and move generation, along with all required data types.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter;
use std::str::FromStr;

use board_game_traits::{Color, GameResult, Position as PositionTrait};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::game::{result_from_value, GamePosition, Player};
use crate::rules::{
    BaseRules, FreeRules, KingsRules, MajorityRules, OpposeRules, RuleSet, Rules,
};

mod board;
mod mv;
mod square;
mod tower;

pub use board::Board;
pub use mv::{Move, ReverseMove};
pub use square::{Neighbourhood, Square, MAX_WIDTH};
pub use tower::{Tower, MAX_TOWER_HEIGHT};

const SIDE_TO_MOVE_KEY: u64 = 0x2D35_8DCC_AA6C_78A5;
const SKIPPED_KEY: u64 = 0x8BB8_4B93_962E_ACC9;

/// Everything needed to set up a new game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    pub height: u8,
    pub width: u8,
    pub rules: Rules,
    /// Whether the maximising player, player one, makes the first move
    pub max_player_starts: bool,
}

impl Settings {
    pub fn new(height: u8, width: u8) -> Self {
        Settings {
            height,
            width,
            rules: Rules::default(),
            max_player_starts: true,
        }
    }

    pub fn rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    pub fn max_player_starts(mut self, max_player_starts: bool) -> Self {
        self.max_player_starts = max_player_starts;
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new(3, 3)
    }
}

/// A complete game state: the board, the ruleset, whose turn it is and whether the previous move was a skip.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    rules: Rules,
    to_move: Color,
    skipped: bool,
    hash: u64,
}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl Position {
    /// The start position of a game, or an error if the board cannot be created.
    /// `start_position_with_settings` is the same, but panics on bad settings.
    pub fn from_settings(settings: Settings) -> Result<Self, Error> {
        let board = Board::new(settings.height, settings.width)?;
        let to_move = if settings.max_player_starts {
            Color::White
        } else {
            Color::Black
        };
        Ok(Self::from_board(board, settings.rules, to_move))
    }

    /// Like `from_settings`, but with the ruleset given by name
    pub fn fabricate(
        rules: &str,
        height: u8,
        width: u8,
        max_player_starts: bool,
    ) -> Result<Self, Error> {
        let rules = Rules::from_str(rules)?;
        Self::from_settings(
            Settings::new(height, width)
                .rules(rules)
                .max_player_starts(max_player_starts),
        )
    }

    pub fn from_board(board: Board, rules: Rules, to_move: Color) -> Self {
        let mut position = Position {
            board,
            rules,
            to_move,
            skipped: false,
            hash: 0,
        };
        position.hash = position.zobrist_hash_from_scratch();
        position
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// Whether the previous move was a skip
    pub fn skipped(&self) -> bool {
        self.skipped
    }

    pub fn value(&self) -> i32 {
        self.board.value()
    }

    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = vec![];
        self.generate_moves(&mut moves);
        moves
    }

    /// The game is over once a player has skipped and their opponent cannot move either.
    pub fn is_terminal(&self) -> bool {
        self.skipped && !self.has_stack_move()
    }

    fn has_stack_move(&self) -> bool {
        self.board.squares().any(|from| {
            from.neighbours(self.rules.neighbourhood(), self.board.height(), self.board.width())
                .into_iter()
                .any(|to| self.rules.allows_move(&self.board, self.to_move, from, to))
        })
    }

    fn generate_moves_rules<R: RuleSet, E: Extend<Move>>(&self, moves: &mut E) {
        let (height, width) = (self.board.height(), self.board.width());
        let mut has_moves = false;
        for (from, tower) in self.board.towers() {
            if !R::may_move_tower(self.to_move, tower) {
                continue;
            }
            for to in from.neighbours(R::NEIGHBOURHOOD, height, width) {
                if R::allows_move(&self.board, self.to_move, from, to) {
                    moves.extend(iter::once(Move::Stack(from, to)));
                    has_moves = true;
                }
            }
        }
        if !has_moves && !self.skipped {
            moves.extend(iter::once(Move::Skip));
        }
    }

    fn zobrist_hash_from_scratch(&self) -> u64 {
        let width = self.board.width();
        self.board
            .towers()
            .fold(flags_key(self.to_move, self.skipped), |hash, (square, tower)| {
                hash ^ tower.zobrist_key(square.index(width))
            })
    }

    fn zobrist_hash_for_square(&self, square: Square) -> u64 {
        self.board[square].zobrist_key(square.index(self.board.width()))
    }

    /// Heuristic sort key for a move. Lower keys are searched first.
    ///
    /// Moves are rated by the board value they lead to, with a bonus for moving towers near the centre of the board.
    pub(crate) fn move_ordering_key(&mut self, mv: Move) -> i64 {
        let multiplier = self.to_move.value_multiplier() as i64;
        let centrality = match mv {
            Move::Stack(from, _) => {
                let (height, width) = (self.board.height() as i64, self.board.width() as i64);
                let (row, column) = (from.row as i64, from.column as i64);
                (2 * height - (2 * row - height).abs()) + (2 * width - (2 * column - width).abs())
            }
            Move::Skip => 0,
        };
        let reverse_move = self.do_move(mv);
        let value = self.value() as i64;
        self.reverse_move(reverse_move);
        -multiplier * 2 * value - centrality
    }
}

fn flags_key(to_move: Color, skipped: bool) -> u64 {
    let mut key = 0;
    if to_move == Color::Black {
        key ^= SIDE_TO_MOVE_KEY;
    }
    if skipped {
        key ^= SKIPPED_KEY;
    }
    key
}

impl PositionTrait for Position {
    type Move = Move;
    type ReverseMove = ReverseMove;
    type Settings = Settings;

    fn start_position() -> Self {
        Self::start_position_with_settings(&Settings::default())
    }

    fn start_position_with_settings(settings: &Self::Settings) -> Self {
        Self::from_settings(*settings)
            .unwrap_or_else(|err| panic!("Cannot start a game with {:?}: {}", settings, err))
    }

    fn side_to_move(&self) -> Color {
        self.to_move
    }

    /// Adds all legal moves to the provided vector, checking squares row by row.
    ///
    /// A player without legal moves must skip, unless the opponent just skipped. In that case the game is over.
    fn generate_moves<E: Extend<Self::Move>>(&self, moves: &mut E) {
        match self.rules {
            Rules::Base => self.generate_moves_rules::<BaseRules, E>(moves),
            Rules::Kings => self.generate_moves_rules::<KingsRules, E>(moves),
            Rules::Oppose => self.generate_moves_rules::<OpposeRules, E>(moves),
            Rules::Majority => self.generate_moves_rules::<MajorityRules, E>(moves),
            Rules::Free => self.generate_moves_rules::<FreeRules, E>(moves),
        }
    }

    fn do_move(&mut self, mv: Self::Move) -> Self::ReverseMove {
        let old_flags = flags_key(self.to_move, self.skipped);
        let reverse_move = match mv {
            Move::Stack(from, to) => {
                self.hash ^= self.zobrist_hash_for_square(from);
                self.hash ^= self.zobrist_hash_for_square(to);
                let height = self
                    .board
                    .stack(from, to)
                    .unwrap_or_else(|| panic!("Illegal move {} on board\n{:?}", mv, self.board));
                self.hash ^= self.zobrist_hash_for_square(to);

                let reverse_move = ReverseMove::Stack(from, to, height, self.skipped);
                self.skipped = false;
                reverse_move
            }
            Move::Skip => {
                debug_assert!(!self.skipped, "Cannot skip twice in a row");
                self.skipped = true;
                ReverseMove::Skip
            }
        };
        self.to_move = !self.to_move;
        self.hash ^= old_flags ^ flags_key(self.to_move, self.skipped);
        reverse_move
    }

    fn reverse_move(&mut self, reverse_move: Self::ReverseMove) {
        let old_flags = flags_key(self.to_move, self.skipped);
        match reverse_move {
            ReverseMove::Stack(from, to, height, skipped) => {
                self.hash ^= self.zobrist_hash_for_square(to);
                self.board.unstack(from, to, height);
                self.hash ^= self.zobrist_hash_for_square(from);
                self.hash ^= self.zobrist_hash_for_square(to);
                self.skipped = skipped;
            }
            ReverseMove::Skip => {
                debug_assert!(self.skipped);
                self.skipped = false;
            }
        }
        self.to_move = !self.to_move;
        self.hash ^= old_flags ^ flags_key(self.to_move, self.skipped);
        debug_assert_eq!(self.hash, self.zobrist_hash_from_scratch());
    }

    /// The game is decided by the value of the final board.
    fn game_result(&self) -> Option<GameResult> {
        if self.is_terminal() {
            Some(result_from_value(self.value()))
        } else {
            None
        }
    }
}

impl GamePosition for Position {
    fn static_eval(&self) -> i32 {
        self.value()
    }

    fn order_moves(&mut self, moves: &mut [Self::Move]) {
        moves.sort_by_cached_key(|mv| self.move_ordering_key(*mv));
    }

    fn position_hash(&self) -> Option<u64> {
        Some(self.hash)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.board, self.to_move.player_id(), self.rules)?;
        if self.skipped {
            write!(f, " skipped")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.board)?;
        write!(
            f,
            "{} to move, {} rules, value {}",
            self.to_move.player_name(),
            self.rules,
            self.value()
        )?;
        if self.skipped {
            write!(f, ", previous move was a skip")?;
        }
        writeln!(f)
    }
}

impl FromStr for Position {
    type Err = pgn_traits::Error;

    /// Parses positions written as `<board> <side to move> <rules>`, optionally followed by `skipped`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = input.split_whitespace().collect();
        if words.len() < 3 {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse position \"{}\", expected a board, a side to move and a ruleset",
                input
            )));
        }
        if words.len() > 4 || (words.len() == 4 && words[3] != "skipped") {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse position \"{}\", unexpected \"{}\"",
                input,
                words[3..].join(" ")
            )));
        }

        let board = Board::from_str(words[0])?;
        let to_move = match words[1].chars().collect::<Vec<_>>().as_slice() {
            [id] => Color::from_player_id(*id),
            _ => None,
        }
        .ok_or_else(|| {
            pgn_traits::Error::new_parse_error(format!(
                "Error parsing position \"{}\": Got bad side to move \"{}\"",
                input, words[1]
            ))
        })?;
        let rules = Rules::from_str(words[2]).map_err(|err| {
            pgn_traits::Error::new_caused_by(
                pgn_traits::ErrorKind::ParseError,
                format!("Error parsing position \"{}\"", input),
                err,
            )
        })?;

        let mut position = Position::from_board(board, rules, to_move);
        if words.len() == 4 {
            position.skipped = true;
            position.hash = position.zobrist_hash_from_scratch();
        }
        Ok(position)
    }
}
