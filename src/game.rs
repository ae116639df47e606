//! San Jego's view of the players, and the evaluation interface that the search algorithms run on.
//!
//! Positions implement [`board_game_traits::Position`]. Player one plays as [`Color::White`] and player two as [`Color::Black`].

use board_game_traits::{Color, GameResult, Position as PositionTrait};

/// Names and game value conventions for the two players.
pub trait Player: Copy + Sized {
    /// Player one maximises the game value, player two minimises it
    fn is_maximising(self) -> bool;

    /// 1 for player one, -1 for player two
    fn value_multiplier(self) -> i32;

    /// The player's number in position strings, '1' or '2'
    fn player_id(self) -> char;

    fn from_player_id(id: char) -> Option<Self>;

    fn player_name(self) -> &'static str;
}

impl Player for Color {
    fn is_maximising(self) -> bool {
        self == Color::White
    }

    fn value_multiplier(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    fn player_id(self) -> char {
        match self {
            Color::White => '1',
            Color::Black => '2',
        }
    }

    fn from_player_id(id: char) -> Option<Self> {
        match id {
            '1' => Some(Color::White),
            '2' => Some(Color::Black),
            _ => None,
        }
    }

    fn player_name(self) -> &'static str {
        match self {
            Color::White => "player 1",
            Color::Black => "player 2",
        }
    }
}

/// The result of a finished game with the given value
pub fn result_from_value(value: i32) -> GameResult {
    match value.signum() {
        1 => GameResult::WhiteWin,
        -1 => GameResult::BlackWin,
        _ => GameResult::Draw,
    }
}

/// A position that can be searched with alpha-beta search.
///
/// The game ends when `generate_moves` produces no moves, so search algorithms can be run on toy trees as well as on real San Jego positions.
pub trait GamePosition: PositionTrait {
    /// The value of the position from player one's point of view.
    fn static_eval(&self) -> i32;

    /// Sorts moves so that the most promising ones for the side to move come first.
    fn order_moves(&mut self, _moves: &mut [Self::Move]) {}

    /// A hash of the full game state, if the position supports transposition detection.
    fn position_hash(&self) -> Option<u64> {
        None
    }
}
