use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::position::Square;

/// A legal move for a position.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Move {
    /// Move the whole tower on the first square on top of the tower on the second square
    Stack(Square, Square),
    /// Pass, only legal when the side to move has no other move
    Skip,
}

impl Move {
    pub fn is_skip(self) -> bool {
        self == Move::Skip
    }

    pub fn origin_square(self) -> Option<Square> {
        match self {
            Move::Stack(from, _) => Some(from),
            Move::Skip => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Stack(from, to) => write!(f, "{}-{}", from, to),
            Move::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for Move {
    type Err = pgn_traits::Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input == "skip" {
            return Ok(Move::Skip);
        }
        match input.split_once('-') {
            Some((from, to)) => Ok(Move::Stack(
                Square::parse_square(from)?,
                Square::parse_square(to)?,
            )),
            None => Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse move \"{}\": expected \"skip\" or two squares separated by '-'",
                input
            ))),
        }
    }
}

/// The counterpart of `Move`. When applied to a `Position`, it fully reverses the accompanying `Move`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReverseMove {
    /// Origin and target square, number of bricks moved, and whether the previous move was a skip
    Stack(Square, Square, u8, bool),
    Skip,
}
