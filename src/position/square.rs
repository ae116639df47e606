use std::fmt;
use std::str::FromStr;

use arrayvec::ArrayVec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};


/// The widest board that squares can be written for, one column letter per column
pub const MAX_WIDTH: u8 = 26;

/// A location on the board, as a zero-based row and column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square {
    pub row: u8,
    pub column: u8,
}

/// Which squares count as neighbours of a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Neighbourhood {
    /// The four orthogonally adjacent squares
    Quad,
    /// All eight surrounding squares, like a chess king moves
    Kings,
}

const QUAD_OFFSETS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

const KINGS_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl Neighbourhood {
    fn offsets(self) -> &'static [(i8, i8)] {
        match self {
            Neighbourhood::Quad => &QUAD_OFFSETS,
            Neighbourhood::Kings => &KINGS_OFFSETS,
        }
    }

    /// Whether `to` is a neighbour of `from`. A square is never its own neighbour.
    pub fn contains(self, from: Square, to: Square) -> bool {
        let d_row = to.row as i16 - from.row as i16;
        let d_column = to.column as i16 - from.column as i16;
        self.offsets()
            .iter()
            .any(|&(r, c)| r as i16 == d_row && c as i16 == d_column)
    }
}

impl Square {
    pub const fn new(row: u8, column: u8) -> Self {
        Square { row, column }
    }

    /// Index into a row-major board of the given width
    pub const fn index(self, width: u8) -> usize {
        self.row as usize * width as usize + self.column as usize
    }

    pub const fn from_index(index: usize, width: u8) -> Self {
        Square {
            row: (index / width as usize) as u8,
            column: (index % width as usize) as u8,
        }
    }

    pub const fn is_on_board(self, height: u8, width: u8) -> bool {
        self.row < height && self.column < width
    }

    pub fn go_offset(self, (d_row, d_column): (i8, i8), height: u8, width: u8) -> Option<Square> {
        let row = self.row.checked_add_signed(d_row)?;
        let column = self.column.checked_add_signed(d_column)?;
        let square = Square { row, column };
        if square.is_on_board(height, width) {
            Some(square)
        } else {
            None
        }
    }

    /// All neighbours of the square that lie on the board, in a fixed order
    pub fn neighbours(
        self,
        neighbourhood: Neighbourhood,
        height: u8,
        width: u8,
    ) -> ArrayVec<Square, 8> {
        neighbourhood
            .offsets()
            .iter()
            .filter_map(|&offset| self.go_offset(offset, height, width))
            .collect()
    }

    pub fn parse_square(input: &str) -> Result<Square, pgn_traits::Error> {
        let mut chars = input.chars();
        let column = match chars.next() {
            Some(ch @ 'a'..='z') => ch as u8 - b'a',
            _ => {
                return Err(pgn_traits::Error::new_parse_error(format!(
                    "Couldn't parse square \"{}\": expected a column letter",
                    input
                )))
            }
        };
        let rank: u8 = chars.as_str().parse().map_err(|err| {
            pgn_traits::Error::new_caused_by(
                pgn_traits::ErrorKind::ParseError,
                format!("Couldn't parse square \"{}\"", input),
                err,
            )
        })?;
        if rank == 0 {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse square \"{}\": rows are numbered from 1",
                input
            )));
        }
        Ok(Square::new(rank - 1, column))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.column) as char, self.row as u16 + 1)
    }
}

impl FromStr for Square {
    type Err = pgn_traits::Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Square::parse_square(input)
    }
}
