use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use board_game_traits::Color;

use crate::error::{Error, ErrorKind};
use crate::position::square::MAX_WIDTH;
use crate::position::tower::MAX_TOWER_HEIGHT;
use crate::position::{Square, Tower};

/// A rectangular grid of towers.
///
/// The board does not know about rules, it only checks that a move is technically possible.
/// It maintains that all bricks on the board together fit in a single tower.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    height: u8,
    width: u8,
    towers: Vec<Tower>,
}

impl Board {
    /// Creates the starting board, with one brick on every square in a chessboard pattern.
    /// The top left square belongs to player one.
    pub fn new(height: u8, width: u8) -> Result<Self, Error> {
        let mut board = Self::empty(height, width)?;
        if height as usize * width as usize > MAX_TOWER_HEIGHT as usize {
            return Err(Error::new(
                ErrorKind::InvalidDimensions,
                format!(
                    "a {}x{} board has more than {} squares",
                    height, width, MAX_TOWER_HEIGHT
                ),
            ));
        }
        for square in board.squares() {
            let owner = if (square.row + square.column) % 2 == 0 {
                Color::White
            } else {
                Color::Black
            };
            board.towers[square.index(width)] = Tower::new(owner);
        }
        Ok(board)
    }

    /// A board without any towers
    pub fn empty(height: u8, width: u8) -> Result<Self, Error> {
        if height == 0 || width == 0 || width > MAX_WIDTH {
            return Err(Error::new(
                ErrorKind::InvalidDimensions,
                format!(
                    "cannot create a {}x{} board, the width must be between 1 and {} and the height at least 1",
                    height, width, MAX_WIDTH
                ),
            ));
        }
        Ok(Board {
            height,
            width,
            towers: vec![Tower::EMPTY; height as usize * width as usize],
        })
    }

    /// Creates a board just large enough to hold all the given towers. All other squares are empty.
    pub fn from_towers<I: IntoIterator<Item = (Square, Tower)>>(towers: I) -> Result<Self, Error> {
        let towers: Vec<(Square, Tower)> = towers.into_iter().collect();
        let height = towers.iter().map(|(square, _)| square.row as u16 + 1).max();
        let width = towers.iter().map(|(square, _)| square.column as u16 + 1).max();
        let (height, width) = match (height, width) {
            (Some(height), Some(width)) if height <= u8::MAX as u16 => (height as u8, width as u8),
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidDimensions,
                    "cannot fit the given towers on a board",
                ))
            }
        };
        let mut board = Self::empty(height, width)?;
        for (square, tower) in towers {
            if !board.set_tower(square, tower) {
                return Err(Error::new(
                    ErrorKind::TowerTooHigh,
                    format!(
                        "the board cannot hold more than {} bricks in total",
                        MAX_TOWER_HEIGHT
                    ),
                ));
            }
        }
        Ok(board)
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn num_squares(&self) -> usize {
        self.towers.len()
    }

    /// All squares of the board, row by row
    pub fn squares(&self) -> impl Iterator<Item = Square> {
        let width = self.width;
        (0..self.num_squares()).map(move |i| Square::from_index(i, width))
    }

    /// All non-empty squares with their towers, row by row
    pub fn towers(&self) -> impl Iterator<Item = (Square, Tower)> + '_ {
        self.towers
            .iter()
            .enumerate()
            .filter(|(_, tower)| !tower.is_empty())
            .map(move |(i, tower)| (Square::from_index(i, self.width), *tower))
    }

    pub fn contains(&self, square: Square) -> bool {
        square.is_on_board(self.height, self.width)
    }

    /// The tower on `square`, or `None` if the square is outside the board.
    /// Empty squares hold the empty tower.
    pub fn tower(&self, square: Square) -> Option<Tower> {
        if self.contains(square) {
            Some(self.towers[square.index(self.width)])
        } else {
            None
        }
    }

    /// Replaces whatever is on `square`. Setting the empty tower clears the square.
    ///
    /// Returns `false`, leaving the board unchanged, if the square is outside the board
    /// or the board would hold more bricks than fit in a single tower.
    pub fn set_tower(&mut self, square: Square, tower: Tower) -> bool {
        if !self.contains(square) {
            return false;
        }
        let index = square.index(self.width);
        let bricks_elsewhere = self.total_bricks() - self.towers[index].height() as usize;
        if bricks_elsewhere + tower.height() as usize > MAX_TOWER_HEIGHT as usize {
            return false;
        }
        self.towers[index] = tower;
        true
    }

    pub fn total_bricks(&self) -> usize {
        self.towers.iter().map(|tower| tower.height() as usize).sum()
    }

    /// Moves the tower on `from` on top of the tower on `to`, and returns the number of bricks moved.
    ///
    /// Only checks that the move is technically possible: both squares must be distinct squares on the board holding towers.
    pub fn stack(&mut self, from: Square, to: Square) -> Option<u8> {
        if from == to {
            return None;
        }
        let upper = self.tower(from).filter(|tower| !tower.is_empty())?;
        let lower = self.tower(to).filter(|tower| !tower.is_empty())?;
        self.towers[to.index(self.width)] = upper.stacked_on(lower);
        self.towers[from.index(self.width)] = Tower::EMPTY;
        Some(upper.height())
    }

    /// Reverses `stack`, moving the top `height` bricks on `to` back to the empty square `from`.
    pub fn unstack(&mut self, from: Square, to: Square, height: u8) {
        debug_assert!(self[from].is_empty(), "Cannot unstack onto {}", from);
        debug_assert!(self[to].height() > height);
        let (upper, lower) = self[to].split_top(height);
        self.towers[from.index(self.width)] = upper;
        self.towers[to.index(self.width)] = lower;
    }

    /// Height of the tallest tower owned by `player`, or 0 if the player owns no towers
    pub fn tallest_tower(&self, player: Color) -> u8 {
        self.towers
            .iter()
            .filter(|tower| tower.owner() == Some(player))
            .map(|tower| tower.height())
            .max()
            .unwrap_or(0)
    }

    /// The difference in height between player one's and player two's tallest towers.
    /// Positive values favour player one.
    pub fn value(&self) -> i32 {
        self.tallest_tower(Color::White) as i32 - self.tallest_tower(Color::Black) as i32
    }
}

impl Index<Square> for Board {
    type Output = Tower;

    fn index(&self, square: Square) -> &Self::Output {
        assert!(
            self.contains(square),
            "{} is outside the {}x{} board",
            square,
            self.height,
            self.width
        );
        &self.towers[square.index(self.width)]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.towers.chunks(self.width as usize).enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            for (j, tower) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", tower)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell_width = self
            .towers
            .iter()
            .map(|tower| tower.height().max(1) as usize)
            .max()
            .unwrap_or(1);
        for (i, row) in self.towers.chunks(self.width as usize).enumerate() {
            write!(f, "{:>2} ", i + 1)?;
            for tower in row {
                let tower_string = if tower.is_empty() {
                    ".".to_string()
                } else {
                    tower.to_string()
                };
                write!(f, "|{:^width$}", tower_string, width = cell_width + 2)?;
            }
            writeln!(f, "|")?;
        }
        write!(f, "   ")?;
        for column in 0..self.width {
            write!(f, " {:^width$}", (b'a' + column) as char, width = cell_width + 2)?;
        }
        writeln!(f)
    }
}

impl FromStr for Board {
    type Err = pgn_traits::Error;

    /// Parses boards written row by row, with rows separated by '/' and towers by ','.
    /// Boards that cannot be set up are also reported as parse errors.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let rows: Vec<Vec<Tower>> = input
            .trim()
            .split('/')
            .map(|row| {
                row.split(',')
                    .map(|tower| tower.trim().parse::<Tower>())
                    .collect::<Result<Vec<Tower>, pgn_traits::Error>>()
            })
            .collect::<Result<_, _>>()
            .map_err(|err| {
                pgn_traits::Error::new_caused_by(
                    pgn_traits::ErrorKind::ParseError,
                    format!("Couldn't parse board \"{}\"", input),
                    err,
                )
            })?;

        let width = rows[0].len();
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse board \"{}\": found a row with {} squares, expected {}",
                input,
                row.len(),
                width
            )));
        }

        let invalid_board = |err: Error| {
            pgn_traits::Error::new_caused_by(
                pgn_traits::ErrorKind::ParseError,
                format!("Couldn't set up board \"{}\"", input),
                err,
            )
        };
        if rows.len() > u8::MAX as usize || width > MAX_WIDTH as usize {
            return Err(invalid_board(Error::new(
                ErrorKind::InvalidDimensions,
                format!("{} rows of {} squares is too large", rows.len(), width),
            )));
        }

        let mut board = Board::empty(rows.len() as u8, width as u8).map_err(invalid_board)?;
        for (row_id, row) in rows.into_iter().enumerate() {
            for (column_id, tower) in row.into_iter().enumerate() {
                if !board.set_tower(Square::new(row_id as u8, column_id as u8), tower) {
                    return Err(invalid_board(Error::new(
                        ErrorKind::TowerTooHigh,
                        format!("the board holds more than {} bricks", MAX_TOWER_HEIGHT),
                    )));
                }
            }
        }
        Ok(board)
    }
}
