use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use board_game_traits::Color;

use crate::error::{Error, ErrorKind};
use crate::game::Player;

/// The maximum number of bricks in a single tower.
pub const MAX_TOWER_HEIGHT: u8 = 64;

/// Bitmask of the `n` lowest bricks
#[inline]
const fn lower_n_bits(n: u8) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1 << n) - 1
    }
}

/// A stack of bricks, each belonging to one of the players. The topmost brick decides who owns the tower.
///
/// Bricks are stored as a bitboard from the bottom up, with a set bit for every brick of player two.
/// The empty tower, with height 0, marks an empty square.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tower {
    bricks: u64,
    height: u8,
}

impl Tower {
    pub const EMPTY: Tower = Tower {
        bricks: 0,
        height: 0,
    };

    /// A tower with a single brick
    pub const fn new(owner: Color) -> Self {
        let bricks = match owner {
            Color::White => 0,
            Color::Black => 1,
        };
        Tower { bricks, height: 1 }
    }

    /// Builds a tower from its bricks, listed from the top down.
    pub fn from_bricks(top_first: &[Color]) -> Result<Self, Error> {
        if top_first.len() > MAX_TOWER_HEIGHT as usize {
            return Err(Error::new(
                ErrorKind::TowerTooHigh,
                format!(
                    "a tower can hold at most {} bricks, got {}",
                    MAX_TOWER_HEIGHT,
                    top_first.len()
                ),
            ));
        }
        let mut tower = Tower::EMPTY;
        for player in top_first.iter().rev() {
            tower.push(*player);
        }
        Ok(tower)
    }

    pub const fn height(self) -> u8 {
        self.height
    }

    pub const fn is_empty(self) -> bool {
        self.height == 0
    }

    /// The player owning the topmost brick. The empty tower has no owner.
    pub fn owner(self) -> Option<Color> {
        self.get(self.height.checked_sub(1)?)
    }

    /// Get a brick by index. 0 is the bottom of the tower
    pub fn get(self, i: u8) -> Option<Color> {
        if i >= self.height {
            None
        } else if self.bricks & (1 << i) != 0 {
            Some(Color::Black)
        } else {
            Some(Color::White)
        }
    }

    /// Number of bricks belonging to `player`
    pub fn share(self, player: Color) -> u8 {
        let twos = (self.bricks & lower_n_bits(self.height)).count_ones() as u8;
        match player {
            Color::White => self.height - twos,
            Color::Black => twos,
        }
    }

    /// Iterates over the bricks from the top down
    pub fn bricks(self) -> impl Iterator<Item = Color> {
        (0..self.height).rev().filter_map(move |i| self.get(i))
    }

    fn push(&mut self, player: Color) {
        debug_assert!(self.height < MAX_TOWER_HEIGHT);
        if player == Color::Black {
            self.bricks |= 1 << self.height;
        }
        self.height += 1;
    }

    /// Returns the tower that results from moving `self` on top of `lower`.
    pub fn stacked_on(self, lower: Tower) -> Tower {
        debug_assert!(self.height as u16 + lower.height as u16 <= MAX_TOWER_HEIGHT as u16);
        let upper_bits = self.bricks.checked_shl(lower.height as u32).unwrap_or(0);
        Tower {
            bricks: (lower.bricks & lower_n_bits(lower.height)) | upper_bits,
            height: lower.height + self.height,
        }
    }

    /// Splits off the upper `n` bricks, returning `(upper, lower)`.
    /// This is the inverse of `stacked_on`.
    pub fn split_top(self, n: u8) -> (Tower, Tower) {
        debug_assert!(n <= self.height);
        let lower_height = self.height - n;
        let upper = Tower {
            bricks: self.bricks.checked_shr(lower_height as u32).unwrap_or(0) & lower_n_bits(n),
            height: n,
        };
        let lower = Tower {
            bricks: self.bricks & lower_n_bits(lower_height),
            height: lower_height,
        };
        (upper, lower)
    }

    /// A well-mixed 64-bit key for this tower. The empty tower always hashes to 0.
    pub(crate) fn zobrist_key(self, square_index: usize) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let seed = splitmix64(square_index as u64 ^ ((self.height as u64) << 32));
        splitmix64(seed ^ self.bricks)
    }
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl fmt::Display for Tower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "x");
        }
        for brick in self.bricks() {
            write!(f, "{}", brick.player_id())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tower({})", self)
    }
}

impl FromStr for Tower {
    type Err = pgn_traits::Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input == "x" {
            return Ok(Tower::EMPTY);
        }
        if input.is_empty() {
            return Err(pgn_traits::Error::new_parse_error(
                "Empty tower string".to_string(),
            ));
        }
        let bricks = input
            .chars()
            .map(|ch| {
                Color::from_player_id(ch).ok_or_else(|| {
                    pgn_traits::Error::new_parse_error(format!(
                        "Couldn't parse tower \"{}\": expected '1' or '2', found '{}'",
                        input, ch
                    ))
                })
            })
            .collect::<Result<Vec<Color>, pgn_traits::Error>>()?;
        Tower::from_bricks(&bricks).map_err(|err| {
            pgn_traits::Error::new_caused_by(
                pgn_traits::ErrorKind::ParseError,
                format!("Couldn't parse tower \"{}\"", input),
                err,
            )
        })
    }
}
