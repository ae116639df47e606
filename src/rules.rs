//! The rule variants of San Jego.
//!
//! Every variant is a zero-sized type implementing [`RuleSet`], so that move generation can be monomorphized per variant.
//! [`Rules`] picks a variant at runtime, for example from its name on the command line.

use std::fmt;
use std::str::FromStr;

use board_game_traits::Color;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};
use crate::position::{Board, Neighbourhood, Square, Tower};

/// Decides which moves are legal. Rulesets never modify the board.
pub trait RuleSet {
    const NAME: &'static str;

    /// The squares a tower may be moved to
    const NEIGHBOURHOOD: Neighbourhood;

    /// Whether `player` may move `tower` at all, regardless of where it is
    fn may_move_tower(player: Color, tower: Tower) -> bool;

    /// Whether `upper` may be moved on top of `lower`
    fn allows_target(_player: Color, _upper: Tower, _lower: Tower) -> bool {
        true
    }

    fn allows_move(board: &Board, player: Color, from: Square, to: Square) -> bool {
        if !Self::NEIGHBOURHOOD.contains(from, to) {
            return false;
        }
        let (upper, lower) = match (board.tower(from), board.tower(to)) {
            (Some(upper), Some(lower)) if !upper.is_empty() && !lower.is_empty() => {
                (upper, lower)
            }
            _ => return false,
        };
        Self::may_move_tower(player, upper) && Self::allows_target(player, upper, lower)
    }
}

/// Players move their own towers onto any orthogonally adjacent tower.
pub struct BaseRules;

impl RuleSet for BaseRules {
    const NAME: &'static str = "base";
    const NEIGHBOURHOOD: Neighbourhood = Neighbourhood::Quad;

    fn may_move_tower(player: Color, tower: Tower) -> bool {
        tower.owner() == Some(player)
    }
}

/// Like the base rules, but towers also move diagonally.
pub struct KingsRules;

impl RuleSet for KingsRules {
    const NAME: &'static str = "kings";
    const NEIGHBOURHOOD: Neighbourhood = Neighbourhood::Kings;

    fn may_move_tower(player: Color, tower: Tower) -> bool {
        tower.owner() == Some(player)
    }
}

/// Like the base rules, but towers may only be moved onto opposing towers.
pub struct OpposeRules;

impl RuleSet for OpposeRules {
    const NAME: &'static str = "oppose";
    const NEIGHBOURHOOD: Neighbourhood = Neighbourhood::Quad;

    fn may_move_tower(player: Color, tower: Tower) -> bool {
        tower.owner() == Some(player)
    }

    fn allows_target(_player: Color, upper: Tower, lower: Tower) -> bool {
        upper.owner() != lower.owner()
    }
}

/// A player may move any tower in which they own at least half of the bricks, even if they are not the owner.
pub struct MajorityRules;

impl RuleSet for MajorityRules {
    const NAME: &'static str = "majority";
    const NEIGHBOURHOOD: Neighbourhood = Neighbourhood::Quad;

    fn may_move_tower(player: Color, tower: Tower) -> bool {
        !tower.is_empty() && tower.share(player) >= tower.share(!player)
    }
}

/// Both players may move any tower.
pub struct FreeRules;

impl RuleSet for FreeRules {
    const NAME: &'static str = "free";
    const NEIGHBOURHOOD: Neighbourhood = Neighbourhood::Quad;

    fn may_move_tower(_player: Color, tower: Tower) -> bool {
        !tower.is_empty()
    }
}

/// Runtime selection of a ruleset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Rules {
    #[default]
    Base,
    Kings,
    Oppose,
    Majority,
    Free,
}

impl Rules {
    pub const ALL: [Rules; 5] = [
        Rules::Base,
        Rules::Kings,
        Rules::Oppose,
        Rules::Majority,
        Rules::Free,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rules::Base => BaseRules::NAME,
            Rules::Kings => KingsRules::NAME,
            Rules::Oppose => OpposeRules::NAME,
            Rules::Majority => MajorityRules::NAME,
            Rules::Free => FreeRules::NAME,
        }
    }

    pub fn neighbourhood(self) -> Neighbourhood {
        match self {
            Rules::Base => BaseRules::NEIGHBOURHOOD,
            Rules::Kings => KingsRules::NEIGHBOURHOOD,
            Rules::Oppose => OpposeRules::NEIGHBOURHOOD,
            Rules::Majority => MajorityRules::NEIGHBOURHOOD,
            Rules::Free => FreeRules::NEIGHBOURHOOD,
        }
    }

    pub fn may_move_tower(self, player: Color, tower: Tower) -> bool {
        match self {
            Rules::Base => BaseRules::may_move_tower(player, tower),
            Rules::Kings => KingsRules::may_move_tower(player, tower),
            Rules::Oppose => OpposeRules::may_move_tower(player, tower),
            Rules::Majority => MajorityRules::may_move_tower(player, tower),
            Rules::Free => FreeRules::may_move_tower(player, tower),
        }
    }

    pub fn allows_move(self, board: &Board, player: Color, from: Square, to: Square) -> bool {
        match self {
            Rules::Base => BaseRules::allows_move(board, player, from, to),
            Rules::Kings => KingsRules::allows_move(board, player, from, to),
            Rules::Oppose => OpposeRules::allows_move(board, player, from, to),
            Rules::Majority => MajorityRules::allows_move(board, player, from, to),
            Rules::Free => FreeRules::allows_move(board, player, from, to),
        }
    }
}

impl fmt::Display for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Rules {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Rules::ALL
            .iter()
            .copied()
            .find(|rules| rules.name() == input)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::UnknownRules,
                    format!(
                        "given rule set {} not recognised, expected one of {}",
                        input,
                        Rules::ALL.map(Rules::name).join(", ")
                    ),
                )
            })
    }
}
