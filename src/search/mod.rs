//! Alpha-beta search for San Jego, or any other game implementing [`GamePosition`].
//!
//! The search is a plain depth-limited alpha-beta search without iterative deepening.
//! It optionally sorts moves with the position's own heuristic, and can skip re-searching transpositions.

use std::fmt;

use board_game_traits::Position as _;
use log::{debug, info, trace};
use rand::seq::SliceRandom;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::game::{GamePosition, Player};
use crate::position::{Move, Position};

pub use tt::{Bound, TranspositionTable};

mod tt;

/// Called once at the start of every node visited by the search.
pub trait SearchCallback<P: GamePosition> {
    fn on_node(&mut self, position: &P, depth: u16, alpha: i32, beta: i32, maximising: bool);
}

impl<P: GamePosition> SearchCallback<P> for () {
    fn on_node(&mut self, _: &P, _: u16, _: i32, _: i32, _: bool) {}
}

impl<P: GamePosition, C: SearchCallback<P>> SearchCallback<P> for &mut C {
    fn on_node(&mut self, position: &P, depth: u16, alpha: i32, beta: i32, maximising: bool) {
        (**self).on_node(position, depth, alpha, beta, maximising)
    }
}

/// Counts the number of visited nodes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeCounter {
    pub nodes: u64,
}

impl<P: GamePosition> SearchCallback<P> for NodeCounter {
    fn on_node(&mut self, _: &P, _: u16, _: i32, _: i32, _: bool) {
        self.nodes += 1;
    }
}

/// Logs every visited node at trace level
#[derive(Clone, Copy, Debug, Default)]
pub struct TraceCallback;

impl<P: GamePosition + fmt::Display> SearchCallback<P> for TraceCallback {
    fn on_node(&mut self, position: &P, depth: u16, alpha: i32, beta: i32, maximising: bool) {
        trace!(
            "depth {}, alpha {}, beta {}, {}: {}",
            depth,
            alpha,
            beta,
            if maximising { "max" } else { "min" },
            position
        );
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchSettings {
    max_depth: Option<u16>,
    move_ordering: bool,
    tt_entries: Option<usize>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            max_depth: None,
            move_ordering: true,
            tt_entries: None,
        }
    }
}

impl SearchSettings {
    /// Limits the depth of `solve`. By default, games are always searched to the end.
    pub fn max_depth(mut self, max_depth: u16) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sort moves with the position's heuristic before searching them. On by default
    pub fn move_ordering(mut self, move_ordering: bool) -> Self {
        self.move_ordering = move_ordering;
        self
    }

    /// Use a transposition table with room for `entries` positions. Off by default
    pub fn transposition_table(mut self, entries: usize) -> Self {
        self.tt_entries = if entries == 0 { None } else { Some(entries) };
        self
    }

    pub fn get_max_depth(&self) -> Option<u16> {
        self.max_depth
    }

    pub fn get_move_ordering(&self) -> bool {
        self.move_ordering
    }

    pub fn get_tt_entries(&self) -> Option<usize> {
        self.tt_entries
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchResult<M> {
    /// The value of the position, from player one's perspective
    pub value: i32,
    /// The principal variation, starting with the best move
    pub pv: Vec<M>,
    /// Number of nodes visited, including the root
    pub nodes: u64,
}

impl<M> SearchResult<M> {
    pub fn best_move(&self) -> Option<&M> {
        self.pv.first()
    }
}

impl<M: fmt::Display> fmt::Display for SearchResult<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value {}, {} nodes, pv", self.value, self.nodes)?;
        for mv in self.pv.iter() {
            write!(f, " {}", mv)?;
        }
        Ok(())
    }
}

/// Runs searches with the same settings. The transposition table, if any, is kept between searches.
pub struct Searcher<P: GamePosition> {
    settings: SearchSettings,
    tt: Option<TranspositionTable<P::Move>>,
    nodes: u64,
}

impl<P: GamePosition> Searcher<P>
where
    P::Move: fmt::Display,
{
    pub fn new(settings: SearchSettings) -> Self {
        let tt = settings.tt_entries.map(TranspositionTable::new);
        Searcher {
            settings,
            tt,
            nodes: 0,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Searches `depth` plies deep. The value is the same as a plain minimax search would find.
    pub fn search(&mut self, position: &mut P, depth: u16) -> SearchResult<P::Move> {
        self.search_with_callback(position, depth, &mut ())
    }

    pub fn search_with_callback<C: SearchCallback<P>>(
        &mut self,
        position: &mut P,
        depth: u16,
        callback: &mut C,
    ) -> SearchResult<P::Move> {
        self.nodes = 0;
        let mut pv = vec![];
        let value = self.alpha_beta(position, depth, 0, i32::MIN, i32::MAX, callback, &mut pv);
        SearchResult {
            value,
            pv,
            nodes: self.nodes,
        }
    }

    pub fn best_move(&mut self, position: &mut P, depth: u16) -> Option<P::Move> {
        self.search(position, depth).pv.into_iter().next()
    }

    /// Fail-soft alpha-beta search. Player one is the maximising player.
    /// Writes the principal variation of the node into `pv`.
    #[allow(clippy::too_many_arguments)]
    fn alpha_beta<C: SearchCallback<P>>(
        &mut self,
        position: &mut P,
        depth: u16,
        ply: u16,
        mut alpha: i32,
        mut beta: i32,
        callback: &mut C,
        pv: &mut Vec<P::Move>,
    ) -> i32 {
        let maximising = position.side_to_move().is_maximising();
        callback.on_node(position, depth, alpha, beta, maximising);
        self.nodes += 1;
        pv.clear();

        if depth == 0 {
            return position.static_eval();
        }

        let hash = position.position_hash();
        let mut tt_move = None;
        if let (Some(tt), Some(hash)) = (&self.tt, hash) {
            if let Some(entry) = tt.get(hash) {
                // The root is always searched, to get a full principal variation
                if ply > 0 {
                    if let Some(value) = entry.cutoff_value(depth, alpha, beta) {
                        return value;
                    }
                }
                tt_move = entry.best_move.clone();
            }
        }

        let mut moves = vec![];
        position.generate_moves(&mut moves);
        if moves.is_empty() {
            return position.static_eval();
        }
        if self.settings.move_ordering {
            position.order_moves(&mut moves);
        }
        if let Some(tt_move) = tt_move {
            if let Some(index) = moves.iter().position(|mv| *mv == tt_move) {
                moves[..=index].rotate_right(1);
            }
        }

        let (alpha_orig, beta_orig) = (alpha, beta);
        let mut best_value = if maximising { i32::MIN } else { i32::MAX };
        let mut best_move = None;
        let mut child_pv = vec![];

        for mv in moves {
            let reverse_move = position.do_move(mv.clone());
            let value =
                self.alpha_beta(position, depth - 1, ply + 1, alpha, beta, callback, &mut child_pv);
            position.reverse_move(reverse_move);

            if ply == 0 {
                debug!("{}: {}", mv, value);
            }

            let improved = if maximising {
                value > best_value
            } else {
                value < best_value
            };
            if improved || best_move.is_none() {
                best_value = value;
                pv.clear();
                pv.push(mv.clone());
                pv.append(&mut child_pv);
                best_move = Some(mv);
            }

            if maximising {
                alpha = alpha.max(best_value);
            } else {
                beta = beta.min(best_value);
            }
            if alpha >= beta {
                break;
            }
        }

        if let (Some(tt), Some(hash)) = (&mut self.tt, hash) {
            let bound = if best_value <= alpha_orig {
                Bound::Upper
            } else if best_value >= beta_orig {
                Bound::Lower
            } else {
                Bound::Exact
            };
            tt.insert(hash, depth, best_value, bound, best_move);
        }

        best_value
    }
}

/// Alpha-beta search with the given window, without move ordering or transposition table.
/// The callback is called at the start of every node.
pub fn alpha_beta<P, C>(position: &mut P, depth: u16, alpha: i32, beta: i32, callback: &mut C) -> i32
where
    P: GamePosition,
    P::Move: fmt::Display,
    C: SearchCallback<P>,
{
    let mut searcher: Searcher<P> = Searcher::new(SearchSettings::default().move_ordering(false));
    let mut pv = vec![];
    searcher.alpha_beta(position, depth, 0, alpha, beta, callback, &mut pv)
}

/// The number of plies needed to search any San Jego game on a board of this size to the end.
///
/// Each stack move removes a tower, and each stack move may be followed by at most one skip.
pub fn solve_depth(num_squares: usize) -> u16 {
    (2 * num_squares + 1).min(u16::MAX as usize) as u16
}

/// Finds the value of a position with perfect play, unless limited by the settings' `max_depth`.
pub fn solve(position: &mut Position, settings: SearchSettings) -> SearchResult<Move> {
    solve_with_callback(position, settings, &mut ())
}

pub fn solve_with_callback<C: SearchCallback<Position>>(
    position: &mut Position,
    settings: SearchSettings,
    callback: &mut C,
) -> SearchResult<Move> {
    let mut depth = solve_depth(position.board().num_squares());
    if let Some(max_depth) = settings.max_depth {
        depth = depth.min(max_depth);
    }
    let mut searcher: Searcher<Position> = Searcher::new(settings);
    let result = searcher.search_with_callback(position, depth, callback);
    info!("Solved {} to depth {}: {}", position, depth, result);
    result
}

/// A uniformly random legal move, or `None` if the game is over
pub fn random_move<P: GamePosition, R: Rng + ?Sized>(position: &P, rng: &mut R) -> Option<P::Move> {
    let mut moves = vec![];
    position.generate_moves(&mut moves);
    moves.choose(rng).cloned()
}
