//! A very simple implementation of the minmax search algorithm.
//! This is not used by the engine, it is just here to check the alpha-beta search against.

use board_game_traits::Position as _;

use crate::game::{GamePosition, Player};

/// Returns the best move and the value of the position, calculating up to `depth` plies deep.
/// Ties are broken in favour of the first move generated.
pub fn minmax<P: GamePosition>(position: &mut P, depth: u16) -> (Option<P::Move>, i32) {
    if depth == 0 {
        return (None, position.static_eval());
    }
    let mut moves = vec![];
    position.generate_moves(&mut moves);
    if moves.is_empty() {
        return (None, position.static_eval());
    }

    let maximising = position.side_to_move().is_maximising();
    let mut best: Option<(P::Move, i32)> = None;
    for mv in moves {
        let reverse_move = position.do_move(mv.clone());
        let (_, value) = minmax(position, depth - 1);
        position.reverse_move(reverse_move);
        let improved = match &best {
            None => true,
            Some((_, best_value)) if maximising => value > *best_value,
            Some((_, best_value)) => value < *best_value,
        };
        if improved {
            best = Some((mv, value));
        }
    }
    match best {
        Some((mv, value)) => (Some(mv), value),
        None => (None, position.static_eval()),
    }
}

/// Counts the leaves of the game tree up to `depth` plies deep.
pub fn perft<P: GamePosition>(position: &mut P, depth: u16) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut moves = vec![];
    position.generate_moves(&mut moves);
    if moves.is_empty() {
        return 1;
    }
    moves
        .into_iter()
        .map(|mv| {
            let reverse_move = position.do_move(mv);
            let count = perft(position, depth - 1);
            position.reverse_move(reverse_move);
            count
        })
        .sum()
}
