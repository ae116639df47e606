#[cfg(test)]
mod move_gen_tests;
#[cfg(test)]
mod rules_tests;

#[cfg(test)]
use board_game_traits::Position as _;
#[cfg(test)]
use crate::position::{Move, Position};
#[cfg(test)]
use rand::seq::SliceRandom;
#[cfg(test)]
use rand::Rng;

#[cfg(test)]
fn do_moves_and_check_validity(position: &mut Position, move_strings: &[&str]) {
    let mut moves = vec![];
    for move_string in move_strings.iter() {
        let mv: Move = move_string.parse().unwrap();
        position.generate_moves(&mut moves);
        assert!(
            moves.contains(&mv),
            "Move {} was not among legal moves: {:?}\n{:?}",
            mv,
            moves,
            position
        );
        position.do_move(mv);
        moves.clear();
    }
}

#[cfg(test)]
fn legal_move_strings(position: &Position) -> Vec<String> {
    position
        .legal_moves()
        .iter()
        .map(|mv| mv.to_string())
        .collect()
}

/// Plays random moves until the game is over, checking that every move can be taken back.
/// Returns every position of the game, including the start and end positions.
#[cfg(test)]
fn play_random_game<R: Rng>(position: &Position, rng: &mut R) -> Vec<Position> {
    let mut position = position.clone();
    let mut positions = vec![position.clone()];
    let mut moves = vec![];
    loop {
        moves.clear();
        position.generate_moves(&mut moves);
        let Some(mv) = moves.choose(rng).copied() else {
            break;
        };
        let old_position = position.clone();
        let reverse_move = position.do_move(mv);
        assert_ne!(old_position, position, "{} did not change the position", mv);

        let mut restored = position.clone();
        restored.reverse_move(reverse_move);
        assert_eq!(
            restored, old_position,
            "Reversing {} did not restore\n{:?}",
            mv, old_position
        );
        assert_eq!(restored.zobrist_hash(), old_position.zobrist_hash());

        positions.push(position.clone());
        assert!(
            positions.len() <= 2 * position.board().num_squares() + 2,
            "Game went on for too long"
        );
    }
    assert!(position.is_terminal());
    positions
}
