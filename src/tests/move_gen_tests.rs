use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;

use board_game_traits::{Color, GameResult, Position as PositionTrait};

use crate::error::ErrorKind;
use crate::game::GamePosition;
use crate::minmax::perft;
use crate::position::{Board, Move, Position, Settings};
use crate::rules::Rules;
use crate::tests::{do_moves_and_check_validity, legal_move_strings, play_random_game};

fn position(s: &str) -> Position {
    Position::from_str(s).unwrap()
}

#[test]
fn start_position_test() {
    let position = Position::from_settings(Settings::new(2, 2)).unwrap();
    assert_eq!(position.to_string(), "1,2/2,1 1 base");
    assert_eq!(position.side_to_move(), Color::White);
    assert_eq!(position.rules(), Rules::Base);
    assert!(!position.skipped());
    assert!(!position.is_terminal());
    assert_eq!(position.game_result(), None);

    let position = Position::from_settings(
        Settings::new(2, 3)
            .rules(Rules::Kings)
            .max_player_starts(false),
    )
    .unwrap();
    assert_eq!(position.to_string(), "1,2,1/2,1,2 2 kings");
    assert_eq!(position.side_to_move(), Color::Black);

    let position = Position::fabricate("oppose", 1, 3, true).unwrap();
    assert_eq!(position.to_string(), "1,2,1 1 oppose");

    assert_eq!(
        Position::start_position().to_string(),
        "1,2,1/2,1,2/1,2,1 1 base"
    );
    let settings = Settings::new(2, 2).rules(Rules::Free).max_player_starts(false);
    assert_eq!(
        Position::start_position_with_settings(&settings),
        Position::from_settings(settings).unwrap()
    );
}

#[test]
fn bad_start_position_test() {
    assert_eq!(
        Position::fabricate("chess", 3, 3, true).unwrap_err().kind(),
        ErrorKind::UnknownRules
    );
    assert_eq!(
        Position::from_settings(Settings::new(0, 3))
            .unwrap_err()
            .kind(),
        ErrorKind::InvalidDimensions
    );
    assert_eq!(
        Position::from_settings(Settings::new(8, 9))
            .unwrap_err()
            .kind(),
        ErrorKind::InvalidDimensions
    );
}

#[test]
fn start_position_move_gen_test() {
    let position = Position::fabricate("base", 3, 3, true).unwrap();
    assert_eq!(
        legal_move_strings(&position),
        vec![
            "a1-a2", "a1-b1", "c1-c2", "c1-b1", "b2-b3", "b2-b1", "b2-c2", "b2-a2", "a3-a2",
            "a3-b3", "c3-c2", "c3-b3"
        ]
    );

    let expected_move_counts = [
        (Rules::Base, 12),
        (Rules::Kings, 20),
        (Rules::Oppose, 12),
        (Rules::Majority, 12),
        (Rules::Free, 24),
    ];
    for (rules, count) in expected_move_counts {
        let position = Position::from_settings(Settings::new(3, 3).rules(rules)).unwrap();
        assert_eq!(position.legal_moves().len(), count, "{} rules", rules);
    }
}

#[test]
fn perft_test() {
    let expected = [
        (Rules::Base, 2, 2, [1, 4, 4, 4, 4]),
        (Rules::Base, 2, 3, [1, 7, 22, 64, 112]),
        (Rules::Base, 3, 3, [1, 12, 88, 648, 2824]),
        (Rules::Kings, 2, 2, [1, 6, 16, 16, 20]),
        (Rules::Kings, 2, 3, [1, 11, 74, 276, 526]),
        (Rules::Kings, 3, 3, [1, 20, 296, 3168, 21424]),
        (Rules::Oppose, 2, 3, [1, 7, 22, 34, 46]),
        (Rules::Oppose, 3, 3, [1, 12, 88, 376, 952]),
        (Rules::Majority, 2, 2, [1, 4, 8, 12, 12]),
        (Rules::Majority, 3, 3, [1, 12, 112, 960, 5536]),
        (Rules::Free, 2, 2, [1, 8, 32, 48, 48]),
        (Rules::Free, 2, 3, [1, 14, 128, 664, 1584]),
    ];
    for (rules, height, width, counts) in expected {
        let mut position =
            Position::from_settings(Settings::new(height, width).rules(rules)).unwrap();
        for (depth, count) in counts.into_iter().enumerate() {
            assert_eq!(
                perft(&mut position, depth as u16),
                count,
                "Wrong perft for depth {} on {}x{} with {} rules",
                depth,
                height,
                width,
                rules
            );
        }
    }
}

#[test]
fn single_square_only_skips_test() {
    for side in ["1", "2"] {
        let mut position = position(&format!("1 {} base", side));
        assert_eq!(legal_move_strings(&position), vec!["skip"]);
        let board = position.board().clone();

        position.do_move(Move::Skip);
        assert_eq!(position.board(), &board, "Skipping changed the board");
        assert!(position.skipped());
        assert!(position.legal_moves().is_empty());
        assert!(position.is_terminal());
        assert_eq!(position.game_result(), Some(GameResult::WhiteWin));
    }
}

#[test]
fn no_allowed_moves_test() {
    for side in ["1", "2"] {
        let mut position = position(&format!("1,x,x/x,x,x/x,x,2 {} base", side));
        assert_eq!(legal_move_strings(&position), vec!["skip"]);
        position.do_move(Move::Skip);
        assert!(position.legal_moves().is_empty());
        assert_eq!(position.game_result(), Some(GameResult::Draw));
    }
}

#[test]
fn diagonal_towers_only_skip_test() {
    for side in ["1", "2"] {
        let position = position(&format!("1,x/x,2 {} base", side));
        assert_eq!(legal_move_strings(&position), vec!["skip"]);
        let position = position_with_rules(&position, Rules::Kings);
        assert_eq!(position.legal_moves().len(), 1);
        assert!(!position.legal_moves()[0].is_skip());
    }
}

fn position_with_rules(position: &Position, rules: Rules) -> Position {
    Position::from_board(position.board().clone(), rules, position.side_to_move())
}

#[test]
fn one_allowed_move_test() {
    let position = position("1,211/x,2 1 base");
    assert_eq!(legal_move_strings(&position), vec!["a1-b1"]);
}

#[test]
fn two_allowed_moves_test() {
    let position = position("1,221/x,1 2 base");
    assert_eq!(legal_move_strings(&position), vec!["b1-b2", "b1-a1"]);
}

#[test]
fn three_allowed_moves_test() {
    let position = position("1,122/x,2 1 base");
    assert_eq!(
        legal_move_strings(&position),
        vec!["a1-b1", "b1-b2", "b1-a1"]
    );

    let position = self::position("1,122,2 1 base");
    assert_eq!(
        legal_move_strings(&position),
        vec!["a1-b1", "b1-c1", "b1-a1"]
    );
}

#[test]
fn considers_skipping_test() {
    let mut position = position("1,122 2 base");
    assert_eq!(legal_move_strings(&position), vec!["skip"]);
    let reverse_move = position.do_move(Move::Skip);
    assert_eq!(position.to_string(), "1,122 1 base skipped");
    assert!(!position.is_terminal());
    assert_eq!(legal_move_strings(&position), vec!["a1-b1", "b1-a1"]);

    // A stack move clears the skip flag
    let mut after_stack = position.clone();
    after_stack.do_move(Move::from_str("b1-a1").unwrap());
    assert!(!after_stack.skipped());
    assert_eq!(after_stack.to_string(), "1221,x 2 base");

    position.reverse_move(reverse_move);
    assert_eq!(position, self::position("1,122 2 base"));
}

#[test]
fn majority_move_gen_test() {
    let position = position("12,2/2,1 1 majority");
    assert_eq!(
        legal_move_strings(&position),
        vec!["a1-a2", "a1-b1", "b2-b1", "b2-a2"]
    );
}

#[test]
fn position_notation_test() {
    for position_string in [
        "1,2/2,1 1 base",
        "x,122,2/1,x,x 2 kings",
        "1,122 1 base skipped",
        "1 2 free skipped",
    ] {
        let position = position(position_string);
        assert_eq!(position.to_string(), position_string);
    }
    let position = self::position("  1,2/2,1   1  majority ");
    assert_eq!(position.to_string(), "1,2/2,1 1 majority");

    for bad_position in [
        "",
        "1,2/2,1",
        "1,2/2,1 1",
        "1,2/2,1 3 base",
        "1,2/2,1 12 base",
        "1,2/2,1 1 chess",
        "1,2/2,1 1 base skip",
        "1,2/2,1 1 base skipped now",
        "1,2/3,1 1 base",
    ] {
        assert!(
            Position::from_str(bad_position).is_err(),
            "{} should not parse",
            bad_position
        );
    }
}

#[test]
fn move_notation_test() {
    assert_eq!(Move::from_str("skip").unwrap(), Move::Skip);
    let mv = Move::from_str("a1-b2").unwrap();
    assert_eq!(mv.to_string(), "a1-b2");
    assert_eq!(mv.origin_square().map(|square| square.to_string()), Some("a1".to_string()));
    assert!(Move::Skip.origin_square().is_none());
    for bad_move in ["", "a1", "a1b2", "a1-", "-b2", "pass"] {
        assert!(Move::from_str(bad_move).is_err(), "{} should not parse", bad_move);
    }
}

#[test]
fn skip_flag_is_part_of_position_test() {
    let position = position("1,122 1 base");
    let skipped = self::position("1,122 1 base skipped");
    assert_ne!(position, skipped);
    assert_ne!(position.zobrist_hash(), skipped.zobrist_hash());

    let other_side = self::position("1,122 2 base");
    assert_ne!(position, other_side);
    assert_ne!(position.zobrist_hash(), other_side.zobrist_hash());
}

#[test]
fn transposition_hash_test() {
    let start = Position::fabricate("base", 2, 4, true).unwrap();

    let mut position_a = start.clone();
    do_moves_and_check_validity(&mut position_a, &["a1-a2", "d1-d2", "c1-b1"]);
    let mut position_b = start.clone();
    do_moves_and_check_validity(&mut position_b, &["c1-b1", "d1-d2", "a1-a2"]);

    assert_eq!(position_a, position_b);
    assert_eq!(position_a.zobrist_hash(), position_b.zobrist_hash());
    assert_eq!(position_a.to_string(), "x,12,x,x/12,1,2,21 2 base");
    assert_eq!(position_a.position_hash(), Some(position_b.zobrist_hash()));
    assert_ne!(position_a.zobrist_hash(), start.zobrist_hash());
}

#[test]
fn move_ordering_test() {
    let mut position = Position::fabricate("base", 3, 3, true).unwrap();
    let mut moves = position.legal_moves();
    position.order_moves(&mut moves);
    let ordered: Vec<String> = moves.iter().map(|mv| mv.to_string()).collect();
    assert_eq!(
        ordered,
        vec![
            "b2-b3", "b2-b1", "b2-c2", "b2-a2", "c3-c2", "c3-b3", "c1-c2", "c1-b1", "a3-a2",
            "a3-b3", "a1-a2", "a1-b1"
        ]
    );

    let mut key = |mv: &str| position.move_ordering_key(Move::from_str(mv).unwrap());
    assert_eq!(key("b2-b3"), key("c3-c2"));
    assert_eq!(key("c1-c2"), key("a3-a2"));
    assert!(key("c3-c2") < key("c1-c2"));
    assert!(key("c1-c2") < key("a1-a2"));

    let mut position = self::position("1,122,2 1 base");
    let mut moves = position.legal_moves();
    position.order_moves(&mut moves);
    assert_eq!(
        moves,
        ["b1-c1", "b1-a1", "a1-b1"].map(|mv| Move::from_str(mv).unwrap())
    );
    assert_eq!(position, self::position("1,122,2 1 base"), "Ordering changed the position");
}

#[test]
fn move_ordering_for_min_player_test() {
    let mut position = position("2,211,1 2 base");
    let mut moves = position.legal_moves();
    assert_eq!(moves.len(), 3);
    position.order_moves(&mut moves);
    assert_eq!(
        moves,
        ["b1-c1", "b1-a1", "a1-b1"].map(|mv| Move::from_str(mv).unwrap())
    );
}

#[test]
fn random_games_reverse_move_test() {
    let mut rng = StdRng::seed_from_u64(42);
    for rules in Rules::ALL {
        for (height, width) in [(1, 5), (2, 3), (3, 3), (3, 4), (4, 4)] {
            for max_player_starts in [true, false] {
                let start = Position::from_settings(
                    Settings::new(height, width)
                        .rules(rules)
                        .max_player_starts(max_player_starts),
                )
                .unwrap();
                for _ in 0..5 {
                    let positions = play_random_game(&start, &mut rng);
                    for position in positions {
                        let reparsed = Position::from_str(&position.to_string()).unwrap();
                        assert_eq!(reparsed, position);
                        assert_eq!(reparsed.zobrist_hash(), position.zobrist_hash());
                        assert_eq!(
                            reparsed.board().total_bricks(),
                            height as usize * width as usize
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn free_rules_move_opponent_towers_test() {
    let position = position("1,2 1 free");
    assert_eq!(legal_move_strings(&position), vec!["a1-b1", "b1-a1"]);
    let board = Board::from_str("1,2").unwrap();
    let position = Position::from_board(board, Rules::Free, Color::Black);
    assert_eq!(position.legal_moves().len(), 2);
}
