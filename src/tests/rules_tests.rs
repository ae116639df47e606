use std::str::FromStr;

use board_game_traits::Color;

use crate::error::ErrorKind;
use crate::position::{Board, Neighbourhood, Square, Tower};
use crate::rules::Rules;

fn tower(s: &str) -> Tower {
    Tower::from_str(s).unwrap()
}

#[test]
fn rules_names_test() {
    for rules in Rules::ALL {
        assert_eq!(Rules::from_str(rules.name()).unwrap(), rules);
        assert_eq!(rules.to_string(), rules.name());
    }
    assert_eq!(Rules::default(), Rules::Base);
    assert_eq!(Rules::from_str("kings").unwrap(), Rules::Kings);

    let err = Rules::from_str("chess").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownRules);
    assert!(err.to_string().contains("majority"));
}

#[test]
fn neighbourhoods_test() {
    for rules in Rules::ALL {
        let expected = if rules == Rules::Kings {
            Neighbourhood::Kings
        } else {
            Neighbourhood::Quad
        };
        assert_eq!(rules.neighbourhood(), expected);
    }
}

#[test]
fn basic_move_allowed_test() {
    let board = Board::new(1, 2).unwrap();
    for rules in Rules::ALL {
        assert!(
            rules.allows_move(&board, Color::White, Square::new(0, 0), Square::new(0, 1)),
            "{} rules should allow a1-b1",
            rules
        );
    }
}

#[test]
fn no_moves_outside_board_test() {
    let board = Board::new(5, 4).unwrap();
    let inside = Square::new(0, 0);
    let outside = [Square::new(5, 0), Square::new(0, 4), Square::new(5, 4)];
    for rules in Rules::ALL {
        for player in [Color::White, Color::Black] {
            for square in outside {
                assert!(!rules.allows_move(&board, player, inside, square));
                assert!(!rules.allows_move(&board, player, square, inside));
                for other in outside {
                    assert!(!rules.allows_move(&board, player, square, other));
                }
            }
        }
    }
}

#[test]
fn no_moves_without_towers_test() {
    let board = Board::from_str("x,1,x/x,x,x/x,x,x").unwrap();
    let squares = [Square::new(1, 1), Square::new(1, 2), Square::new(0, 1)];
    for rules in Rules::ALL {
        for from in squares {
            for to in squares {
                assert!(
                    !rules.allows_move(&board, Color::White, from, to),
                    "{} rules allowed {}-{}",
                    rules,
                    from,
                    to
                );
            }
        }
    }
}

#[test]
fn no_diagonal_moves_test() {
    let board = Board::from_str("2,2,2/2,1,2/2,2,2").unwrap();
    let centre = Square::new(1, 1);
    let corners = [
        Square::new(0, 0),
        Square::new(0, 2),
        Square::new(2, 0),
        Square::new(2, 2),
    ];
    for rules in Rules::ALL {
        for corner in corners {
            assert_eq!(
                rules.allows_move(&board, Color::White, centre, corner),
                rules == Rules::Kings,
                "Wrong diagonal move rule for {}",
                rules
            );
        }
    }
}

#[test]
fn no_moving_opposing_towers_test() {
    let board = Board::from_str("1,2").unwrap();
    let (a1, b1) = (Square::new(0, 0), Square::new(0, 1));
    for rules in Rules::ALL {
        let free = rules == Rules::Free;
        assert_eq!(rules.allows_move(&board, Color::Black, a1, b1), free);
        assert_eq!(rules.allows_move(&board, Color::White, b1, a1), free);
        assert!(rules.allows_move(&board, Color::White, a1, b1));
        assert!(rules.allows_move(&board, Color::Black, b1, a1));
    }
}

#[test]
fn majority_with_half_share_test() {
    let (a1, b1) = (Square::new(0, 0), Square::new(0, 1));
    for structure in ["1122", "1212", "1221", "2112", "2121", "2211"] {
        let mut board = Board::new(1, 2).unwrap();
        assert!(board.set_tower(a1, tower(structure)));
        assert!(board.set_tower(b1, tower("2")));
        for player in [Color::White, Color::Black] {
            assert!(
                Rules::Majority.allows_move(&board, player, a1, b1),
                "{} should be able to move {}",
                player,
                structure
            );
        }
    }
}

#[test]
fn majority_without_ownership_test() {
    let (a1, b1) = (Square::new(0, 0), Square::new(0, 1));
    for structure in ["112", "121", "211"] {
        let board = Board::from_towers([(a1, tower(structure)), (b1, tower("2"))]).unwrap();
        assert!(Rules::Majority.allows_move(&board, Color::White, a1, b1));
        assert!(!Rules::Majority.allows_move(&board, Color::Black, a1, b1));
    }

    // Owning the top brick is not enough
    let centre = Square::new(1, 1);
    for to in Square::new(1, 1).neighbours(Neighbourhood::Kings, 3, 3) {
        let board = Board::from_towers([(centre, tower("122")), (to, tower("2"))]).unwrap();
        assert!(!Rules::Majority.allows_move(&board, Color::White, centre, to));
    }
}

#[test]
fn oppose_only_onto_opponent_test() {
    let board = Board::from_str("1,1,2").unwrap();
    let (a1, b1, c1) = (Square::new(0, 0), Square::new(0, 1), Square::new(0, 2));
    assert!(!Rules::Oppose.allows_move(&board, Color::White, a1, b1));
    assert!(!Rules::Oppose.allows_move(&board, Color::White, b1, a1));
    assert!(Rules::Oppose.allows_move(&board, Color::White, b1, c1));
    assert!(Rules::Oppose.allows_move(&board, Color::Black, c1, b1));
    assert!(Rules::Base.allows_move(&board, Color::White, a1, b1));
}

#[test]
fn no_moving_too_far_test() {
    let from = Square::new(2, 2);
    for row in [0, 2, 4] {
        for column in [0, 2, 4, 5, 6] {
            let to = Square::new(row, column);
            if to == from {
                continue;
            }
            let mut board = Board::empty(5, 7).unwrap();
            board.set_tower(from, tower("1"));
            board.set_tower(to, tower("2"));
            for rules in Rules::ALL {
                for player in [Color::White, Color::Black] {
                    assert!(
                        !rules.allows_move(&board, player, from, to),
                        "{} rules allowed {}-{}",
                        rules,
                        from,
                        to
                    );
                }
            }
        }
    }
}

#[test]
fn may_move_tower_test() {
    let mixed = tower("1122");
    assert!(Rules::Base.may_move_tower(Color::White, mixed));
    assert!(!Rules::Base.may_move_tower(Color::Black, mixed));
    assert!(Rules::Majority.may_move_tower(Color::Black, mixed));
    assert!(Rules::Free.may_move_tower(Color::Black, mixed));
    for rules in Rules::ALL {
        for player in [Color::White, Color::Black] {
            assert!(!rules.may_move_tower(player, Tower::EMPTY));
        }
    }
}
