use super::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn parse(rows: &[&str]) -> Board {
    let mut text = String::from(BORDER);
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text.push_str(BORDER);
    text.push('\n');
    text.push_str(FOOTER);
    text.parse().expect("test board should parse")
}

#[test]
fn test_initial_board() {
    let board = Board::new();
    assert_eq!(board.moves_played(), 0);
    assert!(!board.is_full());
    for row in 0..ROWS {
        for col in 0..COLS {
            assert_eq!(board.cell(row, col), None);
        }
    }
}

#[test]
fn test_legal_actions() {
    let board = Board::new();
    assert_eq!(board.legal_actions(), (0..COLS as u8).collect::<Vec<_>>());

    // Fill column 2, it should disappear from the legal set
    let mut board = Board::new();
    for i in 0..ROWS {
        let player = if i % 2 == 0 { Player::One } else { Player::Two };
        board.apply(2, player).unwrap();
    }
    assert_eq!(board.legal_actions(), vec![0, 1, 3, 4, 5, 6]);
    assert!(!board.is_legal(2));
    assert!(board.is_legal(3));
}

#[test]
fn test_legal_actions_match_top_cells() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let mut board = Board::new();
    let mut player = Player::One;

    for _ in 0..30 {
        let expected: Vec<Action> = (0..COLS)
            .filter(|&col| board.cell(ROWS - 1, col).is_none())
            .map(|col| col as Action)
            .collect();
        assert_eq!(board.legal_actions(), expected);

        let action = *board.legal_actions().choose(&mut rng).unwrap();
        board.apply(action, player).unwrap();
        player = player.opponent();
    }
}

#[test]
fn test_apply_lands_on_lowest_empty_row() {
    let mut board = Board::from_moves(&[3, 3, 4]).unwrap();
    let before = board.clone();

    let row = board.apply(3, Player::Two).unwrap();
    assert_eq!(row, 2);
    assert_eq!(board.cell(2, 3), Some(Player::Two));
    assert_eq!(board.column_height(3), 3);

    // Everything else in the column and on the board is untouched
    for r in 0..ROWS {
        for c in 0..COLS {
            if (r, c) != (2, 3) {
                assert_eq!(board.cell(r, c), before.cell(r, c));
            }
        }
    }
}

#[test]
fn test_apply_rejects_full_and_out_of_bounds() {
    let mut board = Board::from_moves(&[0, 0, 0, 0, 0, 0]).unwrap();
    let before = board.clone();

    assert_eq!(board.apply(0, Player::One), Err(MoveError::ColumnFull(0)));
    assert_eq!(board.apply(7, Player::One), Err(MoveError::OutOfBounds(7)));
    assert_eq!(board, before);
}

#[test]
fn test_move_status() {
    let board = Board::from_moves(&[6, 6, 6, 6, 6, 6]).unwrap();
    assert_eq!(board.move_status(0), MoveStatus::Valid);
    assert_eq!(board.move_status(6), MoveStatus::FullColumn);
    assert_eq!(board.move_status(7), MoveStatus::OutOfBounds);
    assert_eq!(board.move_status(-1), MoveStatus::OutOfBounds);
    assert_eq!(MoveStatus::FullColumn.to_string(), "Selected column is full.");
}

#[test]
fn test_horizontal_win() {
    // One: 0, 1, 2, 3 on the bottom row, Two stacks on top
    let board = Board::from_moves(&[0, 0, 1, 1, 2, 2, 3]).unwrap();
    assert!(board.is_win(3, Player::One));
    assert!(!board.is_win(3, Player::Two));
    assert_eq!(board.end_state(3, Player::One), GameState::Win);
}

#[test]
fn test_win_found_from_middle_of_line() {
    // Last piece fills the gap in X X _ X
    let board = Board::from_moves(&[0, 0, 1, 1, 3, 3, 2]).unwrap();
    assert!(board.is_win(2, Player::One));
}

#[test]
fn test_vertical_win() {
    let board = Board::from_moves(&[0, 1, 0, 1, 0, 1, 0]).unwrap();
    assert!(board.is_win(0, Player::One));
    // Two has only three in column 1
    assert!(!board.is_win(1, Player::Two));
}

#[test]
fn test_diagonal_win_ascending() {
    let board = parse(&[
        "|              |",
        "|              |",
        "|      X       |",
        "|    X O       |",
        "|  X O O       |",
        "|X O O X       |",
    ]);
    assert!(board.is_win(3, Player::One));
    assert!(board.is_win(0, Player::One));
}

#[test]
fn test_diagonal_win_descending() {
    // One ends on (col 0, row 3), (1, 2), (2, 1), (3, 0)
    let board = Board::from_moves(&[3, 2, 2, 1, 1, 0, 1, 0, 0, 4, 0]).unwrap();
    assert!(board.is_win(0, Player::One));
}

#[test]
fn test_no_win_for_three() {
    let board = Board::from_moves(&[0, 6, 1, 6, 2]).unwrap();
    assert!(!board.is_win(2, Player::One));
    assert_eq!(board.end_state(2, Player::One), GameState::StillPlaying);
}

#[test]
fn test_is_win_requires_players_piece_on_top() {
    let board = Board::from_moves(&[0, 1, 0, 1, 0, 1, 0]).unwrap();
    assert!(!board.is_win(0, Player::Two));
    assert!(!Board::new().is_win(0, Player::One));
}

#[test]
fn test_draw_game() {
    let board = parse(&[
        "|X O X O X O X |",
        "|X O X O X O X |",
        "|O X O X O X O |",
        "|O X O X O X O |",
        "|X O X O X O X |",
        "|X O X O X O X |",
    ]);

    assert!(board.is_full());
    assert!(board.legal_actions().is_empty());
    for col in 0..COLS {
        let top = board.cell(ROWS - 1, col).unwrap();
        assert_eq!(board.end_state(col as Action, top), GameState::Draw);
    }
}

#[test]
fn test_pretty_print() {
    let board = Board::from_moves(&[3, 3, 2]).unwrap();
    let expected = "\
|==============|
|              |
|              |
|              |
|              |
|      O       |
|    X X       |
|==============|
|0 1 2 3 4 5 6 |";
    assert_eq!(board.to_string(), expected);
}

#[test]
fn test_parse_inverts_pretty_print() {
    let board = Board::from_moves(&[3, 3, 4, 2, 2, 5, 6, 0, 3, 3]).unwrap();
    let parsed: Board = board.to_string().parse().unwrap();
    assert_eq!(parsed, board);
    assert_eq!(parsed.legal_actions(), board.legal_actions());
}

#[test]
fn test_parse_errors() {
    let err = "|==============|".parse::<Board>().unwrap_err();
    assert!(matches!(err, ParseBoardError::LineCount { actual: 1, .. }));

    let bad_symbol = Board::new().to_string().replacen("|              |", "|Z             |", 1);
    assert_eq!(
        bad_symbol.parse::<Board>().unwrap_err(),
        ParseBoardError::UnknownSymbol('Z')
    );

    // Piece in the top row of an empty column
    let floating = Board::new().to_string().replacen("|              |", "|X             |", 1);
    assert_eq!(
        floating.parse::<Board>().unwrap_err(),
        ParseBoardError::FloatingPiece(0)
    );

    let narrow = Board::new().to_string().replacen("|              |", "|    |", 1);
    assert!(matches!(
        narrow.parse::<Board>().unwrap_err(),
        ParseBoardError::RowWidth { width: 4, .. }
    ));
}

#[test]
fn test_parse_rejects_text_display_never_writes() {
    let board = Board::from_moves(&[0]).unwrap();
    let printed = board.to_string();
    assert!(printed.contains("|X             |"));

    // A piece in the spacer after column 0 on the bottom row
    let crowded = printed.replacen("|X             |", "|XX            |", 1);
    assert_eq!(
        crowded.parse::<Board>().unwrap_err(),
        ParseBoardError::Malformed {
            line: ROWS,
            reason: "cells must be separated by a space",
        }
    );

    let reversed = printed.replacen(FOOTER, "|6 5 4 3 2 1 0 |", 1);
    assert_eq!(
        reversed.parse::<Board>().unwrap_err(),
        ParseBoardError::Malformed {
            line: ROWS + 2,
            reason: "expected column numbers",
        }
    );

    let no_numbers = printed.replacen(FOOTER, "|              |", 1);
    assert!(matches!(
        no_numbers.parse::<Board>().unwrap_err(),
        ParseBoardError::Malformed { line, .. } if line == ROWS + 2
    ));
}

#[test]
fn test_random_games_invariants() {
    for seed in 0..20 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut board = Board::new();
        let mut player = Player::One;

        loop {
            let legal = board.legal_actions();
            assert!(
                !legal.is_empty(),
                "Unfinished game must have legal moves (seed={})",
                seed
            );

            let action = *legal.choose(&mut rng).unwrap();
            let height = board.column_height(action as usize);
            let row = board.apply(action, player).unwrap();
            assert_eq!(row, height, "Piece should land on top (seed={})", seed);

            match board.end_state(action, player) {
                GameState::Win => {
                    assert!(!board.is_win(action, player.opponent()));
                    break;
                }
                GameState::Draw => {
                    assert!(board.is_full(), "Draw requires a full board (seed={})", seed);
                    break;
                }
                GameState::StillPlaying => {
                    assert!(board.moves_played() < BOARD_SIZE);
                    player = player.opponent();
                }
            }
        }

        assert!(board.moves_played() >= 7, "Fastest win takes 7 moves");
    }
}
