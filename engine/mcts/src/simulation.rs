//! Random playouts used to score freshly expanded nodes.

use games_connect4::{Board, GameState, MoveError, Player};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

/// How a rollout ended, from the starting player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutOutcome {
    Win,
    Loss,
    Draw,
    /// Stopped at the depth limit before the game ended
    Truncated,
}

impl RolloutOutcome {
    /// Result fed into backpropagation: +1, -1 or 0.
    pub fn score(self) -> i8 {
        match self {
            RolloutOutcome::Win => 1,
            RolloutOutcome::Loss => -1,
            RolloutOutcome::Draw | RolloutOutcome::Truncated => 0,
        }
    }
}

/// Result of a single random playout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollout {
    pub outcome: RolloutOutcome,
    /// Non-terminal moves played before the rollout stopped
    pub moves: u32,
}

/// Play uniformly random moves on a copy of `board` until the game ends.
///
/// `starting_player` makes the first move. Only moves that leave the game
/// running count towards `max_depth`; reaching the limit ends the rollout
/// as [`RolloutOutcome::Truncated`].
pub fn rollout(
    board: &Board,
    starting_player: Player,
    max_depth: Option<u32>,
    rng: &mut ChaCha20Rng,
) -> Result<Rollout, MoveError> {
    let mut board = board.clone();
    let mut mover = starting_player;
    let mut moves = 0u32;

    loop {
        if max_depth.is_some_and(|limit| moves >= limit) {
            return Ok(Rollout {
                outcome: RolloutOutcome::Truncated,
                moves,
            });
        }

        let legal = board.legal_actions();
        let Some(&action) = legal.choose(rng) else {
            return Ok(Rollout {
                outcome: RolloutOutcome::Draw,
                moves,
            });
        };
        board.apply(action, mover)?;

        let outcome = match board.end_state(action, mover) {
            GameState::Win if mover == starting_player => RolloutOutcome::Win,
            GameState::Win => RolloutOutcome::Loss,
            GameState::Draw => RolloutOutcome::Draw,
            GameState::StillPlaying => {
                mover = mover.opponent();
                moves += 1;
                continue;
            }
        };
        return Ok(Rollout { outcome, moves });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const FULL_BOARD: &str = "\
|==============|
|X O X O X O X |
|X O X O X O X |
|O X O X O X O |
|O X O X O X O |
|X O X O X O X |
|X O X O X O X |
|==============|
|0 1 2 3 4 5 6 |";

    #[test]
    fn test_scores() {
        assert_eq!(RolloutOutcome::Win.score(), 1);
        assert_eq!(RolloutOutcome::Loss.score(), -1);
        assert_eq!(RolloutOutcome::Draw.score(), 0);
        assert_eq!(RolloutOutcome::Truncated.score(), 0);
    }

    #[test]
    fn test_rollout_result_domain() {
        for seed in 0..50 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let board = Board::from_moves(&[3, 3, 2]).unwrap();

            let r = rollout(&board, Player::Two, None, &mut rng).unwrap();
            assert!([-1, 0, 1].contains(&r.outcome.score()));
            assert_ne!(r.outcome, RolloutOutcome::Truncated);
            // Three pieces are already down
            assert!(r.moves as usize <= games_connect4::BOARD_SIZE - 3);
        }
    }

    #[test]
    fn test_rollout_respects_max_depth() {
        for seed in 0..50 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let r = rollout(&Board::new(), Player::One, Some(5), &mut rng).unwrap();

            assert!(r.moves <= 5, "seed={} moves={}", seed, r.moves);
            if r.outcome == RolloutOutcome::Truncated {
                assert_eq!(r.moves, 5);
            }
        }

        // Fastest possible win needs seven moves, so every rollout is cut short
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let r = rollout(&Board::new(), Player::One, Some(5), &mut rng).unwrap();
        assert_eq!(r.outcome, RolloutOutcome::Truncated);
    }

    #[test]
    fn test_zero_depth_plays_nothing() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let r = rollout(&Board::new(), Player::One, Some(0), &mut rng).unwrap();
        assert_eq!(
            r,
            Rollout {
                outcome: RolloutOutcome::Truncated,
                moves: 0
            }
        );
    }

    #[test]
    fn test_full_board_is_draw() {
        let board: Board = FULL_BOARD.parse().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        let r = rollout(&board, Player::One, None, &mut rng).unwrap();
        assert_eq!(r.outcome, RolloutOutcome::Draw);
        assert_eq!(r.moves, 0);
    }

    #[test]
    fn test_rollout_win_credited_to_mover() {
        // One has three stacked in column 0 and moves first. A game that
        // ends on the first move can only be One's win.
        for seed in 0..20 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let board = Board::from_moves(&[0, 1, 0, 1, 0, 2]).unwrap();
            let r = rollout(&board, Player::One, None, &mut rng).unwrap();
            if r.moves == 0 {
                assert_eq!(r.outcome, RolloutOutcome::Win);
            }
        }
    }

    #[test]
    fn test_rollout_leaves_input_untouched() {
        let board = Board::from_moves(&[3, 4]).unwrap();
        let before = board.clone();
        let mut rng = ChaCha20Rng::seed_from_u64(9);

        rollout(&board, Player::One, None, &mut rng).unwrap();
        assert_eq!(board, before);
    }
}
