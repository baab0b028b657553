//! Game runner: plays matches between two policies on one board

use std::io::Write;
use std::time::Instant;

use anyhow::{Context, Result};
use games_connect4::{Action, Board, GameState, MoveStatus, Player};
use mcts::{SavedState, SearchStats};
use tracing::{debug, info, warn};

use crate::policy::Policy;

/// Aggregated MCTS stats for one game.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EpisodeStats {
    /// Number of MCTS searches performed
    pub search_count: u32,
    /// Iterations run across all searches (excludes reused visits)
    pub iterations: u64,
    /// Total time spent in tree selection (microseconds)
    pub selection_time_us: u64,
    /// Total time spent expanding nodes (microseconds)
    pub expansion_time_us: u64,
    /// Total time spent in random rollouts (microseconds)
    pub rollout_time_us: u64,
    /// Total time spent in backpropagation (microseconds)
    pub backprop_time_us: u64,
    /// Total terminal nodes hit
    pub terminal_hits: u32,
    /// Rollouts cut off by the depth limit
    pub truncated_rollouts: u32,
    /// Moves played inside rollouts
    pub rollout_moves: u64,
    /// Searches that returned an immediate win
    pub forced_wins: u32,
}

impl EpisodeStats {
    /// Add stats from a single MCTS search.
    pub fn add(&mut self, stats: &SearchStats) {
        self.search_count += 1;
        self.iterations += u64::from(stats.iterations);
        self.selection_time_us += stats.select_us;
        self.expansion_time_us += stats.expand_us;
        self.rollout_time_us += stats.simulate_us;
        self.backprop_time_us += stats.backprop_us;
        self.terminal_hits += stats.terminal_hits;
        self.truncated_rollouts += stats.truncated_rollouts;
        self.rollout_moves += stats.rollout_moves;
        self.forced_wins += u32::from(stats.forced_win);
    }

    fn total_time_us(&self) -> u64 {
        self.selection_time_us
            + self.expansion_time_us
            + self.rollout_time_us
            + self.backprop_time_us
    }

    /// Log a summary of the game's search stats.
    pub fn log_summary(&self, game_num: u32) {
        let total_time_us = self.total_time_us();
        if self.search_count == 0 || total_time_us == 0 {
            return;
        }

        let pct = |part: u64| format!("{:.1}%", part as f64 / total_time_us as f64 * 100.0);
        let avg_rollout = if self.iterations > 0 {
            self.rollout_moves as f64 / self.iterations as f64
        } else {
            0.0
        };

        info!(
            game = game_num,
            searches = self.search_count,
            iterations = self.iterations,
            total_ms = %format!("{:.1}", total_time_us as f64 / 1000.0),
            selection_pct = %pct(self.selection_time_us),
            expansion_pct = %pct(self.expansion_time_us),
            rollout_pct = %pct(self.rollout_time_us),
            backprop_pct = %pct(self.backprop_time_us),
            avg_rollout_moves = %format!("{:.1}", avg_rollout),
            terminal_hits = self.terminal_hits,
            truncated = self.truncated_rollouts,
            forced_wins = self.forced_wins,
            "MCTS game stats"
        );
    }
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Win(Player),
    Draw,
    /// `player` chose a column that could not be played and lost
    IllegalMove {
        player: Player,
        action: Action,
        status: MoveStatus,
    },
}

impl GameOutcome {
    pub fn winner(self) -> Option<Player> {
        match self {
            GameOutcome::Win(player) => Some(player),
            GameOutcome::Draw => None,
            GameOutcome::IllegalMove { player, .. } => Some(player.opponent()),
        }
    }
}

/// Everything worth keeping about a finished game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub outcome: GameOutcome,
    /// Legal moves in the order they were played
    pub moves: Vec<Action>,
    pub final_board: Board,
    /// Names seated as `Player::One` and `Player::Two`
    pub players: [String; 2],
    pub stats: EpisodeStats,
}

impl GameRecord {
    pub fn name_of(&self, player: Player) -> &str {
        &self.players[seat(player)]
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.outcome.winner().map(|player| self.name_of(player))
    }
}

/// A named policy taking part in a match.
pub struct Contestant {
    pub name: String,
    pub policy: Box<dyn Policy>,
}

impl Contestant {
    pub fn new(name: impl Into<String>, policy: impl Policy + 'static) -> Self {
        Self {
            name: name.into(),
            policy: Box::new(policy),
        }
    }
}

/// Trees each player keeps between their own turns.
#[derive(Default)]
pub struct SavedStates {
    one: Option<SavedState>,
    two: Option<SavedState>,
}

impl SavedStates {
    fn slot(&mut self, player: Player) -> &mut Option<SavedState> {
        match player {
            Player::One => &mut self.one,
            Player::Two => &mut self.two,
        }
    }

    /// Take `player`'s tree, descended by the opponent's last move.
    ///
    /// A reply the tree never explored drops it.
    pub fn take_advanced(
        &mut self,
        player: Player,
        last_action: Option<Action>,
    ) -> Option<SavedState> {
        let tree = self.slot(player).take()?;
        let Some(action) = last_action else {
            return Some(tree);
        };

        let advanced = tree.advance(action);
        if advanced.is_none() {
            debug!(
                player = %player,
                action,
                "Opponent move not in saved tree, dropping it"
            );
        }
        advanced
    }

    pub fn store(&mut self, player: Player, state: Option<SavedState>) {
        *self.slot(player) = state;
    }
}

fn seat(player: Player) -> usize {
    match player {
        Player::One => 0,
        Player::Two => 1,
    }
}

/// Drives games and prints the board to `out` before every move.
pub struct GameRunner<W> {
    out: W,
}

impl<W: Write> GameRunner<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Play `games` games, swapping who moves first after each one.
    pub fn play_match(
        &mut self,
        contestants: &mut [Contestant; 2],
        games: u32,
    ) -> Result<Vec<GameRecord>> {
        let mut records = Vec::with_capacity(games as usize);
        let [first, second] = contestants;

        for game in 0..games {
            let record = if game % 2 == 0 {
                self.play_game(first, second)?
            } else {
                self.play_game(second, first)?
            };

            info!(
                game = game + 1,
                outcome = ?record.outcome,
                winner = record.winner_name().unwrap_or("none"),
                moves = record.moves.len(),
                "Game finished"
            );
            debug!(final_board = %record.final_board, "Final position");
            record.stats.log_summary(game + 1);
            records.push(record);
        }

        Ok(records)
    }

    /// Play one game; `one` moves first.
    pub fn play_game(
        &mut self,
        one: &mut Contestant,
        two: &mut Contestant,
    ) -> Result<GameRecord> {
        let mut board = Board::new();
        let mut saved = SavedStates::default();
        let mut moves = Vec::new();
        let mut stats = EpisodeStats::default();
        let mut last_action = None;
        let mut player = Player::One;

        let outcome = loop {
            let contestant = match player {
                Player::One => &mut *one,
                Player::Two => &mut *two,
            };
            let start = Instant::now();

            writeln!(self.out, "{}", board)?;
            writeln!(
                self.out,
                "{} you are playing with {}",
                contestant.name,
                player.symbol()
            )?;

            let state = saved.take_advanced(player, last_action);
            let (action, state) = contestant
                .policy
                .generate_move(&board, player, state)
                .with_context(|| format!("{} failed to choose a move", contestant.name))?;
            saved.store(player, state);
            if let Some(search) = contestant.policy.take_stats() {
                stats.add(&search);
            }

            let elapsed = start.elapsed();
            writeln!(self.out, "Move time: {:.3}s", elapsed.as_secs_f64())?;
            debug!(
                player = %player,
                name = %contestant.name,
                action,
                elapsed_ms = elapsed.as_millis() as u64,
                "Move chosen"
            );

            let status = board.move_status(i64::from(action));
            if !status.is_valid() {
                writeln!(self.out, "Move {} is invalid: {}", action, status)?;
                writeln!(
                    self.out,
                    "{} lost by making an illegal move.",
                    contestant.name
                )?;
                warn!(name = %contestant.name, action, %status, "Illegal move");
                break GameOutcome::IllegalMove {
                    player,
                    action,
                    status,
                };
            }

            board.apply(action, player)?;
            moves.push(action);
            last_action = Some(action);

            match board.end_state(action, player) {
                GameState::Win => {
                    writeln!(self.out, "{}", board)?;
                    writeln!(
                        self.out,
                        "{} won playing {}",
                        contestant.name,
                        player.symbol()
                    )?;
                    break GameOutcome::Win(player);
                }
                GameState::Draw => {
                    writeln!(self.out, "{}", board)?;
                    writeln!(self.out, "Game ended in draw")?;
                    break GameOutcome::Draw;
                }
                GameState::StillPlaying => player = player.opponent(),
            }
        };

        Ok(GameRecord {
            outcome,
            moves,
            final_board: board,
            players: [one.name.clone(), two.name.clone()],
            stats,
        })
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
