//! Move selection policies for the game runner

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use games_connect4::{Action, Board, MoveStatus, Player};
use mcts::{SavedState, SearchStats};
use rand::prelude::*;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

/// Trait for anything that can pick a move on a board.
///
/// `saved_state` is the tree kept from this player's previous turn, already
/// advanced past the opponent's reply. Policies that keep no state hand it
/// back unchanged.
pub trait Policy {
    fn generate_move(
        &mut self,
        board: &Board,
        player: Player,
        saved_state: Option<SavedState>,
    ) -> Result<(Action, Option<SavedState>)>;

    /// Search statistics from the most recent move, if the policy searches.
    fn take_stats(&mut self) -> Option<SearchStats> {
        None
    }
}

/// Random policy that picks a non-full column uniformly at random.
#[derive(Debug)]
pub struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RandomPolicy {
    fn generate_move(
        &mut self,
        board: &Board,
        _player: Player,
        saved_state: Option<SavedState>,
    ) -> Result<(Action, Option<SavedState>)> {
        let action = board
            .legal_actions()
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| anyhow!("No legal moves available"))?;
        Ok((action, saved_state))
    }
}

/// Line-oriented input for interactive players.
///
/// `io::Stdin` locks per call, so several players can share the terminal.
pub trait ReadLine {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl ReadLine for io::Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        io::Stdin::read_line(self, buf)
    }
}

impl<T: AsRef<[u8]>> ReadLine for io::Cursor<T> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// Why a line typed by a human was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Invalid move: Input must be an integer.")]
    NotAnInteger,

    #[error("Move is invalid: {0}")]
    Invalid(MoveStatus),
}

/// Parse a typed column number and check it against the board.
pub fn parse_move(board: &Board, line: &str) -> Result<Action, InputError> {
    let column: i64 = line.trim().parse().map_err(|_| InputError::NotAnInteger)?;
    match board.move_status(column) {
        MoveStatus::Valid => Action::try_from(column).map_err(|_| InputError::NotAnInteger),
        status => Err(InputError::Invalid(status)),
    }
}

/// Policy that asks a person for a column until a valid one is entered.
pub struct HumanPolicy<R, W> {
    input: R,
    output: W,
}

impl HumanPolicy<io::Stdin, io::Stdout> {
    /// Read from the terminal.
    pub fn stdin() -> Self {
        Self::new(io::stdin(), io::stdout())
    }
}

impl<R: ReadLine, W: Write> HumanPolicy<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: ReadLine, W: Write> Policy for HumanPolicy<R, W> {
    fn generate_move(
        &mut self,
        board: &Board,
        _player: Player,
        saved_state: Option<SavedState>,
    ) -> Result<(Action, Option<SavedState>)> {
        loop {
            write!(self.output, "Column? ")?;
            self.output.flush()?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("Failed to read move")?;
            if read == 0 {
                bail!("Input closed before a move was entered");
            }

            match parse_move(board, &line) {
                Ok(action) => return Ok((action, saved_state)),
                Err(err) => {
                    writeln!(self.output, "{}", err)?;
                    writeln!(self.output, "Try again.")?;
                }
            }
        }
    }
}
