//! Connect Four board engine.
//!
//! Connect Four is a two-player connection game where players drop pieces
//! into a 7-column, 6-row vertically suspended grid. The first player to form
//! a horizontal, vertical, or diagonal line of four pieces wins.
//!
//! # Board Layout
//!
//! The board is stored in row-major order, with row 0 at the bottom:
//! ```text
//! Row 5: [35][36][37][38][39][40][41]  <- Top
//! Row 4: [28][29][30][31][32][33][34]
//! Row 3: [21][22][23][24][25][26][27]
//! Row 2: [14][15][16][17][18][19][20]
//! Row 1: [ 7][ 8][ 9][10][11][12][13]
//! Row 0: [ 0][ 1][ 2][ 3][ 4][ 5][ 6]  <- Bottom
//!         Col 0  1  2  3  4  5  6
//! ```
//!
//! # Usage
//!
//! ```rust
//! use games_connect4::{Board, GameState, Player};
//!
//! let mut board = Board::new();
//! let row = board.apply(3, Player::One).unwrap();
//! assert_eq!(row, 0);
//! assert_eq!(board.end_state(3, Player::One), GameState::StillPlaying);
//! println!("{board}");
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Board dimensions
pub const COLS: usize = 7;
pub const ROWS: usize = 6;
pub const BOARD_SIZE: usize = COLS * ROWS; // 42

/// Pieces in a row needed to win
const CONNECT: usize = 4;

const EMPTY: u8 = 0;
const BORDER: &str = "|==============|";
const FOOTER: &str = "|0 1 2 3 4 5 6 |";

/// Column index a piece is dropped into (0-6).
pub type Action = u8;

/// One of the two players. `One` moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Symbol used when printing the board.
    pub fn symbol(self) -> char {
        match self {
            Player::One => 'X',
            Player::Two => 'O',
        }
    }

    fn from_symbol(symbol: char) -> Result<Option<Self>, ParseBoardError> {
        match symbol {
            ' ' => Ok(None),
            'X' => Ok(Some(Player::One)),
            'O' => Ok(Some(Player::Two)),
            other => Err(ParseBoardError::UnknownSymbol(other)),
        }
    }

    #[inline]
    fn cell(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    #[inline]
    fn from_cell(cell: u8) -> Option<Self> {
        match cell {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Game state after a move, from the point of view of the player who made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Win,
    Draw,
    StillPlaying,
}

/// Whether a requested column can be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    Valid,
    OutOfBounds,
    FullColumn,
}

impl MoveStatus {
    pub fn is_valid(self) -> bool {
        self == MoveStatus::Valid
    }

    /// Human readable explanation, shown to players who enter a bad move.
    pub fn message(self) -> &'static str {
        match self {
            MoveStatus::Valid => "Move is valid.",
            MoveStatus::OutOfBounds => "Input is out of bounds.",
            MoveStatus::FullColumn => "Selected column is full.",
        }
    }
}

impl fmt::Display for MoveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Errors from applying a move.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("Column {0} is out of bounds")]
    OutOfBounds(Action),

    #[error("Column {0} is full")]
    ColumnFull(Action),
}

/// Errors from parsing a printed board.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseBoardError {
    #[error("Expected {expected} lines, found {actual}")]
    LineCount { expected: usize, actual: usize },

    #[error("Malformed line {line}: {reason}")]
    Malformed { line: usize, reason: &'static str },

    #[error("Row {row} has width {width}, expected {}", COLS * 2)]
    RowWidth { row: usize, width: usize },

    #[error("Unknown cell symbol {0:?}")]
    UnknownSymbol(char),

    #[error("Piece floating above an empty cell in column {0}")]
    FloatingPiece(usize),
}

/// Connect Four board
///
/// Cells hold 0 (empty), 1 (player one) or 2 (player two). Column heights
/// are tracked alongside so drops and legality checks don't scan the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [u8; BOARD_SIZE],
    column_heights: [u8; COLS],
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self {
            cells: [EMPTY; BOARD_SIZE],
            column_heights: [0; COLS],
        }
    }

    /// Build a board by playing `moves` in order, starting with player one.
    pub fn from_moves(moves: &[Action]) -> Result<Self, MoveError> {
        let mut board = Self::new();
        let mut player = Player::One;
        for &action in moves {
            board.apply(action, player)?;
            player = player.opponent();
        }
        Ok(board)
    }

    /// Convert column and row to board index
    #[inline]
    fn pos(col: usize, row: usize) -> usize {
        row * COLS + col
    }

    /// Piece at the given cell, `None` if empty or out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<Player> {
        if row >= ROWS || col >= COLS {
            return None;
        }
        Player::from_cell(self.cells[Self::pos(col, row)])
    }

    /// Number of pieces in a column.
    pub fn column_height(&self, col: usize) -> usize {
        self.column_heights.get(col).map_or(0, |&h| h as usize)
    }

    /// Lowest empty row of a column, `None` when the column is full.
    pub fn lowest_empty_row(&self, col: usize) -> Option<usize> {
        let height = self.column_height(col);
        (col < COLS && height < ROWS).then_some(height)
    }

    /// Total pieces on the board.
    pub fn moves_played(&self) -> usize {
        self.column_heights.iter().map(|&h| h as usize).sum()
    }

    /// Legal actions (columns that are not full), in ascending order.
    pub fn legal_actions(&self) -> Vec<Action> {
        (0..COLS as u8)
            .filter(|&col| self.column_heights[col as usize] < ROWS as u8)
            .collect()
    }

    /// Check if a piece can be dropped into `action`.
    #[inline]
    pub fn is_legal(&self, action: Action) -> bool {
        (action as usize) < COLS && self.column_heights[action as usize] < ROWS as u8
    }

    /// Classify an arbitrary column request, e.g. one typed in by a user.
    pub fn move_status(&self, column: i64) -> MoveStatus {
        if column < 0 || column >= COLS as i64 {
            MoveStatus::OutOfBounds
        } else if self.column_heights[column as usize] >= ROWS as u8 {
            MoveStatus::FullColumn
        } else {
            MoveStatus::Valid
        }
    }

    /// Drop a piece for `player` into the lowest empty row of `action`.
    ///
    /// Returns the row the piece landed in.
    pub fn apply(&mut self, action: Action, player: Player) -> Result<usize, MoveError> {
        let col = action as usize;
        if col >= COLS {
            return Err(MoveError::OutOfBounds(action));
        }
        let row = self.column_heights[col] as usize;
        if row >= ROWS {
            return Err(MoveError::ColumnFull(action));
        }

        self.cells[Self::pos(col, row)] = player.cell();
        self.column_heights[col] += 1;
        Ok(row)
    }

    /// Check if the top piece of column `last_action` belongs to `player` and
    /// is part of a line of four.
    pub fn is_win(&self, last_action: Action, player: Player) -> bool {
        let col = last_action as usize;
        if col >= COLS || self.column_heights[col] == 0 {
            return false;
        }
        let row = self.column_heights[col] as usize - 1;
        let piece = player.cell();
        if self.cells[Self::pos(col, row)] != piece {
            return false;
        }

        // Direction vectors: horizontal, vertical, diagonal /, diagonal \
        let directions: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

        directions.iter().any(|&(dc, dr)| {
            let forward = self.run_length(col, row, dc, dr, piece);
            let backward = self.run_length(col, row, -dc, -dr, piece);
            1 + forward + backward >= CONNECT
        })
    }

    /// Count consecutive `piece` cells starting next to (col, row) along (dc, dr).
    fn run_length(&self, col: usize, row: usize, dc: i32, dr: i32, piece: u8) -> usize {
        let mut count = 0;
        let (mut c, mut r) = (col as i32 + dc, row as i32 + dr);
        while c >= 0 && c < COLS as i32 && r >= 0 && r < ROWS as i32 {
            if self.cells[Self::pos(c as usize, r as usize)] != piece {
                break;
            }
            count += 1;
            c += dc;
            r += dr;
        }
        count
    }

    /// Check if every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.column_heights.iter().all(|&h| h >= ROWS as u8)
    }

    /// Evaluate the board after `player` dropped a piece into `last_action`.
    pub fn end_state(&self, last_action: Action, player: Player) -> GameState {
        if self.is_win(last_action, player) {
            GameState::Win
        } else if self.is_full() {
            GameState::Draw
        } else {
            GameState::StillPlaying
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Pretty-print with row 0 at the bottom and column indices underneath.
///
/// ```text
/// |==============|
/// |              |
/// |              |
/// |    X X       |
/// |    O X X     |
/// |  O X O O     |
/// |  O O X X     |
/// |==============|
/// |0 1 2 3 4 5 6 |
/// ```
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BORDER}")?;
        for row in (0..ROWS).rev() {
            f.write_str("|")?;
            for col in 0..COLS {
                let symbol = self.cell(row, col).map_or(' ', Player::symbol);
                write!(f, "{symbol} ")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{BORDER}")?;
        f.write_str(FOOTER)
    }
}

/// Parse the output of [`Board`]'s `Display` impl back into a board.
impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s.lines().filter(|line| !line.trim().is_empty()).collect();
        let expected = ROWS + 3;
        if lines.len() != expected {
            return Err(ParseBoardError::LineCount {
                expected,
                actual: lines.len(),
            });
        }
        for &line_idx in &[0, ROWS + 1] {
            if lines[line_idx].trim_end() != BORDER {
                return Err(ParseBoardError::Malformed {
                    line: line_idx,
                    reason: "expected border",
                });
            }
        }
        if lines[ROWS + 2].trim_end() != FOOTER {
            return Err(ParseBoardError::Malformed {
                line: ROWS + 2,
                reason: "expected column numbers",
            });
        }

        let mut board = Board::new();
        for (offset, line) in lines[1..=ROWS].iter().enumerate() {
            let line_idx = offset + 1;
            let row = ROWS - 1 - offset;
            let inner = line
                .strip_prefix('|')
                .and_then(|rest| rest.strip_suffix('|'))
                .ok_or(ParseBoardError::Malformed {
                    line: line_idx,
                    reason: "row must be enclosed in '|'",
                })?;

            let chars: Vec<char> = inner.chars().collect();
            if chars.len() != COLS * 2 {
                return Err(ParseBoardError::RowWidth {
                    row,
                    width: chars.len(),
                });
            }
            for col in 0..COLS {
                if chars[col * 2 + 1] != ' ' {
                    return Err(ParseBoardError::Malformed {
                        line: line_idx,
                        reason: "cells must be separated by a space",
                    });
                }
                if let Some(player) = Player::from_symbol(chars[col * 2])? {
                    board.cells[Board::pos(col, row)] = player.cell();
                }
            }
        }

        // Reconstruct column heights, rejecting pieces above gaps
        for col in 0..COLS {
            let height = (0..ROWS)
                .take_while(|&row| board.cells[Board::pos(col, row)] != EMPTY)
                .count();
            if (height..ROWS).any(|row| board.cells[Board::pos(col, row)] != EMPTY) {
                return Err(ParseBoardError::FloatingPiece(col));
            }
            board.column_heights[col] = height as u8;
        }

        Ok(board)
    }
}

#[cfg(test)]
mod tests;
