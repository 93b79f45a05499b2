//! Board storage: coordinates, stone colors and a bounds-checked square grid.
//!
//! The board knows nothing about the rules. It stores one [`StoneColor`] per
//! point, hands out neighbor coordinates that are already clipped to the
//! grid, and compares by value so that whole positions can be checked for
//! repetition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DIAGONAL, ORTHOGONAL};
use crate::error::{GoError, Result};

/// Contents of a point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoneColor {
    #[default]
    Empty,
    Black,
    White,
}

impl StoneColor {
    /// The other player. `Empty` maps to itself.
    pub fn opponent(self) -> Self {
        match self {
            StoneColor::Black => StoneColor::White,
            StoneColor::White => StoneColor::Black,
            StoneColor::Empty => StoneColor::Empty,
        }
    }

    pub fn is_stone(self) -> bool {
        self != StoneColor::Empty
    }

    /// Slot for per-player tallies: Black = 0, White = 1.
    ///
    /// Callers must pass a stone; public accessors check `is_stone` first.
    pub(crate) fn index(self) -> usize {
        debug_assert!(self.is_stone(), "no tally slot for an empty point");
        match self {
            StoneColor::Black => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for StoneColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoneColor::Black => "Black",
            StoneColor::White => "White",
            StoneColor::Empty => "Empty",
        };
        f.write_str(name)
    }
}

impl FromStr for StoneColor {
    type Err = GoError;

    /// Accepts a player name: "black"/"b" or "white"/"w", any case.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "black" | "b" => Ok(StoneColor::Black),
            "white" | "w" => Ok(StoneColor::White),
            other => Err(GoError::InvalidConfiguration(format!(
                "unknown color '{other}'"
            ))),
        }
    }
}

/// A point on the board, `(row, col)` with row 0 at the top.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Offset by `(dr, dc)`, or `None` if the result leaves a `size` board.
    pub fn offset(self, dr: isize, dc: isize, size: usize) -> Option<Coord> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < size && col < size).then_some(Coord { row, col })
    }

    /// Render in Go notation for a board of `size` ("D4"; columns skip 'I',
    /// rows count up from the bottom edge).
    pub fn to_vertex(self, size: usize) -> String {
        let mut c = b'A' + self.col as u8;
        if c >= b'I' {
            c += 1;
        }
        format!("{}{}", c as char, size - self.row)
    }

    /// Parse Go notation ("D4", "j9") for a board of `size`.
    pub fn parse_vertex(s: &str, size: usize) -> Option<Coord> {
        let s = s.trim();
        let bytes = s.as_bytes();
        if bytes.len() < 2 {
            return None;
        }

        let col_char = bytes[0].to_ascii_uppercase();
        if !col_char.is_ascii_uppercase() || col_char == b'I' {
            return None;
        }
        let mut col = (col_char - b'A') as usize;
        // Skip 'I' column (Go convention to avoid confusion with 'J')
        if col_char > b'I' {
            col -= 1;
        }

        let number: usize = s[1..].parse().ok()?;
        if number == 0 || number > size || col >= size {
            return None;
        }
        Some(Coord::new(size - number, col))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Square grid of stones. The size never changes after construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<StoneColor>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![StoneColor::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn idx(&self, at: Coord) -> usize {
        at.row * self.size + at.col
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.row < self.size && at.col < self.size
    }

    fn check(&self, at: Coord) -> Result<usize> {
        if self.contains(at) {
            Ok(self.idx(at))
        } else {
            Err(GoError::OutOfBounds {
                row: at.row,
                col: at.col,
                size: self.size,
            })
        }
    }

    pub fn get(&self, at: Coord) -> Result<StoneColor> {
        let i = self.check(at)?;
        Ok(self.cells[i])
    }

    pub fn set(&mut self, at: Coord, color: StoneColor) -> Result<()> {
        let i = self.check(at)?;
        self.cells[i] = color;
        Ok(())
    }

    pub fn is_empty(&self, at: Coord) -> Result<bool> {
        Ok(self.get(at)? == StoneColor::Empty)
    }

    /// Unchecked read for coordinates that came from this board's own
    /// iterators. Panics on an out-of-range coordinate.
    #[inline]
    pub(crate) fn at(&self, at: Coord) -> StoneColor {
        self.cells[self.idx(at)]
    }

    #[inline]
    pub(crate) fn put(&mut self, at: Coord, color: StoneColor) {
        let i = self.idx(at);
        self.cells[i] = color;
    }

    /// Full independent copy.
    pub fn copy(&self) -> Board {
        self.clone()
    }

    /// All coordinates in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Coord> + use<> {
        let size = self.size;
        (0..size * size).map(move |i| Coord::new(i / size, i % size))
    }

    /// The up to 4 orthogonal neighbors that lie on the board.
    pub fn neighbors(&self, at: Coord) -> impl Iterator<Item = Coord> + use<> {
        let size = self.size;
        ORTHOGONAL
            .into_iter()
            .filter_map(move |(dr, dc)| at.offset(dr, dc, size))
    }

    /// The up to 4 diagonal neighbors that lie on the board.
    pub fn diagonals(&self, at: Coord) -> impl Iterator<Item = Coord> + use<> {
        let size = self.size;
        DIAGONAL
            .into_iter()
            .filter_map(move |(dr, dc)| at.offset(dr, dc, size))
    }

    /// Number of stones of `color` on the board.
    pub fn count(&self, color: StoneColor) -> usize {
        self.cells.iter().filter(|&&c| c == color).count()
    }

    pub fn center(&self) -> Coord {
        Coord::new(self.size / 2, self.size / 2)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            write!(f, "{:>2} ", self.size - row)?;
            for col in 0..self.size {
                let ch = match self.at(Coord::new(row, col)) {
                    StoneColor::Black => 'X',
                    StoneColor::White => 'O',
                    StoneColor::Empty => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for col in 0..self.size {
            let mut c = b'A' + col as u8;
            if c >= b'I' {
                c += 1;
            }
            write!(f, "{} ", c as char)?;
        }
        writeln!(f)
    }
}

impl FromStr for Board {
    type Err = GoError;

    /// Parse rows of `X` (Black), `O` (White) and `.` (empty), whitespace
    /// ignored. Handy for setting up positions in tests.
    fn from_str(s: &str) -> Result<Self> {
        let rows: Vec<Vec<StoneColor>> = s
            .lines()
            .map(|line| {
                line.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| match c {
                        'X' | 'x' | 'B' => Ok(StoneColor::Black),
                        'O' | 'o' | 'W' => Ok(StoneColor::White),
                        '.' | '+' => Ok(StoneColor::Empty),
                        other => Err(GoError::InvalidConfiguration(format!(
                            "unexpected board character '{other}'"
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .filter(|row| !matches!(row, Ok(r) if r.is_empty()))
            .collect::<Result<_>>()?;

        let size = rows.len();
        if size == 0 || rows.iter().any(|r| r.len() != size) {
            return Err(GoError::InvalidConfiguration(
                "board diagram must be square".into(),
            ));
        }
        Ok(Board {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(StoneColor::Black.opponent(), StoneColor::White);
        assert_eq!(StoneColor::White.opponent(), StoneColor::Black);
        assert_eq!(StoneColor::Empty.opponent(), StoneColor::Empty);
    }

    #[test]
    fn test_get_set_bounds() {
        let mut board = Board::new(9);
        let pt = Coord::new(4, 4);
        board.set(pt, StoneColor::Black).unwrap();
        assert_eq!(board.get(pt).unwrap(), StoneColor::Black);
        assert!(!board.is_empty(pt).unwrap());

        let off = Coord::new(9, 0);
        assert_eq!(
            board.get(off),
            Err(GoError::OutOfBounds { row: 9, col: 0, size: 9 })
        );
        assert!(board.set(off, StoneColor::White).is_err());
    }

    #[test]
    fn test_copy_is_independent() {
        let mut board = Board::new(4);
        let copy = board.copy();
        board.set(Coord::new(0, 0), StoneColor::White).unwrap();
        assert!(copy.is_empty(Coord::new(0, 0)).unwrap());
        assert_ne!(board, copy);
    }

    #[test]
    fn test_neighbors_clip_at_edges() {
        let board = Board::new(9);
        assert_eq!(board.neighbors(Coord::new(0, 0)).count(), 2);
        assert_eq!(board.neighbors(Coord::new(0, 4)).count(), 3);
        assert_eq!(board.neighbors(Coord::new(4, 4)).count(), 4);
        assert_eq!(board.diagonals(Coord::new(8, 8)).count(), 1);
    }

    #[test]
    fn test_vertex_roundtrip() {
        for size in [9, 19] {
            let board = Board::new(size);
            for pt in board.points() {
                let s = pt.to_vertex(size);
                assert_eq!(Coord::parse_vertex(&s, size), Some(pt), "{s}");
            }
        }
        // H and J are adjacent columns
        let h = Coord::parse_vertex("H5", 9).unwrap();
        let j = Coord::parse_vertex("J5", 9).unwrap();
        assert_eq!(j.col - h.col, 1);
        assert_eq!(Coord::parse_vertex("A1", 9), Some(Coord::new(8, 0)));
        assert_eq!(Coord::parse_vertex("I5", 9), None);
        assert_eq!(Coord::parse_vertex("K1", 9), None);
        assert_eq!(Coord::parse_vertex("A10", 9), None);
    }

    #[test]
    fn test_color_json_names() {
        assert_eq!(serde_json::to_string(&StoneColor::White).unwrap(), "\"white\"");
        let black: StoneColor = serde_json::from_str("\"black\"").unwrap();
        assert_eq!(black, StoneColor::Black);
        assert!(serde_json::from_str::<StoneColor>("\"White\"").is_err());
    }

    #[test]
    fn test_parse_diagram() {
        let board: Board = "
            X . . .
            . O . .
            . . . .
            . . . X
        "
        .parse()
        .unwrap();
        assert_eq!(board.size(), 4);
        assert_eq!(board.at(Coord::new(0, 0)), StoneColor::Black);
        assert_eq!(board.at(Coord::new(1, 1)), StoneColor::White);
        assert_eq!(board.count(StoneColor::Black), 2);
        assert!("X .\n. . .".parse::<Board>().is_err());
    }
}
