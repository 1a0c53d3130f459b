//! Board model: gems, cells, coordinates, grid with swap / gravity / refill.

use rand::Rng;
use std::fmt;

/// Gem kinds. The active alphabet is a prefix of `Gem::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gem {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl Gem {
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Purple,
        Self::Orange,
    ];

    /// First `kinds` gems (clamped to 1..=6).
    pub fn alphabet(kinds: usize) -> &'static [Self] {
        &Self::ALL[..kinds.clamp(1, Self::ALL.len())]
    }

    /// Colour index 0..6 for theme.gem_color().
    pub fn color_index(&self) -> u8 {
        match self {
            Self::Red => 0,
            Self::Blue => 1,
            Self::Green => 2,
            Self::Yellow => 3,
            Self::Purple => 4,
            Self::Orange => 5,
        }
    }

    /// Glyph drawn on the board; distinct shapes so colour is not the only cue.
    pub fn glyph(&self) -> char {
        match self {
            Self::Red => '♥',
            Self::Blue => '◆',
            Self::Green => '▲',
            Self::Yellow => '★',
            Self::Purple => '●',
            Self::Orange => '■',
        }
    }

    fn letter(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Blue => 'B',
            Self::Green => 'G',
            Self::Yellow => 'Y',
            Self::Purple => 'P',
            Self::Orange => 'O',
        }
    }

    #[cfg(test)]
    fn from_letter(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.letter() == c)
    }
}

/// Single cell: either empty (mid-cascade only) or a gem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Gem(Gem),
}

impl Cell {
    #[inline]
    pub fn gem(self) -> Option<Gem> {
        match self {
            Self::Gem(g) => Some(g),
            Self::Empty => None,
        }
    }
}

/// Grid position. Ordered row-major so coordinate sets iterate top-left first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// 4-neighbourhood adjacency.
    pub fn is_adjacent(&self, other: Self) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

/// 1-based, as shown to the player.
impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{} c{}", self.row + 1, self.col + 1)
    }
}

/// Square playfield. cells[row * size + col]; row 0 is the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// All-empty grid of `size` x `size`.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Build from letter rows (`R B G Y P O`, `.` = empty). Rows must be square.
    #[cfg(test)]
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for row in rows {
            let before = cells.len();
            for c in row.chars().filter(|c| !c.is_whitespace()) {
                let cell = match c {
                    '.' => Cell::Empty,
                    c => Cell::Gem(Gem::from_letter(c)?),
                };
                cells.push(cell);
            }
            if cells.len() - before != size {
                return None;
            }
        }
        Some(Self { size, cells })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn contains(&self, at: Coord) -> bool {
        at.row < self.size && at.col < self.size
    }

    #[inline]
    pub fn get(&self, at: Coord) -> Option<Cell> {
        if !self.contains(at) {
            return None;
        }
        self.cells.get(at.row * self.size + at.col).copied()
    }

    #[inline]
    pub fn set(&mut self, at: Coord, cell: Cell) {
        if self.contains(at) {
            self.cells[at.row * self.size + at.col] = cell;
        }
    }

    /// Exchange two cells. Out-of-bounds coordinates leave the grid untouched.
    pub fn swap(&mut self, a: Coord, b: Coord) {
        if self.contains(a) && self.contains(b) {
            self.cells
                .swap(a.row * self.size + a.col, b.row * self.size + b.col);
        }
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Empty).count()
    }

    /// Compact each column downward, keeping the vertical order of gems.
    /// Empty cells end up at the top of their column. Returns true if anything moved.
    pub fn apply_gravity(&mut self) -> bool {
        let mut moved = false;
        for col in 0..self.size {
            let mut write = self.size;
            for row in (0..self.size).rev() {
                let at = Coord::new(row, col);
                if let Some(Cell::Gem(g)) = self.get(at) {
                    write -= 1;
                    if write != row {
                        self.set(Coord::new(write, col), Cell::Gem(g));
                        self.set(at, Cell::Empty);
                        moved = true;
                    }
                }
            }
        }
        moved
    }

    /// Fill every empty cell with a uniformly random gem. No adjacency constraint.
    pub fn refill<R: Rng + ?Sized>(&mut self, alphabet: &[Gem], rng: &mut R) -> usize {
        let mut filled = 0;
        for cell in self.cells.iter_mut().filter(|c| **c == Cell::Empty) {
            *cell = Cell::Gem(alphabet[rng.random_range(0..alphabet.len())]);
            filled += 1;
        }
        filled
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size) {
            for cell in row {
                let c = cell.gem().map_or('.', Gem::letter);
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
