//! Match detection: runs of three or more equal gems along rows and columns.

use crate::board::{Cell, Coord, Grid};
use std::collections::BTreeSet;

/// Minimum run length that counts as a match.
pub const MIN_RUN: usize = 3;

/// Scan direction. Rows walk left to right, columns top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    /// Coordinate of the `pos`-th cell on line `line`.
    #[inline]
    fn at(self, line: usize, pos: usize) -> Coord {
        match self {
            Self::Row => Coord::new(line, pos),
            Self::Column => Coord::new(pos, line),
        }
    }
}

/// Every coordinate that belongs to a run of >= 3 equal gems, each at most once.
/// Coordinates in both a horizontal and a vertical run (L/T shapes) are merged by set union.
pub fn find_matches(grid: &Grid) -> BTreeSet<Coord> {
    let mut matches = BTreeSet::new();
    scan_axis(grid, Axis::Row, &mut matches);
    scan_axis(grid, Axis::Column, &mut matches);
    matches
}

pub fn has_matches(grid: &Grid) -> bool {
    !find_matches(grid).is_empty()
}

/// Record all runs along `axis` into `out`.
fn scan_axis(grid: &Grid, axis: Axis, out: &mut BTreeSet<Coord>) {
    let n = grid.size();
    let cell = |line, pos| grid.get(axis.at(line, pos)).unwrap_or(Cell::Empty);
    for line in 0..n {
        let mut pos = 0;
        while pos + MIN_RUN <= n {
            let Cell::Gem(gem) = cell(line, pos) else {
                pos += 1;
                continue;
            };
            let mut len = 1;
            while pos + len < n && cell(line, pos + len) == Cell::Gem(gem) {
                len += 1;
            }
            if len >= MIN_RUN {
                out.extend((pos..pos + len).map(|p| axis.at(line, p)));
                pos += len;
            } else {
                pos += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_no_matches() {
        let g = grid(&["RBGY", "BGYR", "GYRB", "YRBG"]);
        assert!(find_matches(&g).is_empty());
        assert!(!has_matches(&g));
    }

    #[test]
    fn test_horizontal_run_of_four() {
        let g = grid(&[
            "RBGYPO", //
            "BYYYYG", //
            "GRBOPR", //
            "RBGYPO", //
            "BGRBOY", //
            "OPYGRB", //
        ]);
        let m = find_matches(&g);
        let expected: BTreeSet<_> = (1..5).map(|c| Coord::new(1, c)).collect();
        assert_eq!(m, expected);
    }

    #[test]
    fn test_vertical_run_at_bottom_edge() {
        let g = grid(&[
            "RBGY", //
            "BGYP", //
            "BYRG", //
            "BRGY", //
        ]);
        let m = find_matches(&g);
        let expected: BTreeSet<_> = (1..4).map(|r| Coord::new(r, 0)).collect();
        assert_eq!(m, expected);
    }

    #[test]
    fn test_l_shape_counts_corner_once() {
        let g = grid(&[
            "RRRB", //
            "RBGY", //
            "RGYB", //
            "BYGP", //
        ]);
        let m = find_matches(&g);
        // 3 horizontal + 3 vertical sharing (0,0)
        assert_eq!(m.len(), 5);
        assert!(m.contains(&Coord::new(0, 0)));
        assert!(m.contains(&Coord::new(2, 0)));
        assert!(m.contains(&Coord::new(0, 2)));
    }

    #[test]
    fn test_t_shape() {
        let g = grid(&[
            "GGGB", //
            "RGYB", //
            "YGRP", //
            "BYOR", //
        ]);
        let m = find_matches(&g);
        assert_eq!(m.len(), 5);
        assert!(m.contains(&Coord::new(0, 1)));
        assert!(m.contains(&Coord::new(2, 1)));
    }

    #[test]
    fn test_empty_cells_break_runs() {
        let g = grid(&[
            "RR.R", //
            "....", //
            "....", //
            "BB.B", //
        ]);
        assert!(find_matches(&g).is_empty());
    }

    #[test]
    fn test_two_runs_in_one_row() {
        let g = grid(&[
            "RRRBBBG", //
            "GYPOGYP", //
            "YPOGYPO", //
            "POGYPOG", //
            "OGYPOGY", //
            "GYPOGYP", //
            "YPOGYPO", //
        ]);
        let m = find_matches(&g);
        assert_eq!(m.len(), 6);
        assert!(!m.contains(&Coord::new(0, 6)));
    }
}
