//! Initial board generation without pre-existing matches.

use crate::board::{Cell, Coord, Gem, Grid};
use crate::matcher::has_matches;
use rand::Rng;

/// Smallest alphabet that always admits a match-free board.
pub const MIN_KINDS: usize = 3;

/// Generate a `size` x `size` grid from `alphabet` containing no run of three.
/// Regenerates from scratch until the match detector agrees. Needs at least three gem
/// kinds, otherwise a match-free fill may not exist.
pub fn generate<R: Rng + ?Sized>(size: usize, alphabet: &[Gem], rng: &mut R) -> Grid {
    debug_assert!(
        alphabet.len() >= MIN_KINDS,
        "board generation needs {MIN_KINDS} gem kinds, got {}",
        alphabet.len()
    );
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        let grid = fill(size, alphabet, rng);
        if !has_matches(&grid) {
            if attempts > 1 {
                tracing::debug!(attempts, "board generated after retries");
            }
            return grid;
        }
    }
}

/// One row-major pass. Each cell avoids the gem that would complete a run with the
/// two cells before it (left and above).
fn fill<R: Rng + ?Sized>(size: usize, alphabet: &[Gem], rng: &mut R) -> Grid {
    let mut grid = Grid::new(size);
    let mut allowed = Vec::with_capacity(alphabet.len());
    for row in 0..size {
        for col in 0..size {
            let banned_h = (col >= 2)
                .then(|| pair(&grid, Coord::new(row, col - 1), Coord::new(row, col - 2)))
                .flatten();
            let banned_v = (row >= 2)
                .then(|| pair(&grid, Coord::new(row - 1, col), Coord::new(row - 2, col)))
                .flatten();

            allowed.clear();
            allowed.extend(
                alphabet
                    .iter()
                    .copied()
                    .filter(|g| Some(*g) != banned_h && Some(*g) != banned_v),
            );
            let pool = if allowed.is_empty() {
                alphabet
            } else {
                &allowed[..]
            };
            let gem = pool[rng.random_range(0..pool.len())];
            grid.set(Coord::new(row, col), Cell::Gem(gem));
        }
    }
    grid
}

/// The gem both cells share, if any.
fn pair(grid: &Grid, a: Coord, b: Coord) -> Option<Gem> {
    let (a, b) = (grid.get(a)?.gem()?, grid.get(b)?.gem()?);
    (a == b).then_some(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::find_matches;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generated_grids_are_match_free() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let g = generate(6, Gem::alphabet(6), &mut rng);
            assert!(find_matches(&g).is_empty(), "seed {seed}:\n{g}");
            assert_eq!(g.count_empty(), 0);
        }
    }

    #[test]
    fn test_small_alphabet_and_sizes() {
        for size in [4, 8, 12] {
            for seed in 0..50 {
                let mut rng = StdRng::seed_from_u64(seed);
                let g = generate(size, Gem::alphabet(3), &mut rng);
                assert_eq!(g.size(), size);
                assert!(find_matches(&g).is_empty(), "size {size} seed {seed}:\n{g}");
            }
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = generate(6, Gem::alphabet(6), &mut StdRng::seed_from_u64(42));
        let b = generate(6, Gem::alphabet(6), &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_uses_only_alphabet() {
        let alphabet = Gem::alphabet(4);
        let g = generate(6, alphabet, &mut StdRng::seed_from_u64(3));
        for row in 0..6 {
            for col in 0..6 {
                let gem = g.get(Coord::new(row, col)).and_then(Cell::gem).unwrap();
                assert!(alphabet.contains(&gem));
            }
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "needs 3 gem kinds")]
    fn test_single_kind_alphabet_rejected() {
        generate(4, Gem::alphabet(1), &mut StdRng::seed_from_u64(0));
    }
}
