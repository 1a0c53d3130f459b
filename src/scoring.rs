//! Score accounting: points per cleared gem, scaled by the combo multiplier of the
//! cascade step that cleared it.
//!
//! The multiplier is kept in integer percent so chain totals are exact:
//! step 0 is 100%, every further step within the same chain adds `combo_bonus_pct`.

/// Reference base points per cleared gem.
pub const BASE_MATCH_SCORE: u32 = 10;
/// Reference combo bonus per cascade step, in percent.
pub const COMBO_BONUS_PCT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreEngine {
    pub base_match_score: u32,
    pub combo_bonus_pct: u32,
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new(BASE_MATCH_SCORE, COMBO_BONUS_PCT)
    }
}

impl ScoreEngine {
    pub const fn new(base_match_score: u32, combo_bonus_pct: u32) -> Self {
        Self {
            base_match_score,
            combo_bonus_pct,
        }
    }

    /// Multiplier for the 0-based cascade `step` of a chain, in percent.
    pub fn multiplier_pct(&self, step: u32) -> u32 {
        100u32.saturating_add(self.combo_bonus_pct.saturating_mul(step))
    }

    /// Same as `multiplier_pct`, as a factor (1.0, 1.05, ...). Display only.
    pub fn multiplier(&self, step: u32) -> f64 {
        f64::from(self.multiplier_pct(step)) / 100.0
    }

    /// Points for one cascade round: cleared * base * multiplier, rounded half up.
    pub fn round_delta(&self, cleared: usize, step: u32) -> u32 {
        let raw = (cleared as u64)
            .saturating_mul(u64::from(self.base_match_score))
            .saturating_mul(u64::from(self.multiplier_pct(step)));
        u32::try_from(raw.saturating_add(50) / 100).unwrap_or(u32::MAX)
    }

    /// Total for a whole chain given the cleared count of each round in order.
    pub fn chain_total(&self, cleared_per_round: &[usize]) -> u32 {
        cleared_per_round
            .iter()
            .enumerate()
            .fold(0u32, |acc, (step, &n)| {
                acc.saturating_add(self.round_delta(n, step as u32))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_round_is_plain() {
        let s = ScoreEngine::default();
        assert_eq!(s.round_delta(3, 0), 30);
        assert_eq!(s.round_delta(5, 0), 50);
    }

    #[test]
    fn test_chain_of_three_then_four() {
        let s = ScoreEngine::new(10, 5);
        assert_eq!(s.chain_total(&[3, 4]), 72);
    }

    #[test]
    fn test_multiplier_grows_per_step() {
        let s = ScoreEngine::default();
        assert_eq!(s.multiplier_pct(0), 100);
        assert_eq!(s.multiplier_pct(1), 105);
        assert_eq!(s.multiplier_pct(4), 120);
        assert!((s.multiplier(2) - 1.10).abs() < 1e-9);
    }

    #[test]
    fn test_rounding_half_up() {
        // 3 * 1 * 1.05 = 3.15 -> 3 ; 10 * 1 * 1.05 = 10.5 -> 11
        let s = ScoreEngine::new(1, 5);
        assert_eq!(s.round_delta(3, 1), 3);
        assert_eq!(s.round_delta(10, 1), 11);
    }

    #[test]
    fn test_zero_cleared() {
        assert_eq!(ScoreEngine::default().round_delta(0, 3), 0);
        assert_eq!(ScoreEngine::default().chain_total(&[]), 0);
    }
}
