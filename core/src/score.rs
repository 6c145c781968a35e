use serde::{Deserialize, Serialize};

/// Accumulates match/mismatch events into a score total. The engine only
/// reports outcomes and mirrors `total_score`; any bonus policy lives behind
/// this trait.
pub trait ScoreTracker {
    fn register_match(&mut self);
    fn register_mismatch(&mut self);
    fn reset(&mut self);
    /// Re-seeds the total from a restored snapshot; any streak state starts
    /// over.
    fn restore(&mut self, total: u32);
    fn total_score(&self) -> u32;
}

/// Default tracker: fixed points per match plus a bonus that grows with each
/// consecutive match. A mismatch resets the streak but never the total.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComboScoreTracker {
    base_points: u32,
    combo_bonus: u32,
    streak: u32,
    total: u32,
}

impl ComboScoreTracker {
    pub const DEFAULT_BASE_POINTS: u32 = 100;
    pub const DEFAULT_COMBO_BONUS: u32 = 25;

    pub const fn new(base_points: u32, combo_bonus: u32) -> Self {
        Self {
            base_points,
            combo_bonus,
            streak: 0,
            total: 0,
        }
    }

    pub const fn streak(&self) -> u32 {
        self.streak
    }
}

impl Default for ComboScoreTracker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_POINTS, Self::DEFAULT_COMBO_BONUS)
    }
}

impl ScoreTracker for ComboScoreTracker {
    fn register_match(&mut self) {
        let bonus = self.streak.saturating_mul(self.combo_bonus);
        self.total = self
            .total
            .saturating_add(self.base_points)
            .saturating_add(bonus);
        self.streak += 1;
    }

    fn register_mismatch(&mut self) {
        self.streak = 0;
    }

    fn reset(&mut self) {
        self.streak = 0;
        self.total = 0;
    }

    fn restore(&mut self, total: u32) {
        self.streak = 0;
        self.total = total;
    }

    fn total_score(&self) -> u32 {
        self.total
    }
}
