use core::ops::BitOr;
use core::time::Duration;
use serde::{Deserialize, Serialize};

pub use card::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use generator::*;
pub use grid::*;
pub use score::*;
pub use store::*;
pub use timer::*;
pub use types::*;

mod card;
mod engine;
mod error;
mod events;
mod generator;
mod grid;
mod score;
mod store;
mod timer;
mod types;

/// Canonical reveal limit. The evaluation logic compares the first two
/// flipped cards pairwise; other limits are accepted as configuration but
/// flagged at construction.
pub const MAX_FLIPPED_CARDS: usize = 2;

/// Floor applied to [`GameConfig::preview_duration`]; shorter values are
/// silently raised.
pub const MIN_PREVIEW_DURATION: Duration = Duration::from_millis(500);

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Cool-down before mismatched cards flip back face down.
    pub mismatch_delay: Duration,
    /// How many cards may be face up and unevaluated at once.
    pub max_flipped: usize,
    /// Queued input mode: clicks arriving while the reveal limit is reached
    /// wait in a FIFO instead of being dropped.
    pub continuous_flipping: bool,
    pub preview_enabled: bool,
    pub preview_duration: Duration,
    /// Grid dimensions used when no saved game exists on first start.
    pub default_size: GridSize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mismatch_delay: Duration::from_millis(1500),
            max_flipped: MAX_FLIPPED_CARDS,
            continuous_flipping: true,
            preview_enabled: true,
            preview_duration: Duration::from_secs(2),
            default_size: (3, 4),
        }
    }
}

/// Outcome of one input event or clock advance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PlayOutcome {
    NoChange,
    Flipped,
    Mismatched,
    Matched,
    Won,
}

impl PlayOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        use PlayOutcome::*;
        match self {
            NoChange => false,
            Flipped => true,
            Mismatched => true,
            Matched => true,
            Won => true,
        }
    }
}

/// Used to merge outcomes when one event cascades (queue drains, timer
/// fires).
impl BitOr for PlayOutcome {
    type Output = PlayOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use PlayOutcome::*;
        match (self, rhs) {
            // winning dominates
            (Won, _) => Won,
            (_, Won) => Won,
            // then a completed match
            (Matched, _) => Matched,
            (_, Matched) => Matched,
            // then a pending mismatch
            (Mismatched, _) => Mismatched,
            (_, Mismatched) => Mismatched,
            // then a plain reveal
            (Flipped, _) => Flipped,
            (_, Flipped) => Flipped,
            // and no-change only with both
            (NoChange, NoChange) => NoChange,
        }
    }
}
