use serde::{Deserialize, Serialize};

use crate::PairId;

/// Visibility state of a single card. `Matched` is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardState {
    FaceDown,
    FaceUp,
    Matched,
}

impl CardState {
    pub const fn is_matched(self) -> bool {
        matches!(self, Self::Matched)
    }

    pub const fn is_face_up(self) -> bool {
        matches!(self, Self::FaceUp)
    }
}

impl Default for CardState {
    fn default() -> Self {
        Self::FaceDown
    }
}

/// A single grid cell. The grid owns its cards; the engine mutates them
/// through the grid's card-access API.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pair_id: PairId,
    state: CardState,
    interactable: bool,
}

impl Default for Card {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Card {
    pub const fn new(pair_id: PairId) -> Self {
        Self {
            pair_id,
            state: CardState::FaceDown,
            interactable: true,
        }
    }

    pub const fn pair_id(&self) -> PairId {
        self.pair_id
    }

    pub const fn state(&self) -> CardState {
        self.state
    }

    pub const fn is_interactable(&self) -> bool {
        self.interactable
    }

    /// Reveals the card. Matched cards stay matched.
    pub fn flip_to_front(&mut self) {
        if !self.state.is_matched() {
            self.state = CardState::FaceUp;
        }
    }

    /// Hides the card. Matched cards stay matched.
    pub fn flip_to_back(&mut self) {
        if !self.state.is_matched() {
            self.state = CardState::FaceDown;
        }
    }

    pub fn set_matched(&mut self) {
        self.state = CardState::Matched;
    }

    pub fn set_interactable(&mut self, interactable: bool) {
        self.interactable = interactable;
    }

    /// Puts the card back into its initial face-down, interactable state.
    pub fn reset(&mut self) {
        self.state = CardState::FaceDown;
        self.interactable = true;
    }
}
