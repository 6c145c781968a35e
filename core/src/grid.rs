use ndarray::Array2;

use crate::*;

/// Smallest playable grid: two pairs.
pub const MIN_CARDS: CardCount = 4;

/// Card-layout collaborator consumed by the engine. The engine never owns
/// cards directly; it reaches them through this access surface so an
/// alternative provider (e.g. a scripted one in tests) can be swapped in.
pub trait GridProvider {
    /// Replaces the current layout with a newly generated one.
    fn generate(&mut self, size: GridSize) -> Result<()>;
    fn is_valid_size(&self, size: GridSize) -> bool;
    fn size(&self) -> GridSize;
    fn card(&self, index: CardIndex) -> Option<&Card>;
    fn card_mut(&mut self, index: CardIndex) -> Option<&mut Card>;
    fn card_count(&self) -> CardCount;
    fn total_pairs(&self) -> CardCount;
    /// Whether every card has reached the `Matched` state.
    fn is_complete(&self) -> bool;
}

/// Default grid provider: a 2-D card array filled by a [`GridGenerator`].
/// Cards are addressed by their linear row-major index, which is also the
/// index order used by snapshots.
pub struct CardGrid {
    cards: Array2<Card>,
    generator: Box<dyn GridGenerator>,
}

impl CardGrid {
    pub fn new(generator: Box<dyn GridGenerator>) -> Self {
        Self {
            cards: Array2::default([0, 0]),
            generator,
        }
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    fn check_pair_distribution(&self) {
        use std::collections::HashMap;

        let mut counts: HashMap<PairId, CardCount> = HashMap::new();
        for card in self.cards.iter() {
            *counts.entry(card.pair_id()).or_insert(0) += 1;
        }
        let total = self.cards.len();
        if counts.len() != total / 2 || counts.values().any(|&copies| copies != 2) {
            log::warn!(
                "generated layout pair distribution is off: {} ids for {} cards",
                counts.len(),
                total
            );
        }
    }
}

impl GridProvider for CardGrid {
    fn generate(&mut self, size: GridSize) -> Result<()> {
        if !self.is_valid_size(size) {
            log::error!("invalid grid size: {}", grid_size_text(size));
            return Err(GameError::InvalidGridSize);
        }
        self.cards = self.generator.generate(size);
        self.check_pair_distribution();
        Ok(())
    }

    fn is_valid_size(&self, (rows, cols): GridSize) -> bool {
        let total = mult(rows, cols);
        rows >= 1 && cols >= 1 && total >= MIN_CARDS && total % 2 == 0
    }

    fn size(&self) -> GridSize {
        let dim = self.cards.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    fn card(&self, index: CardIndex) -> Option<&Card> {
        self.cards.as_slice().and_then(|cards| cards.get(index))
    }

    fn card_mut(&mut self, index: CardIndex) -> Option<&mut Card> {
        self.cards
            .as_slice_mut()
            .and_then(|cards| cards.get_mut(index))
    }

    fn card_count(&self) -> CardCount {
        self.cards.len().try_into().unwrap()
    }

    fn total_pairs(&self) -> CardCount {
        self.card_count() / 2
    }

    fn is_complete(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|card| card.state().is_matched())
    }
}

impl core::fmt::Debug for CardGrid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CardGrid")
            .field("size", &self.size())
            .field("cards", &self.cards)
            .finish()
    }
}
