use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use crate::{CardCount, CardIndex, CardState, Coord, GameError, PairId, Result};

/// Per-card entry of a snapshot. `card_index` is the linear row-major
/// position in the grid; the correspondence must be identical after the grid
/// is regenerated on load.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardSaveData {
    pub card_index: CardIndex,
    pub card_id: PairId,
    pub state: CardState,
}

/// Serialized form of one in-progress session, sufficient to resume it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub score: u32,
    pub turns: u32,
    pub matched_pairs: CardCount,
    pub grid_rows: Coord,
    pub grid_cols: Coord,
    pub card_states: Vec<CardSaveData>,
}

/// Durable single-slot store for one in-progress game snapshot.
pub trait SaveStore {
    fn has_saved_game(&self) -> bool;
    fn save_game(&mut self, data: &SaveData) -> Result<()>;
    fn load_game(&self) -> Result<Option<SaveData>>;
    fn clear_saved_game(&mut self);
}

/// In-memory store keeping the snapshot as a JSON string. Clones share the
/// same slot, which is how a host (or a test) hands the same storage to a
/// fresh engine instance. Single-threaded by design, like the engine itself.
#[derive(Clone, Debug, Default)]
pub struct MemorySaveStore {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemorySaveStore {
    fn has_saved_game(&self) -> bool {
        self.slot.borrow().is_some()
    }

    fn save_game(&mut self, data: &SaveData) -> Result<()> {
        let json = serde_json::to_string(data).map_err(|err| {
            log::error!("failed to encode snapshot: {}", err);
            GameError::CorruptSave
        })?;
        self.slot.borrow_mut().replace(json);
        Ok(())
    }

    fn load_game(&self) -> Result<Option<SaveData>> {
        let Some(json) = self.slot.borrow().clone() else {
            return Ok(None);
        };
        let data = serde_json::from_str(&json).map_err(|err| {
            log::error!("failed to decode snapshot: {}", err);
            GameError::CorruptSave
        })?;
        Ok(Some(data))
    }

    fn clear_saved_game(&mut self) {
        self.slot.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SaveData {
        SaveData {
            score: 225,
            turns: 5,
            matched_pairs: 2,
            grid_rows: 3,
            grid_cols: 4,
            card_states: vec![
                CardSaveData {
                    card_index: 0,
                    card_id: 0,
                    state: CardState::Matched,
                },
                CardSaveData {
                    card_index: 1,
                    card_id: 3,
                    state: CardState::FaceDown,
                },
            ],
        }
    }

    #[test]
    fn roundtrip_preserves_snapshot() {
        let mut store = MemorySaveStore::new();
        assert!(!store.has_saved_game());
        assert_eq!(store.load_game().unwrap(), None);

        store.save_game(&sample()).unwrap();
        assert!(store.has_saved_game());
        assert_eq!(store.load_game().unwrap(), Some(sample()));
    }

    #[test]
    fn clear_removes_snapshot() {
        let mut store = MemorySaveStore::new();
        store.save_game(&sample()).unwrap();

        store.clear_saved_game();
        assert!(!store.has_saved_game());
        assert_eq!(store.load_game().unwrap(), None);
    }

    #[test]
    fn undecodable_snapshot_is_corrupt() {
        let store = MemorySaveStore::new();
        store.slot.borrow_mut().replace("not a snapshot".into());

        assert!(store.has_saved_game());
        assert_eq!(store.load_game(), Err(GameError::CorruptSave));
    }

    #[test]
    fn clones_share_the_slot() {
        let mut store = MemorySaveStore::new();
        let replica = store.clone();

        store.save_game(&sample()).unwrap();
        assert!(replica.has_saved_game());
        assert_eq!(replica.load_game().unwrap(), Some(sample()));
    }
}
