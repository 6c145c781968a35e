use serde::{Deserialize, Serialize};

use crate::{CardCount, CardIndex};

/// State-change notifications consumed by the presentation layer. Sound and
/// animation hooks attach here; the engine itself never renders or plays
/// anything.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged(u32),
    TurnsChanged(u32),
    PairsChanged { matched: CardCount, total: CardCount },
    CardFlipped(CardIndex),
    GameStarted,
    GameWon,
    PreviewStarted,
    PreviewEnded,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Subscribe/unsubscribe registry with registration-order delivery.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriberId, Box<dyn FnMut(&GameEvent)>)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Removes a subscriber. Unknown or already removed ids are a no-op.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: GameEvent) {
        log::trace!("event: {:?}", event);
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&event);
        }
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
