use core::time::Duration;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::*;

/// Valid transitions:
/// - Idle -> Previewing -> Active (preview enabled)
/// - Idle -> Active (preview disabled, or load)
/// - Active -> Won
///
/// A new game restarts from Idle regardless of the current phase.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Before the first grid generation.
    Idle,
    /// Timed full-reveal window at game start; input is disabled.
    Previewing,
    /// Normal play.
    Active,
    /// All pairs matched; input is disabled until a new game starts.
    Won,
}

impl SessionPhase {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn is_preview(self) -> bool {
        matches!(self, Self::Previewing)
    }
}

impl Default for SessionPhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Turn-taking rules engine for one active game: input queueing, reveal
/// limit enforcement, match evaluation, timed mismatch recovery, the timed
/// preview phase, win detection, and save/restore orchestration.
///
/// Collaborators are injected at construction. All mutation happens through
/// `&mut self` on the caller's thread; timers only fire inside
/// [`MatchEngine::advance`], so a timer callback can never interleave with an
/// in-progress evaluation.
pub struct MatchEngine<G: GridProvider> {
    grid: G,
    tracker: Box<dyn ScoreTracker>,
    store: Option<Box<dyn SaveStore>>,
    config: GameConfig,
    grid_size: GridSize,
    phase: SessionPhase,
    score: u32,
    turns: u32,
    matched_pairs: CardCount,
    flipped: SmallVec<[CardIndex; MAX_FLIPPED_CARDS]>,
    pending_clicks: VecDeque<CardIndex>,
    evaluating: bool,
    recovering: Vec<CardIndex>,
    timers: TimerQueue,
    mismatch_timer: Option<TimerId>,
    preview_timer: Option<TimerId>,
    events: EventBus,
}

impl<G: GridProvider> MatchEngine<G> {
    pub fn new(grid: G, tracker: Box<dyn ScoreTracker>, config: GameConfig) -> Self {
        if config.max_flipped != MAX_FLIPPED_CARDS {
            log::warn!(
                "max_flipped is {}, but evaluation only compares the first two flipped cards",
                config.max_flipped
            );
        }
        let config = GameConfig {
            preview_duration: clamp_preview_duration(config.preview_duration),
            ..config
        };
        Self {
            grid_size: config.default_size,
            grid,
            tracker,
            store: None,
            config,
            phase: SessionPhase::default(),
            score: 0,
            turns: 0,
            matched_pairs: 0,
            flipped: SmallVec::new(),
            pending_clicks: VecDeque::new(),
            evaluating: false,
            recovering: Vec::new(),
            timers: TimerQueue::new(),
            mismatch_timer: None,
            preview_timer: None,
            events: EventBus::new(),
        }
    }

    pub fn with_save_store(mut self, store: Box<dyn SaveStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.events.unsubscribe(id)
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub const fn turns(&self) -> u32 {
        self.turns
    }

    pub const fn matched_pairs(&self) -> CardCount {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> CardCount {
        self.grid.total_pairs()
    }

    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub const fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub const fn is_in_preview(&self) -> bool {
        self.phase.is_preview()
    }

    pub const fn is_evaluating(&self) -> bool {
        self.evaluating
    }

    pub const fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    pub fn grid_size_text(&self) -> String {
        grid_size_text(self.grid_size)
    }

    pub const fn preview_duration(&self) -> Duration {
        self.config.preview_duration
    }

    pub const fn grid(&self) -> &G {
        &self.grid
    }

    /// First-start policy: resume the saved game when one exists, otherwise
    /// start a new game at the configured default size.
    pub fn initialize(&mut self) -> Result<()> {
        let has_save = self
            .store
            .as_ref()
            .map_or(false, |store| store.has_saved_game());
        if has_save && self.load()? {
            return Ok(());
        }
        self.start_new_game(self.config.default_size)
    }

    pub fn start_new_game(&mut self, size: GridSize) -> Result<()> {
        if !self.grid.is_valid_size(size) {
            log::error!("invalid grid size: {}", grid_size_text(size));
            return Err(GameError::InvalidGridSize);
        }

        log::debug!("starting new game with {} grid", grid_size_text(size));
        self.reset_session();
        self.grid_size = size;
        self.grid.generate(size)?;

        self.events.emit(GameEvent::GameStarted);
        self.emit_counters();

        if self.config.preview_enabled {
            self.begin_preview();
        } else {
            self.phase = SessionPhase::Active;
        }

        log::debug!("new game started, {} pairs to match", self.grid.total_pairs());
        Ok(())
    }

    /// New game at the most recently used grid dimensions.
    pub fn restart(&mut self) -> Result<()> {
        self.start_new_game(self.grid_size)
    }

    /// Records the dimensions used by the next new game; the current grid is
    /// untouched.
    pub fn set_grid_size(&mut self, size: GridSize) {
        self.grid_size = size;
    }

    pub fn set_preview(&mut self, enabled: bool, duration: Duration) {
        self.config.preview_enabled = enabled;
        self.config.preview_duration = clamp_preview_duration(duration);
    }

    /// Single entry point for player input. Clicks are ignored outside
    /// active play (preview, before the first game, after a win) and for
    /// out-of-range cards.
    pub fn on_card_clicked(&mut self, index: CardIndex) -> PlayOutcome {
        if !self.phase.is_active() {
            log::trace!("click ignored, session not active");
            return PlayOutcome::NoChange;
        }
        if self.grid.card(index).is_none() {
            log::warn!("click ignored, card index {} out of range", index);
            return PlayOutcome::NoChange;
        }

        if self.config.continuous_flipping {
            self.pending_clicks.push_back(index);
            self.drain_click_queue()
        } else if self.evaluating {
            // traditional input mode drops clicks during the cool-down
            PlayOutcome::NoChange
        } else if self.can_flip(index) {
            self.flip_card(index)
        } else {
            PlayOutcome::NoChange
        }
    }

    /// Moves the cooperative clock forward and runs any delayed actions that
    /// came due (mismatch recovery, preview end).
    pub fn advance(&mut self, dt: Duration) -> PlayOutcome {
        let mut outcome = PlayOutcome::NoChange;
        for (id, kind) in self.timers.advance(dt) {
            match kind {
                TimerKind::MismatchRecovery if self.mismatch_timer == Some(id) => {
                    self.mismatch_timer = None;
                    outcome = outcome | self.finish_mismatch_recovery();
                }
                TimerKind::Preview if self.preview_timer == Some(id) => {
                    self.preview_timer = None;
                    self.end_preview();
                    outcome = outcome | PlayOutcome::Flipped;
                }
                // a timer from a superseded session, already replaced
                _ => log::trace!("ignoring stale {:?}", kind),
            }
        }
        outcome
    }

    /// Writes the full snapshot. No-op without a store or outside active
    /// play (in particular, never during preview).
    pub fn save(&mut self) -> Result<bool> {
        if self.store.is_none() || !self.phase.is_active() {
            return Ok(false);
        }

        let mut card_states = Vec::with_capacity(self.grid.card_count() as usize);
        for index in 0..self.grid.card_count() as CardIndex {
            if let Some(card) = self.grid.card(index) {
                card_states.push(CardSaveData {
                    card_index: index,
                    card_id: card.pair_id(),
                    state: card.state(),
                });
            }
        }
        let data = SaveData {
            score: self.score,
            turns: self.turns,
            matched_pairs: self.matched_pairs,
            grid_rows: self.grid_size.0,
            grid_cols: self.grid_size.1,
            card_states,
        };

        if let Some(store) = &mut self.store {
            store.save_game(&data)?;
        }
        log::debug!("game saved");
        Ok(true)
    }

    /// Restores the saved snapshot, regenerating the grid at the saved
    /// dimensions and replaying per-card states by index. No-op without a
    /// store or snapshot. No preview phase runs on load.
    pub fn load(&mut self) -> Result<bool> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        if !store.has_saved_game() {
            return Ok(false);
        }
        let Some(data) = store.load_game()? else {
            return Ok(false);
        };

        let size = (data.grid_rows, data.grid_cols);
        if !self.grid.is_valid_size(size) {
            log::error!("saved snapshot has invalid grid size: {}", grid_size_text(size));
            return Err(GameError::CorruptSave);
        }

        log::debug!("loading saved game, score {}, turns {}", data.score, data.turns);
        self.reset_session();
        self.grid_size = size;
        self.grid.generate(size)?;
        self.turns = data.turns;
        self.matched_pairs = data.matched_pairs;
        self.tracker.restore(data.score);
        self.score = self.tracker.total_score();

        // generator defaults do not matter: every card is reset explicitly,
        // then the snapshot is replayed on top by index
        for index in 0..self.grid.card_count() as CardIndex {
            if let Some(card) = self.grid.card_mut(index) {
                card.reset();
            }
        }
        for saved in &data.card_states {
            let Some(card) = self.grid.card_mut(saved.card_index) else {
                log::warn!("saved card index {} out of range, skipped", saved.card_index);
                continue;
            };
            match saved.state {
                // revealed again, but not part of the evaluation set
                CardState::FaceUp => card.flip_to_front(),
                CardState::Matched => {
                    card.flip_to_front();
                    card.set_matched();
                }
                CardState::FaceDown => card.reset(),
            }
        }

        self.phase = SessionPhase::Active;
        self.events.emit(GameEvent::GameStarted);
        self.emit_counters();
        Ok(true)
    }

    fn reset_session(&mut self) {
        self.score = 0;
        self.turns = 0;
        self.matched_pairs = 0;
        self.phase = SessionPhase::Idle;
        self.tracker.reset();
        self.flipped.clear();
        self.pending_clicks.clear();
        self.evaluating = false;
        self.recovering.clear();
        if let Some(id) = self.mismatch_timer.take() {
            self.timers.cancel(id);
        }
        if let Some(id) = self.preview_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn emit_counters(&mut self) {
        self.events.emit(GameEvent::ScoreChanged(self.score));
        self.events.emit(GameEvent::TurnsChanged(self.turns));
        self.events.emit(GameEvent::PairsChanged {
            matched: self.matched_pairs,
            total: self.grid.total_pairs(),
        });
    }

    fn begin_preview(&mut self) {
        log::debug!("preview phase, revealing all cards");
        self.phase = SessionPhase::Previewing;
        for index in 0..self.grid.card_count() as CardIndex {
            if let Some(card) = self.grid.card_mut(index) {
                card.flip_to_front();
                card.set_interactable(false);
            }
        }
        self.events.emit(GameEvent::PreviewStarted);

        if let Some(id) = self.preview_timer.take() {
            self.timers.cancel(id);
        }
        self.preview_timer = Some(
            self.timers
                .schedule(TimerKind::Preview, self.config.preview_duration),
        );
    }

    fn end_preview(&mut self) {
        log::debug!("preview phase ended, hiding all cards");
        for index in 0..self.grid.card_count() as CardIndex {
            if let Some(card) = self.grid.card_mut(index) {
                card.flip_to_back();
                card.set_interactable(true);
            }
        }
        self.phase = SessionPhase::Active;
        self.events.emit(GameEvent::PreviewEnded);
    }

    fn can_flip(&self, index: CardIndex) -> bool {
        self.grid.card(index).is_some_and(|card| {
            card.state() == CardState::FaceDown
                && card.is_interactable()
                && !self.flipped.contains(&index)
        })
    }

    fn drain_click_queue(&mut self) -> PlayOutcome {
        let mut outcome = PlayOutcome::NoChange;
        while self.phase.is_active() && self.flipped.len() < self.config.max_flipped {
            let Some(index) = self.pending_clicks.pop_front() else {
                break;
            };
            if self.can_flip(index) {
                outcome = outcome | self.flip_card(index);
            }
        }
        outcome
    }

    fn flip_card(&mut self, index: CardIndex) -> PlayOutcome {
        if let Some(card) = self.grid.card_mut(index) {
            card.flip_to_front();
        }
        self.flipped.push(index);
        self.events.emit(GameEvent::CardFlipped(index));
        log::trace!("card {} flipped, {} face up", index, self.flipped.len());

        if self.flipped.len() >= self.config.max_flipped {
            self.evaluate()
        } else {
            PlayOutcome::Flipped
        }
    }

    fn evaluate(&mut self) -> PlayOutcome {
        if self.flipped.len() < 2 {
            return PlayOutcome::Flipped;
        }

        // one turn per evaluation, before the outcome is known
        self.turns += 1;
        self.events.emit(GameEvent::TurnsChanged(self.turns));

        let first = self.pair_id_at(self.flipped[0]);
        let second = self.pair_id_at(self.flipped[1]);
        if first.is_some() && first == second {
            self.handle_match()
        } else {
            self.handle_mismatch()
        }
    }

    fn pair_id_at(&self, index: CardIndex) -> Option<PairId> {
        self.grid.card(index).map(Card::pair_id)
    }

    fn handle_match(&mut self) -> PlayOutcome {
        log::debug!("match found");
        for &index in &self.flipped {
            if let Some(card) = self.grid.card_mut(index) {
                card.set_matched();
            }
        }
        self.flipped.clear();

        self.tracker.register_match();
        self.score = self.tracker.total_score();
        self.matched_pairs += 1;
        self.events.emit(GameEvent::ScoreChanged(self.score));
        self.events.emit(GameEvent::PairsChanged {
            matched: self.matched_pairs,
            total: self.grid.total_pairs(),
        });

        if self.grid.is_complete() {
            self.win()
        } else {
            self.autosave();
            PlayOutcome::Matched
        }
    }

    fn handle_mismatch(&mut self) -> PlayOutcome {
        log::debug!(
            "mismatch, cards flip back in {:?}",
            self.config.mismatch_delay
        );
        self.tracker.register_mismatch();
        self.evaluating = true;
        self.recovering = self.flipped.iter().copied().collect();

        if let Some(id) = self.mismatch_timer.take() {
            self.timers.cancel(id);
        }
        self.mismatch_timer = Some(
            self.timers
                .schedule(TimerKind::MismatchRecovery, self.config.mismatch_delay),
        );
        PlayOutcome::Mismatched
    }

    fn finish_mismatch_recovery(&mut self) -> PlayOutcome {
        log::trace!("mismatch recovery, flipping cards back");
        for index in core::mem::take(&mut self.recovering) {
            if let Some(card) = self.grid.card_mut(index) {
                if card.state().is_face_up() {
                    card.flip_to_back();
                }
            }
        }
        self.flipped.clear();
        self.evaluating = false;

        let mut outcome = PlayOutcome::Flipped;
        if self.config.continuous_flipping {
            outcome = outcome | self.drain_click_queue();
        }
        outcome
    }

    fn win(&mut self) -> PlayOutcome {
        log::debug!("all pairs matched, game won");
        self.phase = SessionPhase::Won;
        self.events.emit(GameEvent::GameWon);
        // a completed game has no resumable state
        if let Some(store) = &mut self.store {
            store.clear_saved_game();
        }
        PlayOutcome::Won
    }

    fn autosave(&mut self) {
        // best effort, a failed save never rolls back game state
        if let Err(err) = self.save() {
            log::warn!("autosave failed: {}", err);
        }
    }
}

fn clamp_preview_duration(duration: Duration) -> Duration {
    if duration < MIN_PREVIEW_DURATION {
        log::warn!(
            "preview duration {:?} below minimum, raised to {:?}",
            duration,
            MIN_PREVIEW_DURATION
        );
        MIN_PREVIEW_DURATION
    } else {
        duration
    }
}
