use core::time::Duration;
use web_time::Instant;

/// The two delayed-action lineages the engine keeps. At most one timer of
/// each kind may be outstanding at any instant; the engine cancels the prior
/// one before scheduling a replacement so a stale timer can never mutate
/// cards of a superseded session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerKind {
    MismatchRecovery,
    Preview,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimerId(u64);

#[derive(Copy, Clone, Debug)]
struct TimerEntry {
    id: TimerId,
    kind: TimerKind,
    fire_at: Duration,
}

/// Cooperative schedule-and-possibly-cancel timer queue. Time only moves
/// when the owner calls [`TimerQueue::advance`], which makes every timed
/// sequence deterministic under test.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    pending: Vec<TimerEntry>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(TimerEntry {
            id,
            kind,
            fire_at: self.now + delay,
        });
        log::trace!("scheduled {:?} as {:?} in {:?}", kind, id, delay);
        id
    }

    /// Cancels a pending timer. Calling after the timer already fired (or was
    /// cancelled) is a no-op and returns false.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.id != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|entry| entry.id == id)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Moves the clock forward and returns the timers that came due, in
    /// deadline order.
    pub fn advance(&mut self, dt: Duration) -> Vec<(TimerId, TimerKind)> {
        self.now += dt;
        let now = self.now;

        let mut fired = Vec::new();
        self.pending.retain(|entry| {
            if entry.fire_at <= now {
                fired.push(*entry);
                false
            } else {
                true
            }
        });
        fired.sort_by_key(|entry| entry.fire_at);
        fired.into_iter().map(|entry| (entry.id, entry.kind)).collect()
    }
}

/// Wall-clock driver for hosts: converts real elapsed time into the deltas
/// fed to [`TimerQueue::advance`]. Uses `web_time` so the same code runs on
/// wasm targets.
#[derive(Debug)]
pub struct SessionClock {
    last: Instant,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Elapsed time since the previous tick (or since construction).
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        dt
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
