//! Deterministic timer queue
//!
//! Entries are scheduled with an explicit "now" and a delay in milliseconds;
//! the owner drives the queue by calling `fire_due(now)` from its event loop
//! tick. There is no background thread - the queue only observes the clock
//! values it is handed, which keeps every transition reproducible in tests.

use crate::cancel::CancellationToken;

/// Identifier of one scheduled entry.
pub type TimerId = u64;

/// Handle returned by `schedule`: the entry's id plus its cancellation
/// token.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    pub id: TimerId,
    pub token: CancellationToken,
}

#[derive(Debug)]
struct TimerEntry<K> {
    id: TimerId,
    deadline_ms: u64,
    token: CancellationToken,
    kind: K,
}

/// Ordered queue of pending one-shot timers carrying a payload of type `K`.
///
/// Single event loop only: all methods take `&mut self` and the queue is
/// never shared across threads.
#[derive(Debug)]
pub struct TimerQueue<K> {
    next_id: TimerId,
    entries: Vec<TimerEntry<K>>,
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self { next_id: 1, entries: Vec::new() }
    }

    /// Schedule `kind` to fire at `now_ms + delay_ms`.
    ///
    /// A zero delay fires on the next `fire_due` call, which is how the
    /// overlay defers editor focus until after the surface is attached.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, kind: K) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;

        let token = CancellationToken::new();
        self.entries.push(TimerEntry {
            id,
            deadline_ms: now_ms.saturating_add(delay_ms),
            token: token.clone(),
            kind,
        });

        TimerHandle { id, token }
    }

    /// Cancel a pending entry by id.
    ///
    /// Returns `true` if the entry was still pending. Cancelling an already
    /// fired or unknown id is a no-op.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        if let Some(index) = self.entries.iter().position(|entry| entry.id == id) {
            let entry = self.entries.swap_remove(index);
            entry.token.cancel();
            true
        } else {
            false
        }
    }

    /// Remove and return every entry due at `now_ms`, oldest deadline first.
    ///
    /// Entries whose token was cancelled out-of-band are dropped silently.
    pub fn fire_due(&mut self, now_ms: u64) -> Vec<(TimerId, K)> {
        let mut due: Vec<TimerEntry<K>> = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            if self.entries[index].deadline_ms <= now_ms {
                due.push(self.entries.swap_remove(index));
            } else {
                index += 1;
            }
        }

        due.sort_by_key(|entry| (entry.deadline_ms, entry.id));
        due.into_iter()
            .filter(|entry| !entry.token.is_cancelled())
            .map(|entry| (entry.id, entry.kind))
            .collect()
    }

    /// Drop every pending entry, cancelling their tokens.
    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            entry.token.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
