//! Deferred continuations run by the tick loop.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::{ActorId, SlotId};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Continuation {
    /// End of a slot's execution burst: attempt the evolution against the
    /// triggering actor's ledger.
    ResolveBurst { slot_id: SlotId, actor_id: ActorId },
}

// Field order matters: derived `Ord` sorts by due tick, then scheduling order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Scheduled {
    due_tick: u64,
    seq: u64,
    continuation: Continuation,
}

/// Min-heap of continuations keyed by due tick.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_tick: u64, continuation: Continuation) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled {
            due_tick,
            seq,
            continuation,
        }));
    }

    /// Removes and returns every continuation due at or before `now`,
    /// earliest first, ties in scheduling order.
    pub fn drain_due(&mut self, now: u64) -> Vec<Continuation> {
        let mut due = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|Reverse(entry)| entry.due_tick <= now)
        {
            if let Some(Reverse(entry)) = self.queue.pop() {
                due.push(entry.continuation);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of pending bursts for one slot.
    pub fn pending_for_slot(&self, slot: &SlotId) -> usize {
        self.queue
            .iter()
            .filter(|Reverse(entry)| {
                matches!(&entry.continuation, Continuation::ResolveBurst { slot_id, .. } if slot_id == slot)
            })
            .count()
    }

    /// Due tick of the earliest pending continuation.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(entry)| entry.due_tick)
    }
}
