//! Process slot: one incubation base and its lifecycle state machine.
//!
//! ```text
//! Empty ──bind──▶ (New) ──▶ Ready ──advance──▶ Running ──burst──▶ Waiting ──advance──▶ Running …
//!                                                      └─────────▶ Finished ──bind (reuse)──▶ Ready
//! ```

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    ActorId, Continuation, EvolutionError, EvolutionStageTable, ResourceLedger, Scheduler,
    SlimeProcess, SlimeSlotState, SlotError, SlotId,
};

#[derive(Debug, Clone)]
pub struct ProcessSlot {
    id: SlotId,
    name: String,
    state: SlimeSlotState,
    process: Option<SlimeProcess>,
    /// Set while a burst is in flight; a second advance is coalesced into a no-op.
    busy: bool,
}

/// How a finished burst left the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurstResolution {
    pub state: SlimeSlotState,
    /// New stage index on success.
    pub evolution: Result<usize, EvolutionError>,
}

impl ProcessSlot {
    pub fn new(id: SlotId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            state: SlimeSlotState::Empty,
            process: None,
            busy: false,
        }
    }

    pub fn id(&self) -> &SlotId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SlimeSlotState {
        self.state
    }

    pub fn process(&self) -> Option<&SlimeProcess> {
        self.process.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether an incubator may bind into this slot right now.
    pub fn accepts_bind(&self, allow_reuse_finished: bool) -> bool {
        match self.state {
            SlimeSlotState::Empty => true,
            SlimeSlotState::Finished => allow_reuse_finished,
            _ => false,
        }
    }

    /// Places a fresh stage-0 process of `table` in this slot.
    ///
    /// A finished predecessor is dropped outright when reuse is allowed.
    /// Returns the state the slot was in before the bind.
    pub fn bind(
        &mut self,
        table: Arc<EvolutionStageTable>,
        process_id: Uuid,
        allow_reuse_finished: bool,
    ) -> Result<SlimeSlotState, SlotError> {
        if !self.accepts_bind(allow_reuse_finished) {
            tracing::warn!(slot = %self.id, state = %self.state, "rejected bind on occupied slot");
            return Err(SlotError::InvalidSlotState { state: self.state });
        }
        let previous = self.state;
        self.process = Some(SlimeProcess::new(process_id, table));
        // New → Ready happens within the bind; nothing observes New.
        self.state = SlimeSlotState::Ready;
        Ok(previous)
    }

    /// Starts an execution burst on behalf of `actor`.
    ///
    /// Schedules the resolution at `now + burst_ticks` and returns that tick.
    pub fn advance(
        &mut self,
        actor: &ActorId,
        now: u64,
        burst_ticks: u64,
        scheduler: &mut Scheduler,
    ) -> Result<u64, SlotError> {
        if self.busy {
            return Err(SlotError::AlreadyBusy);
        }
        match self.state {
            SlimeSlotState::Empty => Err(SlotError::EmptySlot),
            SlimeSlotState::Finished => Err(SlotError::ProcessFinished),
            SlimeSlotState::Running => Err(SlotError::AlreadyBusy),
            SlimeSlotState::New | SlimeSlotState::Ready | SlimeSlotState::Waiting => {
                if self.process.is_none() {
                    self.state = SlimeSlotState::Empty;
                    return Err(SlotError::NoProcess);
                }
                let due_tick = now + burst_ticks;
                self.busy = true;
                self.state = SlimeSlotState::Running;
                scheduler.schedule(
                    due_tick,
                    Continuation::ResolveBurst {
                        slot_id: self.id.clone(),
                        actor_id: actor.clone(),
                    },
                );
                Ok(due_tick)
            }
        }
    }

    /// Ends the in-flight burst: one evolution attempt against `ledger`,
    /// then `Waiting` or `Finished`.
    ///
    /// Returns `None` when no burst is in flight.
    pub fn resolve(&mut self, ledger: &mut ResourceLedger) -> Option<BurstResolution> {
        if !self.busy || self.state != SlimeSlotState::Running {
            return None;
        }
        self.busy = false;

        let Some(process) = self.process.as_mut() else {
            self.state = SlimeSlotState::Empty;
            return None;
        };

        let evolution = process.try_advance(ledger);
        self.state = if process.is_final() {
            SlimeSlotState::Finished
        } else {
            SlimeSlotState::Waiting
        };

        Some(BurstResolution {
            state: self.state,
            evolution,
        })
    }
}
