//! `slime_core` — slime incubation and evolution as a deterministic tick.
//!
//! No IO, no engine. All randomness via the passed-in Rng, all player-facing
//! text via the passed-in `MessageSink`.

mod commands;
mod engine;
mod error;
mod evolution;
pub mod hud;
mod id;
mod incubator;
mod ledger;
mod messages;
mod node;
mod scheduler;
mod slot;
#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;
mod types;

pub use engine::tick;
pub use error::{ContentError, EvolutionError, IncubatorError, LedgerError, SlotError};
pub use evolution::{EvolutionStageTable, SlimeProcess};
pub use id::new_process_id;
pub use incubator::{IncubatorStation, ProcessCreated};
pub use ledger::ResourceLedger;
pub use messages::{MessagePanel, MessageSink, NullVisual, StageVisual, VisualBoard};
pub use node::ResourceNode;
pub use scheduler::{Continuation, Scheduler};
pub use slot::{BurstResolution, ProcessSlot};
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

#[cfg(test)]
mod tests;
