use rand::Rng;

use crate::commands::apply_commands;
use crate::{
    ActorId, CommandEnvelope, Continuation, Counters, Event, EventEnvelope, EventLevel,
    EvolutionError, GameContent, GameState, MessageSink, ResourceLedger, SlimeSlotState, SlotId,
    StageVisual,
};

const MSG_EVOLVED_FINAL: &str = "The slime reached its final evolution (Finished)!";
const MSG_EVOLVED_WAITING: &str = "The slime evolved. It is paused (Waiting) for the next stage.";
const MSG_STARVED: &str = "Not enough resources. The slime is paused (Waiting).";

/// Everything a command handler or continuation needs besides the state.
pub(crate) struct TickContext<'a> {
    pub content: &'a GameContent,
    pub messages: &'a mut dyn MessageSink,
    pub visuals: &'a mut dyn StageVisual,
    pub events: &'a mut Vec<EventEnvelope>,
    pub event_level: EventLevel,
}

impl TickContext<'_> {
    pub fn emit(&mut self, counters: &mut Counters, tick: u64, event: Event) {
        self.events.push(crate::emit(counters, tick, event));
    }

    pub fn say(&mut self, text: impl Into<String>) {
        self.messages.enqueue_message(text.into());
    }
}

/// Advance the session by one tick.
///
/// Order of operations:
/// 1. Apply commands scheduled for this tick.
/// 2. Run continuations (burst resolutions) that are due.
/// 3. Increment tick counter.
///
/// Returns all events produced this tick.
pub fn tick(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    content: &GameContent,
    rng: &mut impl Rng,
    messages: &mut impl MessageSink,
    visuals: &mut impl StageVisual,
    event_level: EventLevel,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    let mut ctx = TickContext {
        content,
        messages,
        visuals,
        events: &mut events,
        event_level,
    };

    apply_commands(state, commands, rng, &mut ctx);
    run_due_continuations(state, &mut ctx);

    state.meta.tick += 1;
    events
}

fn run_due_continuations(state: &mut GameState, ctx: &mut TickContext<'_>) {
    let now = state.meta.tick;
    for continuation in state.scheduler.drain_due(now) {
        match continuation {
            Continuation::ResolveBurst { slot_id, actor_id } => {
                resolve_burst(state, &slot_id, &actor_id, ctx);
            }
        }
    }
}

fn resolve_burst(
    state: &mut GameState,
    slot_id: &SlotId,
    actor_id: &ActorId,
    ctx: &mut TickContext<'_>,
) {
    let now = state.meta.tick;
    let Some(slot) = state.slots.get_mut(slot_id) else {
        tracing::debug!(slot = %slot_id, "dropping burst for unknown slot");
        return;
    };

    // A burst always resolves; without its actor it resolves against nothing.
    let mut stand_in = ResourceLedger::new();
    let ledger = if let Some(actor) = state.actors.get_mut(actor_id) {
        &mut actor.ledger
    } else {
        tracing::debug!(actor = %actor_id, slot = %slot_id, "burst actor gone");
        &mut stand_in
    };

    let from = slot.state();
    let Some(resolution) = slot.resolve(ledger) else {
        return;
    };
    let Some(process) = slot.process() else {
        return;
    };
    let species = process.species().clone();
    let stage = process.current_stage().clone();

    if from != resolution.state {
        ctx.emit(
            &mut state.counters,
            now,
            Event::SlotStateChanged {
                slot_id: slot_id.clone(),
                from,
                to: resolution.state,
            },
        );
    }

    match resolution.evolution {
        Ok(stage_index) => {
            tracing::info!(slot = %slot_id, species = %species, stage = %stage.name, "slime evolved");
            ctx.visuals.set_stage_visual(slot_id, &stage.visual_tag);
            ctx.say(if resolution.state == SlimeSlotState::Finished {
                MSG_EVOLVED_FINAL
            } else {
                MSG_EVOLVED_WAITING
            });
            if state.actors.contains_key(actor_id) {
                ctx.emit(
                    &mut state.counters,
                    now,
                    Event::InventoryChanged {
                        actor_id: actor_id.clone(),
                    },
                );
            }
            ctx.emit(
                &mut state.counters,
                now,
                Event::SlimeEvolved {
                    slot_id: slot_id.clone(),
                    species,
                    stage_index,
                    stage_name: stage.name,
                },
            );
        }
        Err(EvolutionError::InsufficientResources { kind, have, need }) => {
            if resolution.state == SlimeSlotState::Waiting {
                ctx.say(MSG_STARVED);
            } else {
                ctx.say(EvolutionError::AlreadyFinal.to_string());
            }
            ctx.emit(
                &mut state.counters,
                now,
                Event::EvolutionStarved {
                    slot_id: slot_id.clone(),
                    kind,
                    have,
                    need,
                },
            );
        }
        Err(err @ EvolutionError::AlreadyFinal) => ctx.say(err.to_string()),
    }
}
