use rand::Rng;

use crate::engine::TickContext;
use crate::{
    ActorId, Command, CommandEnvelope, Event, EventLevel, GameState, IncubatorId, Interactable,
    NodeId, SlotId,
};

const MSG_INCUBATOR_PROMPT: &str = "Incubator: press E to create a new slime (New state).";
const MSG_SLOT_PROMPT: &str = "Slime base. Press E to interact.";
const MSG_BURST_STARTED: &str = "Slime running (Running)...";

pub(crate) fn apply_commands(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    rng: &mut impl Rng,
    ctx: &mut TickContext<'_>,
) {
    let current_tick = state.meta.tick;

    for envelope in commands {
        if envelope.execute_at_tick != current_tick {
            continue;
        }
        let actor_id = &envelope.issued_by;
        if !state.actors.contains_key(actor_id) {
            tracing::debug!(actor = %actor_id, command = %envelope.id, "ignoring command from unknown actor");
            continue;
        }
        match &envelope.command {
            Command::EnterRange { target } => handle_enter_range(state, actor_id, target, ctx),
            Command::ExitRange { target } => handle_exit_range(state, actor_id, target, ctx),
            Command::Interact => handle_interact(state, actor_id, rng, ctx),
            Command::RequestNewProcess { incubator_id } => {
                handle_request_new_process(state, incubator_id, rng, ctx);
            }
            Command::AdvanceSlot { slot_id } => handle_advance_slot(state, actor_id, slot_id, ctx),
            Command::Harvest { node_id } => handle_harvest(state, actor_id, node_id, ctx),
        }
    }
}

fn target_exists(state: &GameState, target: &Interactable) -> bool {
    match target {
        Interactable::Incubator(id) => state.incubators.contains_key(id),
        Interactable::Slot(id) => state.slots.contains_key(id),
        Interactable::Node(id) => state.resource_nodes.contains_key(id),
    }
}

fn range_prompt(state: &GameState, target: &Interactable) -> Option<String> {
    match target {
        Interactable::Incubator(_) => Some(MSG_INCUBATOR_PROMPT.to_string()),
        Interactable::Slot(_) => Some(MSG_SLOT_PROMPT.to_string()),
        Interactable::Node(id) => state
            .resource_nodes
            .get(id)
            .filter(|node| node.is_available())
            .map(|node| format!("You are near {}. Press E to harvest.", node.kind())),
    }
}

fn handle_enter_range(
    state: &mut GameState,
    actor_id: &ActorId,
    target: &Interactable,
    ctx: &mut TickContext<'_>,
) {
    if !target_exists(state, target) {
        tracing::debug!(actor = %actor_id, %target, "enter range for unknown target");
        return;
    }
    let Some(actor) = state.actors.get_mut(actor_id) else {
        return;
    };
    if !actor.in_range.insert(target.clone()) {
        return;
    }
    if let Some(prompt) = range_prompt(state, target) {
        ctx.say(prompt);
    }
    ctx.emit(
        &mut state.counters,
        state.meta.tick,
        Event::ActorEnteredRange {
            actor_id: actor_id.clone(),
            target: target.clone(),
        },
    );
}

fn handle_exit_range(
    state: &mut GameState,
    actor_id: &ActorId,
    target: &Interactable,
    ctx: &mut TickContext<'_>,
) {
    let Some(actor) = state.actors.get_mut(actor_id) else {
        return;
    };
    if !actor.in_range.remove(target) {
        return;
    }
    ctx.emit(
        &mut state.counters,
        state.meta.tick,
        Event::ActorExitedRange {
            actor_id: actor_id.clone(),
            target: target.clone(),
        },
    );
}

fn handle_interact(
    state: &mut GameState,
    actor_id: &ActorId,
    rng: &mut impl Rng,
    ctx: &mut TickContext<'_>,
) {
    let targets: Vec<Interactable> = state
        .actors
        .get(actor_id)
        .map(|actor| actor.in_range.iter().cloned().collect())
        .unwrap_or_default();

    if targets.is_empty() {
        if ctx.event_level == EventLevel::Debug {
            ctx.emit(
                &mut state.counters,
                state.meta.tick,
                Event::InteractIgnored {
                    actor_id: actor_id.clone(),
                },
            );
        }
        return;
    }

    for target in targets {
        match target {
            Interactable::Incubator(id) => handle_request_new_process(state, &id, rng, ctx),
            Interactable::Slot(id) => handle_advance_slot(state, actor_id, &id, ctx),
            Interactable::Node(id) => handle_harvest(state, actor_id, &id, ctx),
        }
    }
}

fn handle_request_new_process(
    state: &mut GameState,
    incubator_id: &IncubatorId,
    rng: &mut impl Rng,
    ctx: &mut TickContext<'_>,
) {
    let now = state.meta.tick;
    let Some(incubator) = state.incubators.get_mut(incubator_id) else {
        tracing::debug!(incubator = %incubator_id, "request for unknown incubator");
        return;
    };

    match incubator.request_new_process(&mut state.slots, rng) {
        Ok(created) => {
            if let Some(process) = state.slots.get(&created.slot_id).and_then(|s| s.process()) {
                ctx.visuals
                    .set_stage_visual(&created.slot_id, &process.current_stage().visual_tag);
            }
            ctx.say(created.to_string());
            ctx.emit(
                &mut state.counters,
                now,
                Event::ProcessCreated {
                    incubator_id: incubator_id.clone(),
                    slot_id: created.slot_id.clone(),
                    species: created.species,
                    process_id: created.process_id,
                },
            );
            ctx.emit(
                &mut state.counters,
                now,
                Event::SlotStateChanged {
                    slot_id: created.slot_id,
                    from: created.previous_state,
                    to: crate::SlimeSlotState::Ready,
                },
            );
        }
        Err(err) => {
            ctx.say(err.to_string());
            ctx.emit(
                &mut state.counters,
                now,
                Event::IncubationRejected {
                    incubator_id: incubator_id.clone(),
                    reason: err.to_string(),
                },
            );
        }
    }
}

fn handle_advance_slot(
    state: &mut GameState,
    actor_id: &ActorId,
    slot_id: &SlotId,
    ctx: &mut TickContext<'_>,
) {
    let now = state.meta.tick;
    let burst_ticks = ctx.content.constants.burst_ticks;
    let Some(slot) = state.slots.get_mut(slot_id) else {
        tracing::debug!(slot = %slot_id, "advance for unknown slot");
        return;
    };

    let from = slot.state();
    let result = slot.advance(actor_id, now, burst_ticks, &mut state.scheduler);
    let to = slot.state();

    if from != to {
        ctx.emit(
            &mut state.counters,
            now,
            Event::SlotStateChanged {
                slot_id: slot_id.clone(),
                from,
                to,
            },
        );
    }

    match result {
        Ok(due_tick) => {
            ctx.say(MSG_BURST_STARTED);
            ctx.emit(
                &mut state.counters,
                now,
                Event::BurstStarted {
                    slot_id: slot_id.clone(),
                    actor_id: actor_id.clone(),
                    due_tick,
                },
            );
        }
        Err(err) => {
            ctx.say(err.to_string());
            ctx.emit(
                &mut state.counters,
                now,
                Event::AdvanceRejected {
                    slot_id: slot_id.clone(),
                    reason: err.to_string(),
                },
            );
        }
    }
}

fn handle_harvest(
    state: &mut GameState,
    actor_id: &ActorId,
    node_id: &NodeId,
    ctx: &mut TickContext<'_>,
) {
    let now = state.meta.tick;
    let Some(node) = state.resource_nodes.get_mut(node_id) else {
        tracing::debug!(node = %node_id, "harvest for unknown node");
        return;
    };
    let Some(actor) = state.actors.get_mut(actor_id) else {
        return;
    };
    let Some(amount) = node.harvest(&mut actor.ledger) else {
        tracing::debug!(node = %node_id, "node already harvested");
        return;
    };
    let kind = node.kind();
    let destroyed = node.destroy_on_harvest();

    ctx.say(format!("Harvested {amount} of {kind}."));
    ctx.emit(
        &mut state.counters,
        now,
        Event::ResourceHarvested {
            actor_id: actor_id.clone(),
            node_id: node_id.clone(),
            kind,
            amount,
        },
    );
    ctx.emit(
        &mut state.counters,
        now,
        Event::InventoryChanged {
            actor_id: actor_id.clone(),
        },
    );
    ctx.emit(
        &mut state.counters,
        now,
        Event::ResourceNodeDepleted {
            node_id: node_id.clone(),
            destroyed,
        },
    );

    if destroyed {
        state.resource_nodes.remove(node_id);
        let target = Interactable::Node(node_id.clone());
        for actor in state.actors.values_mut() {
            actor.in_range.remove(&target);
        }
    }
}
