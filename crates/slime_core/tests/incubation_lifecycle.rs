//! Harvest, incubate and evolve one slime to its final stage through the
//! public tick API only.

use slime_core::test_fixtures::{base_content, base_state, make_rng, INCUBATOR, PLAYER};
use slime_core::{
    tick, ActorId, Command, CommandEnvelope, CommandId, Event, EventEnvelope, EventLevel,
    IncubatorId, Interactable, MessagePanel, MessageSink, NodeId, ResourceKind, SlimeSlotState,
    SlotId, VisualBoard, VisualTag,
};

fn envelope(n: u64, tick: u64, command: Command) -> CommandEnvelope {
    CommandEnvelope {
        id: CommandId(format!("cmd_{n:06}")),
        issued_by: ActorId(PLAYER.to_string()),
        issued_tick: tick,
        execute_at_tick: tick,
        command,
    }
}

fn node(id: &str) -> Interactable {
    Interactable::Node(NodeId(id.to_string()))
}

#[test]
fn goober_grows_from_egg_to_adult() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = make_rng();
    let mut messages: Vec<String> = Vec::new();
    let mut visuals = VisualBoard::default();
    let slot = SlotId("slot_1".to_string());
    let incubator = Interactable::Incubator(IncubatorId(INCUBATOR.to_string()));

    // Walk past each node Goober needs and press E once at each, then use
    // the incubator and step up to the first base.
    let mut script: Vec<Command> = Vec::new();
    for id in ["node_wood_1", "node_goo_1", "node_mushroom_1"] {
        script.push(Command::EnterRange { target: node(id) });
        script.push(Command::Interact);
        script.push(Command::ExitRange { target: node(id) });
    }
    script.push(Command::EnterRange {
        target: incubator.clone(),
    });
    script.push(Command::Interact);
    script.push(Command::ExitRange { target: incubator });
    script.push(Command::EnterRange {
        target: Interactable::Slot(slot.clone()),
    });

    let mut events: Vec<EventEnvelope> = Vec::new();
    let mut n = 0;
    for command in script {
        let batch = [envelope(n, state.meta.tick, command)];
        n += 1;
        events.extend(tick(
            &mut state,
            &batch,
            &content,
            &mut rng,
            &mut messages,
            &mut visuals,
            EventLevel::Normal,
        ));
    }
    assert_eq!(state.slots[&slot].state(), SlimeSlotState::Ready);

    // Press E at the base whenever it is idle until the slime stops evolving.
    while state.slots[&slot].state() != SlimeSlotState::Finished {
        assert!(state.meta.tick < 200, "slime never finished");
        let batch = if state.slots[&slot].is_busy() {
            Vec::new()
        } else {
            n += 1;
            vec![envelope(n, state.meta.tick, Command::Interact)]
        };
        events.extend(tick(
            &mut state,
            &batch,
            &content,
            &mut rng,
            &mut messages,
            &mut visuals,
            EventLevel::Normal,
        ));
    }

    let evolved: Vec<usize> = events
        .iter()
        .filter_map(|e| match e.event {
            Event::SlimeEvolved { stage_index, .. } => Some(stage_index),
            _ => None,
        })
        .collect();
    assert_eq!(evolved, vec![1, 2]);
    assert!(!events
        .iter()
        .any(|e| matches!(e.event, Event::EvolutionStarved { .. })));

    let ledger = &state.actors[&ActorId(PLAYER.to_string())].ledger;
    for kind in ResourceKind::ALL {
        assert_eq!(ledger.amount_of(kind), 0, "{kind} left over");
    }
    assert_eq!(
        visuals.active(&slot),
        Some(&VisualTag("model_goober_adult".to_string()))
    );
    assert_eq!(
        messages.last().map(String::as_str),
        Some("The slime reached its final evolution (Finished)!")
    );

    // Every message queued during the run is eventually shown.
    let mut panel = MessagePanel::new(content.constants.message_display_ticks);
    let total = messages.len();
    for text in messages.drain(..) {
        panel.enqueue_message(text);
    }
    let mut shown = 0;
    let mut now = 0;
    while !panel.is_idle() {
        let pending = panel.pending();
        panel.update(now);
        if panel.pending() < pending {
            shown += 1;
        }
        now += 1;
    }
    assert_eq!(shown, total);
}
