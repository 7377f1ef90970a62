use super::*;

#[test]
fn request_binds_first_species_into_first_slot() {
    let mut session = Session::new();

    let events = session.step(vec![request()]);

    let slot = session.slot("slot_1");
    assert_eq!(slot.state(), SlimeSlotState::Ready);
    assert_eq!(slot.process().unwrap().stage_index(), 0);
    assert_eq!(
        slot.process().unwrap().species(),
        &SpeciesId("species_goober".to_string())
    );
    assert!(has_event(&events, |e| matches!(
        e,
        Event::SlotStateChanged {
            from: SlimeSlotState::Empty,
            to: SlimeSlotState::Ready,
            ..
        }
    )));
    assert_eq!(
        session.last_message(),
        "New process created in Base 1 with slime 'Goober'. State: New → Ready."
    );
    assert_eq!(
        session.visuals.active(&slot_id("slot_1")),
        Some(&VisualTag("model_goober_egg".to_string()))
    );
}

#[test]
fn starved_burst_waits_and_leaves_ledger_alone() {
    let mut session = Session::new();
    session.step(vec![request()]);
    let before: Vec<_> = session.ledger().iter().collect();

    let events = session.step(vec![advance("slot_1")]);
    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Running);
    assert!(has_event(&events, |e| matches!(e, Event::BurstStarted { .. })));

    let events = session.idle(session.content.constants.burst_ticks);

    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Waiting);
    assert_eq!(session.ledger().iter().collect::<Vec<_>>(), before);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::EvolutionStarved {
            kind: ResourceKind::Wood,
            have: 0,
            need: 2,
            ..
        }
    )));
    assert_eq!(
        session.last_message(),
        "Not enough resources. The slime is paused (Waiting)."
    );
}

#[test]
fn burst_into_last_stage_finishes_and_spends() {
    let mut content = base_content();
    content.species[0] = test_fixtures::species(
        "species_goober",
        "Goober",
        vec![
            test_fixtures::stage("goober_egg", &[(ResourceKind::Wood, 2)]),
            test_fixtures::stage("goober_adult", &[]),
        ],
    );
    let mut session = Session::with_content(content);
    session.ledger_mut().add(ResourceKind::Wood, 5);
    session.step(vec![request()]);

    session.step(vec![advance("slot_1")]);
    let events = session.idle(session.content.constants.burst_ticks);

    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Finished);
    assert_eq!(session.ledger().amount_of(ResourceKind::Wood), 3);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::SlimeEvolved { stage_index: 1, .. }
    )));
    assert_eq!(
        session.visuals.active(&slot_id("slot_1")),
        Some(&VisualTag("model_goober_adult".to_string()))
    );
    assert_eq!(
        session.last_message(),
        "The slime reached its final evolution (Finished)!"
    );
}

#[test]
fn second_advance_during_burst_is_coalesced() {
    let mut session = Session::new();
    session.step(vec![request()]);
    session.step(vec![advance("slot_1")]);

    let events = session.step(vec![advance("slot_1")]);

    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Running);
    assert_eq!(session.state.scheduler.pending_for_slot(&slot_id("slot_1")), 1);
    assert!(has_event(&events, |e| matches!(e, Event::AdvanceRejected { .. })));
    assert_eq!(session.last_message(), "This base is already running (Running).");
}

#[test]
fn burst_resolves_exactly_at_due_tick() {
    let mut session = Session::new();
    session.step(vec![request()]);
    let events = session.step(vec![advance("slot_1")]);
    let due = events
        .iter()
        .find_map(|e| match e.event {
            Event::BurstStarted { due_tick, .. } => Some(due_tick),
            _ => None,
        })
        .unwrap();

    while session.state.meta.tick < due {
        session.step(vec![]);
        assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Running);
    }
    session.step(vec![]);
    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Waiting);
}

#[test]
fn full_goober_evolution_through_waiting() {
    let mut session = Session::new();
    let burst = session.content.constants.burst_ticks;
    session.step(vec![request()]);

    session.ledger_mut().add(ResourceKind::Wood, 2);
    session.step(vec![advance("slot_1")]);
    session.idle(burst);
    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Waiting);
    assert_eq!(session.slot("slot_1").process().unwrap().stage_index(), 1);
    assert_eq!(
        session.last_message(),
        "The slime evolved. It is paused (Waiting) for the next stage."
    );

    session.ledger_mut().add(ResourceKind::SlimeGoo, 1);
    session.ledger_mut().add(ResourceKind::Mushroom, 1);
    session.step(vec![advance("slot_1")]);
    session.idle(burst);
    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Finished);

    let events = session.step(vec![advance("slot_1")]);
    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Finished);
    assert!(has_event(&events, |e| matches!(e, Event::AdvanceRejected { .. })));
}

#[test]
fn bursts_on_different_slots_are_independent() {
    let mut session = Session::new();
    let burst = session.content.constants.burst_ticks;
    session.step(vec![request(), request()]);
    session.ledger_mut().add(ResourceKind::Leaves, 2);

    session.step(vec![advance("slot_1")]);
    session.step(vec![advance("slot_2")]);
    session.idle(burst - 1);

    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Waiting);
    assert_eq!(session.slot("slot_2").state(), SlimeSlotState::Running);

    session.idle(1);
    assert_eq!(session.slot("slot_2").state(), SlimeSlotState::Finished);
    assert_eq!(session.ledger().amount_of(ResourceKind::Leaves), 0);
}

#[test]
fn event_ids_are_sequential() {
    let mut session = Session::new();
    let mut events = session.step(vec![request()]);
    events.extend(session.step(vec![advance("slot_1")]));
    let ids: Vec<&str> = events.iter().map(|e| e.id.0.as_str()).collect();
    assert_eq!(ids, vec!["evt_000000", "evt_000001", "evt_000002", "evt_000003"]);
}

#[test]
fn commands_for_other_ticks_are_ignored() {
    let mut session = Session::new();
    let mut envelope = session.command(request());
    envelope.execute_at_tick = 5;

    session.step_envelopes(&[envelope], EventLevel::Normal);

    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Empty);
}

#[test]
fn commands_from_unknown_actors_are_ignored() {
    let mut session = Session::new();
    let mut envelope = session.command(request());
    envelope.issued_by = ActorId("actor_ghost".to_string());

    let events = session.step_envelopes(&[envelope], EventLevel::Normal);

    assert!(events.is_empty());
    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Empty);
}

#[test]
fn burst_whose_actor_vanished_resolves_against_nothing() {
    let mut session = Session::new();
    session.ledger_mut().add(ResourceKind::Wood, 2);
    session.step(vec![request()]);
    session.step(vec![advance("slot_1")]);

    session.state.actors.remove(&player());
    let events = session.idle(session.content.constants.burst_ticks);

    let slot = session.slot("slot_1");
    assert_eq!(slot.state(), SlimeSlotState::Waiting);
    assert!(!slot.is_busy());
    assert_eq!(slot.process().unwrap().stage_index(), 0);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::EvolutionStarved {
            kind: ResourceKind::Wood,
            have: 0,
            ..
        }
    )));
    assert!(!has_event(&events, |e| matches!(e, Event::InventoryChanged { .. })));
}

#[test]
fn burst_whose_slot_vanished_is_dropped() {
    let mut session = Session::new();
    session.step(vec![request()]);
    session.step(vec![advance("slot_1")]);

    session.state.slots.remove(&slot_id("slot_1"));
    let events = session.idle(session.content.constants.burst_ticks);

    assert!(events.is_empty());
    assert_eq!(session.state.scheduler.len(), 0);
}
