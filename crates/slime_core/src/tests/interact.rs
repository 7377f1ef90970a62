use super::*;

fn enter(target: Interactable) -> Command {
    Command::EnterRange { target }
}

#[test]
fn entering_range_prompts_once() {
    let mut session = Session::new();
    let target = Interactable::Incubator(incubator_id());

    session.step(vec![enter(target.clone())]);
    session.step(vec![enter(target)]);

    assert_eq!(
        session.messages,
        vec!["Incubator: press E to create a new slime (New state).".to_string()]
    );
}

#[test]
fn interact_at_incubator_requests_process() {
    let mut session = Session::new();
    session.step(vec![enter(Interactable::Incubator(incubator_id()))]);

    session.step(vec![Command::Interact]);

    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Ready);
}

#[test]
fn interact_at_slot_starts_burst() {
    let mut session = Session::new();
    session.step(vec![request()]);
    session.step(vec![enter(Interactable::Slot(slot_id("slot_1")))]);
    assert_eq!(session.last_message(), "Slime base. Press E to interact.");

    session.step(vec![Command::Interact]);

    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Running);
}

#[test]
fn interact_at_empty_slot_reports() {
    let mut session = Session::new();
    session.step(vec![enter(Interactable::Slot(slot_id("slot_2")))]);

    session.step(vec![Command::Interact]);

    assert_eq!(
        session.last_message(),
        "This base is empty. Use the incubator to create a slime."
    );
    assert_eq!(session.slot("slot_2").state(), SlimeSlotState::Empty);
}

#[test]
fn leaving_range_stops_interaction() {
    let mut session = Session::new();
    let target = Interactable::Incubator(incubator_id());
    session.step(vec![enter(target.clone())]);
    let events = session.step(vec![Command::ExitRange { target }]);
    assert!(has_event(&events, |e| matches!(e, Event::ActorExitedRange { .. })));

    session.step(vec![Command::Interact]);

    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Empty);
}

#[test]
fn interact_with_nothing_in_range_is_debug_only() {
    let mut session = Session::new();
    let normal = session.step(vec![Command::Interact]);
    assert!(normal.is_empty());

    let envelope = session.command(Command::Interact);
    let debug = session.step_envelopes(&[envelope], EventLevel::Debug);
    assert!(has_event(&debug, |e| matches!(e, Event::InteractIgnored { .. })));
    assert!(session.messages.is_empty());
}

#[test]
fn enter_range_of_unknown_target_is_ignored() {
    let mut session = Session::new();
    let events = session.step(vec![enter(Interactable::Slot(slot_id("slot_nowhere")))]);
    assert!(events.is_empty());
    assert!(session.state.actors[&player()].in_range.is_empty());
}

#[test]
fn interact_reaches_incubator_then_slot_then_node() {
    let mut session = Session::new();
    session.step(vec![
        enter(Interactable::Node(node_id("node_wood_1"))),
        enter(Interactable::Slot(slot_id("slot_1"))),
        enter(Interactable::Incubator(incubator_id())),
    ]);

    let events = session.step(vec![Command::Interact]);

    // The incubator binds slot_1 before the slot handler sees it.
    assert_eq!(session.slot("slot_1").state(), SlimeSlotState::Running);
    assert_eq!(session.ledger().amount_of(ResourceKind::Wood), 2);
    let order: Vec<&str> = events
        .iter()
        .filter_map(|e| match e.event {
            Event::ProcessCreated { .. } => Some("created"),
            Event::BurstStarted { .. } => Some("burst"),
            Event::ResourceHarvested { .. } => Some("harvested"),
            _ => None,
        })
        .collect();
    assert_eq!(order, vec!["created", "burst", "harvested"]);
}
