use super::*;
use crate::test_fixtures::{base_content, base_state, make_rng, INCUBATOR, PLAYER};
use rand_chacha::ChaCha8Rng;

mod interact;
mod lifecycle;

// --- Shared test helpers ------------------------------------------------

/// A session plus the host-side sinks a tick writes into.
struct Session {
    content: GameContent,
    state: GameState,
    rng: ChaCha8Rng,
    messages: Vec<String>,
    visuals: VisualBoard,
    next_command_id: u64,
}

impl Session {
    fn new() -> Self {
        Self::with_content(base_content())
    }

    fn with_content(content: GameContent) -> Self {
        let state = base_state(&content);
        Self {
            content,
            state,
            rng: make_rng(),
            messages: Vec::new(),
            visuals: VisualBoard::default(),
            next_command_id: 0,
        }
    }

    fn command(&mut self, command: Command) -> CommandEnvelope {
        let id = CommandId(format!("cmd_{:06}", self.next_command_id));
        self.next_command_id += 1;
        CommandEnvelope {
            id,
            issued_by: player(),
            issued_tick: self.state.meta.tick,
            execute_at_tick: self.state.meta.tick,
            command,
        }
    }

    /// Runs one tick with the given commands issued by the player.
    fn step(&mut self, commands: Vec<Command>) -> Vec<EventEnvelope> {
        let envelopes: Vec<CommandEnvelope> =
            commands.into_iter().map(|c| self.command(c)).collect();
        self.step_envelopes(&envelopes, EventLevel::Normal)
    }

    fn step_envelopes(
        &mut self,
        envelopes: &[CommandEnvelope],
        event_level: EventLevel,
    ) -> Vec<EventEnvelope> {
        tick(
            &mut self.state,
            envelopes,
            &self.content,
            &mut self.rng,
            &mut self.messages,
            &mut self.visuals,
            event_level,
        )
    }

    /// Runs `n` empty ticks and returns every event they produced.
    fn idle(&mut self, n: u64) -> Vec<EventEnvelope> {
        (0..n).flat_map(|_| self.step(vec![])).collect()
    }

    fn slot(&self, id: &str) -> &ProcessSlot {
        &self.state.slots[&slot_id(id)]
    }

    fn ledger(&self) -> &ResourceLedger {
        &self.state.actors[&player()].ledger
    }

    fn ledger_mut(&mut self) -> &mut ResourceLedger {
        &mut self.state.actors.get_mut(&player()).unwrap().ledger
    }

    fn last_message(&self) -> &str {
        self.messages.last().map_or("", String::as_str)
    }
}

fn player() -> ActorId {
    ActorId(PLAYER.to_string())
}

fn incubator_id() -> IncubatorId {
    IncubatorId(INCUBATOR.to_string())
}

fn slot_id(id: &str) -> SlotId {
    SlotId(id.to_string())
}

fn node_id(id: &str) -> NodeId {
    NodeId(id.to_string())
}

fn request() -> Command {
    Command::RequestNewProcess {
        incubator_id: incubator_id(),
    }
}

fn advance(slot: &str) -> Command {
    Command::AdvanceSlot {
        slot_id: slot_id(slot),
    }
}

fn has_event(events: &[EventEnvelope], pred: impl Fn(&Event) -> bool) -> bool {
    events.iter().any(|e| pred(&e.event))
}
