use serde::{Deserialize, Serialize};
use slime_core::{
    ActorId, Command, CommandEnvelope, CommandId, GameContent, GameState, ResourceCost,
    ResourceKind, SlimeSlotState,
};
use std::collections::BTreeMap;

pub trait CommandSource {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope>;
}

/// Allocates a command ID and builds a `CommandEnvelope`.
fn make_cmd(actor: &ActorId, tick: u64, next_id: &mut u64, command: Command) -> CommandEnvelope {
    let cmd_id = CommandId(format!("cmd_{:06}", *next_id));
    *next_id += 1;
    CommandEnvelope {
        id: cmd_id,
        issued_by: actor.clone(),
        issued_tick: tick,
        execute_at_tick: tick,
        command,
    }
}

// ---------------------------------------------------------------------------
// Resource budget
// ---------------------------------------------------------------------------

/// What the keeper still has to spend this tick, after earmarking the cost
/// of every burst already in flight.
struct Budget(BTreeMap<ResourceKind, u32>);

impl Budget {
    fn covers(&self, cost: &[ResourceCost]) -> bool {
        let mut need: BTreeMap<ResourceKind, u32> = BTreeMap::new();
        for entry in cost {
            let total = need.entry(entry.kind).or_default();
            *total = total.saturating_add(entry.amount);
        }
        need.iter()
            .all(|(kind, amount)| self.0.get(kind).copied().unwrap_or(0) >= *amount)
    }

    fn reserve(&mut self, cost: &[ResourceCost]) {
        for entry in cost {
            let have = self.0.entry(entry.kind).or_default();
            *have = have.saturating_sub(entry.amount);
        }
    }

    /// What is still missing to pay every cost in `costs`, drawing down the
    /// budget in order.
    fn shortfall(&mut self, costs: &[&[ResourceCost]]) -> BTreeMap<ResourceKind, u32> {
        let mut short: BTreeMap<ResourceKind, u32> = BTreeMap::new();
        for entry in costs.iter().flat_map(|cost| cost.iter()) {
            let have = self.0.entry(entry.kind).or_default();
            let taken = (*have).min(entry.amount);
            *have -= taken;
            let missing = short.entry(entry.kind).or_default();
            *missing = missing.saturating_add(entry.amount - taken);
        }
        short
    }
}

// ---------------------------------------------------------------------------
// KeeperAutopilot
// ---------------------------------------------------------------------------

/// Plays the slime keeper loop for one actor:
/// 1. Start a burst on every waiting slime whose next stage is affordable.
/// 2. Ask every incubator with a free base for a new slime.
/// 3. Harvest nodes for whatever the remaining slimes are short of.
pub struct KeeperAutopilot {
    actor: ActorId,
}

impl KeeperAutopilot {
    pub fn new(actor: ActorId) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    /// Advances every idle slime whose next stage fits the budget and
    /// returns the costs of the ones that do not. A slime already at its
    /// final stage costs nothing, so it is always advanced to Finished.
    fn plan_advances<'a>(
        &self,
        state: &'a GameState,
        budget: &mut Budget,
        next_id: &mut u64,
        commands: &mut Vec<CommandEnvelope>,
    ) -> Vec<&'a [ResourceCost]> {
        let mut starving = Vec::new();
        for slot in state.slots.values() {
            let Some(process) = slot.process() else {
                continue;
            };
            let idle = matches!(slot.state(), SlimeSlotState::Ready | SlimeSlotState::Waiting);
            if !idle || slot.is_busy() {
                continue;
            }
            let cost = process.current_cost();
            if !budget.covers(cost) {
                starving.push(cost);
                continue;
            }
            budget.reserve(cost);
            commands.push(make_cmd(
                &self.actor,
                state.meta.tick,
                next_id,
                Command::AdvanceSlot {
                    slot_id: slot.id().clone(),
                },
            ));
        }
        starving
    }

    fn plan_requests(
        &self,
        state: &GameState,
        next_id: &mut u64,
        commands: &mut Vec<CommandEnvelope>,
    ) {
        for incubator in state.incubators.values() {
            if incubator.find_free_slot(&state.slots).is_none() {
                continue;
            }
            commands.push(make_cmd(
                &self.actor,
                state.meta.tick,
                next_id,
                Command::RequestNewProcess {
                    incubator_id: incubator.id().clone(),
                },
            ));
        }
    }

    fn plan_harvests(
        &self,
        state: &GameState,
        mut shortfall: BTreeMap<ResourceKind, u32>,
        next_id: &mut u64,
        commands: &mut Vec<CommandEnvelope>,
    ) {
        for node in state.resource_nodes.values().filter(|n| n.is_available()) {
            let Some(short) = shortfall.get_mut(&node.kind()).filter(|short| **short > 0) else {
                continue;
            };
            *short = short.saturating_sub(node.amount_per_harvest());
            commands.push(make_cmd(
                &self.actor,
                state.meta.tick,
                next_id,
                Command::Harvest {
                    node_id: node.id().clone(),
                },
            ));
        }
    }
}

impl CommandSource for KeeperAutopilot {
    fn generate_commands(
        &mut self,
        state: &GameState,
        _content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope> {
        let Some(actor) = state.actors.get(&self.actor) else {
            return Vec::new();
        };
        let mut commands = Vec::new();

        let mut budget = Budget(actor.ledger.iter().collect());
        for slot in state.slots.values().filter(|slot| slot.is_busy()) {
            if let Some(process) = slot.process() {
                budget.reserve(process.current_cost());
            }
        }

        // Priority 1: evolve what can be paid for.
        let starving = self.plan_advances(state, &mut budget, next_command_id, &mut commands);
        // Priority 2: fill free bases.
        self.plan_requests(state, next_command_id, &mut commands);
        // Priority 3: gather for the slimes that are short.
        let shortfall = budget.shortfall(&starving);
        self.plan_harvests(state, shortfall, next_command_id, &mut commands);

        commands
    }
}

// ---------------------------------------------------------------------------
// ScriptedInput
// ---------------------------------------------------------------------------

/// One timed command in a script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_tick: u64,
    pub actor: ActorId,
    pub command: Command,
}

/// Replays a fixed list of commands. A step whose tick has already passed
/// is issued on the next call.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    steps: Vec<ScriptStep>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by_key(|step| step.at_tick);
        Self { steps, cursor: 0 }
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    pub fn remaining(&self) -> usize {
        self.steps.len() - self.cursor
    }
}

impl CommandSource for ScriptedInput {
    fn generate_commands(
        &mut self,
        state: &GameState,
        _content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope> {
        let tick = state.meta.tick;
        let mut commands = Vec::new();
        while let Some(step) = self.steps.get(self.cursor) {
            if step.at_tick > tick {
                break;
            }
            commands.push(make_cmd(
                &step.actor,
                tick,
                next_command_id,
                step.command.clone(),
            ));
            self.cursor += 1;
        }
        commands
    }
}
