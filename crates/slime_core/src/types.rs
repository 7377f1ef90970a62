//! Type definitions for `slime_core`.
//!
//! ID newtypes, enums, authored content, session state, commands and events.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

use crate::{
    EvolutionStageTable, IncubatorStation, ProcessSlot, ResourceLedger, ResourceNode, Scheduler,
};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(ActorId);
string_id!(SlotId);
string_id!(IncubatorId);
string_id!(NodeId);
string_id!(SpeciesId);
string_id!(CommandId);
string_id!(EventId);
string_id!(VisualTag);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// Harvestable material tags. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    SlimeGoo,
    Wood,
    Mushroom,
    Flower,
    Rock,
    Leaves,
    Ivy,
    MoldyWood,
    Roots,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::SlimeGoo,
        ResourceKind::Wood,
        ResourceKind::Mushroom,
        ResourceKind::Flower,
        ResourceKind::Rock,
        ResourceKind::Leaves,
        ResourceKind::Ivy,
        ResourceKind::MoldyWood,
        ResourceKind::Roots,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ResourceKind::SlimeGoo => "Slime Goo",
            ResourceKind::Wood => "Wood",
            ResourceKind::Mushroom => "Mushrooms",
            ResourceKind::Flower => "Flowers",
            ResourceKind::Rock => "Rock",
            ResourceKind::Leaves => "Leaves",
            ResourceKind::Ivy => "Ivy",
            ResourceKind::MoldyWood => "Moldy Wood",
            ResourceKind::Roots => "Roots",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Lifecycle of a process slot, modeled on OS process states.
///
/// `New` is never observed at rest: a bind passes through it on the way to
/// `Ready`. It is kept so the state set matches the scheduling model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SlimeSlotState {
    #[default]
    Empty,
    New,
    Ready,
    Running,
    Waiting,
    Finished,
}

impl std::fmt::Display for SlimeSlotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SlimeSlotState::Empty => "Empty",
            SlimeSlotState::New => "New",
            SlimeSlotState::Ready => "Ready",
            SlimeSlotState::Running => "Running",
            SlimeSlotState::Waiting => "Waiting",
            SlimeSlotState::Finished => "Finished",
        };
        f.write_str(name)
    }
}

/// How an incubator picks the next species from its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnMode {
    #[default]
    Sequential,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

/// Something an actor can stand next to and press interact on.
///
/// Ordering (incubators, then slots, then nodes) is the dispatch order
/// for `Command::Interact`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Interactable {
    Incubator(IncubatorId),
    Slot(SlotId),
    Node(NodeId),
}

impl std::fmt::Display for Interactable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interactable::Incubator(id) => write!(f, "incubator {id}"),
            Interactable::Slot(id) => write!(f, "slot {id}"),
            Interactable::Node(id) => write!(f, "node {id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCost {
    pub kind: ResourceKind,
    pub amount: u32,
}

pub type CostList = SmallVec<[ResourceCost; 4]>;

/// One step of a species' evolution. `cost` is what it takes to leave it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStage {
    pub name: String,
    pub visual_tag: VisualTag,
    #[serde(default)]
    pub cost: CostList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContent {
    pub content_version: String,
    pub species: Vec<Arc<EvolutionStageTable>>,
    pub slots: Vec<SlotDef>,
    pub incubators: Vec<IncubatorDef>,
    pub resource_nodes: Vec<ResourceNodeDef>,
    pub actors: Vec<ActorId>,
    pub constants: Constants,
}

impl GameContent {
    pub fn species(&self, id: &SpeciesId) -> Option<&Arc<EvolutionStageTable>> {
        self.species.iter().find(|table| table.id() == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDef {
    pub id: SlotId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncubatorDef {
    pub id: IncubatorId,
    pub species: Vec<SpeciesId>,
    /// Binding order: the first free slot in this list wins.
    pub slots: Vec<SlotId>,
    #[serde(default)]
    pub spawn_mode: SpawnMode,
    #[serde(default)]
    pub sequential_start_index: usize,
    #[serde(default)]
    pub allow_reuse_finished: bool,
}

fn default_amount_per_harvest() -> u32 {
    1
}

fn default_destroy_on_harvest() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceNodeDef {
    pub id: NodeId,
    pub kind: ResourceKind,
    #[serde(default = "default_amount_per_harvest")]
    pub amount_per_harvest: u32,
    #[serde(default = "default_destroy_on_harvest")]
    pub destroy_on_harvest: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    /// Ticks a slot spends in `Running` before the evolution attempt resolves.
    pub burst_ticks: u64,
    /// Ticks each message stays on the message panel.
    pub message_display_ticks: u64,
    /// Host loop rate; only the CLI uses it to pace real time.
    pub ticks_per_second: u32,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GameState {
    pub meta: MetaState,
    pub actors: BTreeMap<ActorId, ActorState>,
    /// Slots are placed by the world, not owned by any incubator.
    pub slots: BTreeMap<SlotId, ProcessSlot>,
    pub incubators: BTreeMap<IncubatorId, IncubatorStation>,
    pub resource_nodes: BTreeMap<NodeId, ResourceNode>,
    pub scheduler: Scheduler,
    pub counters: Counters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub tick: u64,
    pub seed: u64,
    pub content_version: String,
}

#[derive(Debug, Clone)]
pub struct ActorState {
    pub id: ActorId,
    pub ledger: ResourceLedger,
    pub in_range: BTreeSet<Interactable>,
}

impl ActorState {
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            ledger: ResourceLedger::new(),
            in_range: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_command_id: u64,
}

// ---------------------------------------------------------------------------
// Command types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: CommandId,
    pub issued_by: ActorId,
    pub issued_tick: u64,
    pub execute_at_tick: u64,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    EnterRange { target: Interactable },
    ExitRange { target: Interactable },
    /// One interact press, dispatched to everything the actor is in range of.
    Interact,
    RequestNewProcess { incubator_id: IncubatorId },
    AdvanceSlot { slot_id: SlotId },
    Harvest { node_id: NodeId },
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ActorEnteredRange {
        actor_id: ActorId,
        target: Interactable,
    },
    ActorExitedRange {
        actor_id: ActorId,
        target: Interactable,
    },
    ResourceHarvested {
        actor_id: ActorId,
        node_id: NodeId,
        kind: ResourceKind,
        amount: u32,
    },
    ResourceNodeDepleted {
        node_id: NodeId,
        destroyed: bool,
    },
    InventoryChanged {
        actor_id: ActorId,
    },
    ProcessCreated {
        incubator_id: IncubatorId,
        slot_id: SlotId,
        species: SpeciesId,
        process_id: Uuid,
    },
    IncubationRejected {
        incubator_id: IncubatorId,
        reason: String,
    },
    SlotStateChanged {
        slot_id: SlotId,
        from: SlimeSlotState,
        to: SlimeSlotState,
    },
    BurstStarted {
        slot_id: SlotId,
        actor_id: ActorId,
        due_tick: u64,
    },
    AdvanceRejected {
        slot_id: SlotId,
        reason: String,
    },
    SlimeEvolved {
        slot_id: SlotId,
        species: SpeciesId,
        stage_index: usize,
        stage_name: String,
    },
    EvolutionStarved {
        slot_id: SlotId,
        kind: ResourceKind,
        have: u32,
        need: u32,
    },
    /// Only emitted at `EventLevel::Debug`.
    InteractIgnored {
        actor_id: ActorId,
    },
}
