//! Shared test fixtures for `slime_core` and downstream crates.
//!
//! `base_content()` is a small but complete catalog: two species, two slots,
//! one sequential incubator, a handful of resource nodes and one player.

use crate::{
    ActorId, ActorState, Constants, Counters, EvolutionStage, EvolutionStageTable, GameContent,
    GameState, IncubatorDef, IncubatorId, IncubatorStation, MetaState, NodeId, ProcessSlot,
    ResourceCost, ResourceKind, ResourceNode, ResourceNodeDef, Scheduler, SlotDef, SlotId,
    SpawnMode, SpeciesId, VisualTag,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const PLAYER: &str = "actor_player";
pub const INCUBATOR: &str = "incubator_main";

pub fn stage(name: &str, cost: &[(ResourceKind, u32)]) -> EvolutionStage {
    EvolutionStage {
        name: name.to_string(),
        visual_tag: VisualTag(format!("model_{name}")),
        cost: cost
            .iter()
            .map(|(kind, amount)| ResourceCost {
                kind: *kind,
                amount: *amount,
            })
            .collect(),
    }
}

pub fn species(id: &str, name: &str, stages: Vec<EvolutionStage>) -> Arc<EvolutionStageTable> {
    Arc::new(
        EvolutionStageTable::new(SpeciesId(id.to_string()), name, stages)
            .expect("fixture species has stages"),
    )
}

fn node(id: &str, kind: ResourceKind, amount: u32, destroy: bool) -> ResourceNodeDef {
    ResourceNodeDef {
        id: NodeId(id.to_string()),
        kind,
        amount_per_harvest: amount,
        destroy_on_harvest: destroy,
    }
}

/// Goober: egg (Wood 2) → blob (Slime Goo 1, Mushroom 1) → goober.
/// Mossling: sprout (Leaves 2) → mossling.
/// Burst takes 3 ticks.
pub fn base_content() -> GameContent {
    GameContent {
        content_version: "test".to_string(),
        species: vec![
            species(
                "species_goober",
                "Goober",
                vec![
                    stage("goober_egg", &[(ResourceKind::Wood, 2)]),
                    stage(
                        "goober_blob",
                        &[(ResourceKind::SlimeGoo, 1), (ResourceKind::Mushroom, 1)],
                    ),
                    stage("goober_adult", &[]),
                ],
            ),
            species(
                "species_mossling",
                "Mossling",
                vec![
                    stage("mossling_sprout", &[(ResourceKind::Leaves, 2)]),
                    stage("mossling_adult", &[]),
                ],
            ),
        ],
        slots: vec![
            SlotDef {
                id: SlotId("slot_1".to_string()),
                name: "Base 1".to_string(),
            },
            SlotDef {
                id: SlotId("slot_2".to_string()),
                name: "Base 2".to_string(),
            },
        ],
        incubators: vec![IncubatorDef {
            id: IncubatorId(INCUBATOR.to_string()),
            species: vec![
                SpeciesId("species_goober".to_string()),
                SpeciesId("species_mossling".to_string()),
            ],
            slots: vec![SlotId("slot_1".to_string()), SlotId("slot_2".to_string())],
            spawn_mode: SpawnMode::Sequential,
            sequential_start_index: 0,
            allow_reuse_finished: false,
        }],
        resource_nodes: vec![
            node("node_wood_1", ResourceKind::Wood, 2, true),
            node("node_wood_2", ResourceKind::Wood, 2, true),
            node("node_goo_1", ResourceKind::SlimeGoo, 1, false),
            node("node_mushroom_1", ResourceKind::Mushroom, 1, true),
            node("node_leaves_1", ResourceKind::Leaves, 2, true),
        ],
        actors: vec![ActorId(PLAYER.to_string())],
        constants: Constants {
            burst_ticks: 3,
            message_display_ticks: 4,
            ticks_per_second: 10,
        },
    }
}

/// Fresh session for `content`: every slot Empty, every ledger empty.
pub fn base_state(content: &GameContent) -> GameState {
    let incubators = content
        .incubators
        .iter()
        .map(|def| {
            let catalog = def
                .species
                .iter()
                .filter_map(|id| content.species(id).cloned())
                .collect();
            (def.id.clone(), IncubatorStation::from_def(def, catalog))
        })
        .collect();

    GameState {
        meta: MetaState {
            tick: 0,
            seed: 0,
            content_version: content.content_version.clone(),
        },
        actors: content
            .actors
            .iter()
            .map(|id| (id.clone(), ActorState::new(id.clone())))
            .collect(),
        slots: content
            .slots
            .iter()
            .map(|def| (def.id.clone(), ProcessSlot::new(def.id.clone(), &def.name)))
            .collect(),
        incubators,
        resource_nodes: content
            .resource_nodes
            .iter()
            .map(|def| (def.id.clone(), ResourceNode::from_def(def)))
            .collect::<BTreeMap<_, _>>(),
        scheduler: Scheduler::new(),
        counters: Counters::default(),
    }
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
