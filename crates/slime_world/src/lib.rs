//! Content loading and world setup shared by `slime_cli` and the test suites.

use anyhow::{bail, ensure, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use slime_core::{
    ActorId, ActorState, Constants, Counters, EvolutionStageTable, GameContent, GameState,
    IncubatorDef, IncubatorStation, MetaState, ProcessSlot, ResourceNode, ResourceNodeDef,
    Scheduler, SlotDef,
};
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use std::path::Path;
use std::sync::Arc;

#[derive(Deserialize)]
struct SpeciesFile {
    content_version: String,
    species: Vec<EvolutionStageTable>,
}

#[derive(Deserialize)]
struct WorldFile {
    slots: Vec<SlotDef>,
    incubators: Vec<IncubatorDef>,
    #[serde(default)]
    resource_nodes: Vec<ResourceNodeDef>,
    actors: Vec<ActorId>,
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let text = std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {file}"))
}

fn first_duplicate<'a, T: Eq + Hash + 'a>(ids: impl IntoIterator<Item = &'a T>) -> Option<&'a T> {
    let mut seen = HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}

/// Checks cross-references in loaded content.
///
/// Catches mistakes like an incubator listing an unknown species, two slots
/// sharing an id, or a cost entry of zero.
pub fn validate_content(content: &GameContent) -> Result<()> {
    if let Some(id) = first_duplicate(content.species.iter().map(|t| t.id())) {
        bail!("species id '{id}' is defined more than once");
    }
    if let Some(id) = first_duplicate(content.slots.iter().map(|s| &s.id)) {
        bail!("slot id '{id}' is defined more than once");
    }
    if let Some(id) = first_duplicate(content.incubators.iter().map(|i| &i.id)) {
        bail!("incubator id '{id}' is defined more than once");
    }
    if let Some(id) = first_duplicate(content.resource_nodes.iter().map(|n| &n.id)) {
        bail!("resource node id '{id}' is defined more than once");
    }
    if let Some(id) = first_duplicate(&content.actors) {
        bail!("actor id '{id}' is defined more than once");
    }

    for table in &content.species {
        for stage in table.stages() {
            for entry in &stage.cost {
                ensure!(
                    entry.amount > 0,
                    "species '{}' stage '{}' costs zero {}",
                    table.id(),
                    stage.name,
                    entry.kind,
                );
            }
        }
    }

    let slot_ids: HashSet<_> = content.slots.iter().map(|s| &s.id).collect();
    for incubator in &content.incubators {
        for species in &incubator.species {
            ensure!(
                content.species(species).is_some(),
                "incubator '{}' species '{}' is not a known species",
                incubator.id,
                species,
            );
        }
        for slot in &incubator.slots {
            ensure!(
                slot_ids.contains(slot),
                "incubator '{}' slot '{}' is not a known slot",
                incubator.id,
                slot,
            );
        }
    }

    for node in &content.resource_nodes {
        ensure!(
            node.amount_per_harvest > 0,
            "resource node '{}' yields zero {}",
            node.id,
            node.kind,
        );
    }

    ensure!(
        content.constants.message_display_ticks > 0,
        "constants.message_display_ticks must be positive"
    );
    ensure!(
        content.constants.ticks_per_second > 0,
        "constants.ticks_per_second must be positive"
    );
    Ok(())
}

pub fn load_content(content_dir: &str) -> Result<GameContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = read_json(dir, "constants.json")?;
    let species_file: SpeciesFile = read_json(dir, "species.json")?;
    let world: WorldFile = read_json(dir, "world.json")?;

    let content = GameContent {
        content_version: species_file.content_version,
        species: species_file.species.into_iter().map(Arc::new).collect(),
        slots: world.slots,
        incubators: world.incubators,
        resource_nodes: world.resource_nodes,
        actors: world.actors,
        constants,
    };
    validate_content(&content).with_context(|| format!("validating content in {content_dir}"))?;
    Ok(content)
}

/// Fresh session: every slot Empty, every ledger empty, every incubator at
/// its clamped start index.
pub fn build_initial_state(content: &GameContent, seed: u64) -> Result<GameState> {
    let mut incubators = BTreeMap::new();
    for def in &content.incubators {
        let catalog = def
            .species
            .iter()
            .map(|id| {
                content
                    .species(id)
                    .cloned()
                    .with_context(|| format!("incubator '{}' names unknown species '{id}'", def.id))
            })
            .collect::<Result<Vec<_>>>()?;
        incubators.insert(def.id.clone(), IncubatorStation::from_def(def, catalog));
    }

    Ok(GameState {
        meta: MetaState {
            tick: 0,
            seed,
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
            .collect(),
        scheduler: Scheduler::new(),
        counters: Counters::default(),
    })
}
