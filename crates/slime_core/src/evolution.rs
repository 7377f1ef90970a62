//! Species stage tables and the evolving slime process.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ContentError, EvolutionError, EvolutionStage, ResourceCost, ResourceLedger, SpeciesId,
};

/// Ordered stages of one species. Index 0 is the egg, the last index is terminal.
///
/// Always holds at least one stage; deserialization goes through the same
/// check as `new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StageTableDef")]
pub struct EvolutionStageTable {
    id: SpeciesId,
    name: String,
    stages: Vec<EvolutionStage>,
}

#[derive(Deserialize)]
struct StageTableDef {
    id: SpeciesId,
    name: String,
    stages: Vec<EvolutionStage>,
}

impl TryFrom<StageTableDef> for EvolutionStageTable {
    type Error = ContentError;

    fn try_from(def: StageTableDef) -> Result<Self, Self::Error> {
        EvolutionStageTable::new(def.id, def.name, def.stages)
    }
}

impl EvolutionStageTable {
    pub fn new(
        id: SpeciesId,
        name: impl Into<String>,
        stages: Vec<EvolutionStage>,
    ) -> Result<Self, ContentError> {
        if stages.is_empty() {
            return Err(ContentError::NoStages { species: id });
        }
        Ok(Self {
            id,
            name: name.into(),
            stages,
        })
    }

    pub fn id(&self) -> &SpeciesId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> &[EvolutionStage] {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn final_index(&self) -> usize {
        self.stages.len() - 1
    }
}

/// One evolving creature: a shared stage table plus a position in it.
///
/// `current_index` only ever moves forward and never passes `final_index`.
#[derive(Debug, Clone)]
pub struct SlimeProcess {
    id: Uuid,
    table: Arc<EvolutionStageTable>,
    current_index: usize,
}

impl SlimeProcess {
    pub fn new(id: Uuid, table: Arc<EvolutionStageTable>) -> Self {
        Self {
            id,
            table,
            current_index: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn table(&self) -> &Arc<EvolutionStageTable> {
        &self.table
    }

    pub fn species(&self) -> &SpeciesId {
        self.table.id()
    }

    pub fn stage_index(&self) -> usize {
        self.current_index
    }

    pub fn current_stage(&self) -> &EvolutionStage {
        &self.table.stages[self.current_index]
    }

    pub fn is_final(&self) -> bool {
        self.current_index == self.table.final_index()
    }

    /// What it costs to leave the current stage; empty once final.
    pub fn current_cost(&self) -> &[ResourceCost] {
        if self.is_final() {
            return &[];
        }
        &self.current_stage().cost
    }

    /// Pays the current stage's cost from `ledger` and moves one stage forward.
    ///
    /// The whole cost is checked before anything is deducted, so a failure
    /// never leaves a partial spend behind.
    pub fn try_advance(&mut self, ledger: &mut ResourceLedger) -> Result<usize, EvolutionError> {
        if self.is_final() {
            return Err(EvolutionError::AlreadyFinal);
        }
        ledger.try_spend_all(&self.table.stages[self.current_index].cost)?;
        self.current_index += 1;
        Ok(self.current_index)
    }
}
