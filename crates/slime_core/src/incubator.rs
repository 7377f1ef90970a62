use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use uuid::Uuid;

use crate::{
    new_process_id, EvolutionStageTable, IncubatorDef, IncubatorError, IncubatorId, ProcessSlot,
    SlimeSlotState, SlotId, SpawnMode, SpeciesId,
};

/// Creates slime processes and binds them into free slots.
///
/// Holds no slots itself, only their ids in binding order.
#[derive(Debug, Clone)]
pub struct IncubatorStation {
    id: IncubatorId,
    catalog: Vec<Arc<EvolutionStageTable>>,
    spawn_mode: SpawnMode,
    sequential_cursor: usize,
    slots: Vec<SlotId>,
    allow_reuse_finished: bool,
}

/// A successful `request_new_process`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCreated {
    pub slot_id: SlotId,
    /// 1-based position of the slot in the incubator's binding order.
    pub slot_number: usize,
    pub species: SpeciesId,
    pub species_name: String,
    pub process_id: Uuid,
    pub previous_state: SlimeSlotState,
}

impl std::fmt::Display for ProcessCreated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "New process created in Base {} with slime '{}'. State: New → Ready.",
            self.slot_number, self.species_name
        )
    }
}

impl IncubatorStation {
    /// `catalog` is the already-resolved species list of `def`.
    pub fn from_def(def: &IncubatorDef, catalog: Vec<Arc<EvolutionStageTable>>) -> Self {
        let sequential_cursor = def
            .sequential_start_index
            .min(catalog.len().saturating_sub(1));
        Self {
            id: def.id.clone(),
            catalog,
            spawn_mode: def.spawn_mode,
            sequential_cursor,
            slots: def.slots.clone(),
            allow_reuse_finished: def.allow_reuse_finished,
        }
    }

    pub fn id(&self) -> &IncubatorId {
        &self.id
    }

    pub fn catalog(&self) -> &[Arc<EvolutionStageTable>] {
        &self.catalog
    }

    pub fn slot_ids(&self) -> &[SlotId] {
        &self.slots
    }

    pub fn sequential_cursor(&self) -> usize {
        self.sequential_cursor
    }

    pub fn allows_reuse_finished(&self) -> bool {
        self.allow_reuse_finished
    }

    /// First slot in binding order that is Empty, or Finished when reuse is on.
    /// Ids with no placed slot are skipped.
    pub fn find_free_slot(&self, slots: &BTreeMap<SlotId, ProcessSlot>) -> Option<usize> {
        self.slots.iter().position(|id| {
            slots
                .get(id)
                .is_some_and(|slot| slot.accepts_bind(self.allow_reuse_finished))
        })
    }

    fn select_species(&mut self, rng: &mut impl Rng) -> Option<Arc<EvolutionStageTable>> {
        if self.catalog.is_empty() {
            return None;
        }
        let index = match self.spawn_mode {
            SpawnMode::Random => rng.gen_range(0..self.catalog.len()),
            SpawnMode::Sequential => {
                let index = self.sequential_cursor;
                self.sequential_cursor = (index + 1) % self.catalog.len();
                index
            }
        };
        self.catalog.get(index).cloned()
    }

    /// Binds a new process into the first free slot.
    ///
    /// The species is picked only after a free slot is found, so a failed
    /// request never moves the sequential cursor.
    pub fn request_new_process(
        &mut self,
        slots: &mut BTreeMap<SlotId, ProcessSlot>,
        rng: &mut impl Rng,
    ) -> Result<ProcessCreated, IncubatorError> {
        if self.catalog.is_empty() {
            return Err(IncubatorError::EmptyCatalog);
        }
        let position = self
            .find_free_slot(slots)
            .ok_or(IncubatorError::NoFreeSlot)?;
        let slot_id = self.slots[position].clone();
        let table = self
            .select_species(rng)
            .ok_or(IncubatorError::EmptyCatalog)?;
        let process_id = new_process_id(rng);

        let slot = slots.get_mut(&slot_id).ok_or(IncubatorError::NoFreeSlot)?;
        let previous_state = slot.bind(Arc::clone(&table), process_id, self.allow_reuse_finished)?;

        Ok(ProcessCreated {
            slot_id,
            slot_number: position + 1,
            species: table.id().clone(),
            species_name: table.name().to_string(),
            process_id,
            previous_state,
        })
    }
}
