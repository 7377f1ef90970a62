//! Error types for the incubation model.
//!
//! Player-facing variants carry the exact line shown on the message panel,
//! so the engine can surface them with `to_string()`.

use thiserror::Error;

use crate::{ResourceKind, SlimeSlotState, SpeciesId};

/// A spend request the ledger cannot cover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("missing {kind}: have {have}/{need}")]
    Insufficient {
        kind: ResourceKind,
        have: u32,
        need: u32,
    },
}

/// Why a slime could not move to its next stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvolutionError {
    #[error("This slime is already at its final stage.")]
    AlreadyFinal,

    #[error("Not enough resources: have {have}/{need} {kind}.")]
    InsufficientResources {
        kind: ResourceKind,
        have: u32,
        need: u32,
    },
}

impl From<LedgerError> for EvolutionError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Insufficient { kind, have, need } => {
                EvolutionError::InsufficientResources { kind, have, need }
            }
        }
    }
}

/// Rejections from a process slot's bind or advance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("Cannot assign a slime to a base in state {state}.")]
    InvalidSlotState { state: SlimeSlotState },

    #[error("This base is already running (Running).")]
    AlreadyBusy,

    #[error("This base is empty. Use the incubator to create a slime.")]
    EmptySlot,

    #[error("This slime already reached its final evolution (Finished).")]
    ProcessFinished,

    #[error("No slime assigned to this base.")]
    NoProcess,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncubatorError {
    #[error("Incubator: no slime species assigned.")]
    EmptyCatalog,

    #[error("Incubator: no free bases to assign a new slime.")]
    NoFreeSlot,

    #[error(transparent)]
    Bind(#[from] SlotError),
}

/// Authoring errors caught when content is built or deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("species '{species}' has no evolution stages")]
    NoStages { species: SpeciesId },
}
