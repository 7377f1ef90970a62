use crate::{NodeId, ResourceKind, ResourceLedger, ResourceNodeDef};

/// A one-shot harvestable pickup in the world.
#[derive(Debug, Clone)]
pub struct ResourceNode {
    id: NodeId,
    kind: ResourceKind,
    amount_per_harvest: u32,
    destroy_on_harvest: bool,
    available: bool,
}

impl ResourceNode {
    pub fn from_def(def: &ResourceNodeDef) -> Self {
        Self {
            id: def.id.clone(),
            kind: def.kind,
            amount_per_harvest: def.amount_per_harvest,
            destroy_on_harvest: def.destroy_on_harvest,
            available: true,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn amount_per_harvest(&self) -> u32 {
        self.amount_per_harvest
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Whether the world should remove the node once it has been harvested.
    pub fn destroy_on_harvest(&self) -> bool {
        self.destroy_on_harvest
    }

    /// Credits `ledger` once. Returns the amount, or `None` if already taken.
    pub fn harvest(&mut self, ledger: &mut ResourceLedger) -> Option<u32> {
        if !self.available {
            return None;
        }
        ledger.add(self.kind, self.amount_per_harvest);
        self.available = false;
        Some(self.amount_per_harvest)
    }
}
