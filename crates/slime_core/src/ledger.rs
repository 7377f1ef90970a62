use ahash::AHashMap;

use crate::{LedgerError, ResourceCost, ResourceKind};

/// Per-actor resource store.
///
/// Counts are unsigned, so a balance can never go negative. Every mutation
/// bumps `revision`; displays compare revisions instead of subscribing.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    amounts: AHashMap<ResourceKind, u32>,
    revision: u64,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored count, 0 for kinds never seen.
    pub fn amount_of(&self, kind: ResourceKind) -> u32 {
        self.amounts.get(&kind).copied().unwrap_or(0)
    }

    /// Credits `amount` of `kind`. A balance clamps at `u32::MAX`; the
    /// excess is dropped and logged.
    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        let entry = self.amounts.entry(kind).or_insert(0);
        let have = *entry;
        *entry = have.checked_add(amount).unwrap_or_else(|| {
            tracing::warn!(%kind, have, amount, "resource balance clamped");
            u32::MAX
        });
        self.notify();
    }

    /// Deducts `amount` of `kind`, or returns false and leaves the ledger alone.
    pub fn try_spend(&mut self, kind: ResourceKind, amount: u32) -> bool {
        let have = self.amount_of(kind);
        if have < amount {
            return false;
        }
        self.amounts.insert(kind, have - amount);
        self.notify();
        true
    }

    /// Reports the first kind in `cost` order that the ledger cannot cover.
    ///
    /// Repeated kinds are summed before comparing.
    pub fn check(&self, cost: &[ResourceCost]) -> Result<(), LedgerError> {
        let required = aggregate(cost);
        for entry in cost {
            let need = required.get(&entry.kind).copied().unwrap_or(entry.amount);
            let have = self.amount_of(entry.kind);
            if have < need {
                return Err(LedgerError::Insufficient {
                    kind: entry.kind,
                    have,
                    need,
                });
            }
        }
        Ok(())
    }

    /// All-or-nothing spend: the whole cost is checked before anything is deducted.
    pub fn try_spend_all(&mut self, cost: &[ResourceCost]) -> Result<(), LedgerError> {
        self.check(cost)?;
        if cost.is_empty() {
            return Ok(());
        }
        let required = aggregate(cost);
        for (kind, need) in required.iter() {
            let have = self.amount_of(*kind);
            self.amounts.insert(*kind, have - need);
        }
        self.notify();
        Ok(())
    }

    /// Change counter, bumped on every add or spend.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Every kind with its count, in `ResourceKind::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        ResourceKind::ALL
            .iter()
            .map(move |kind| (*kind, self.amount_of(*kind)))
    }

    fn notify(&mut self) {
        self.revision += 1;
    }
}

fn aggregate(cost: &[ResourceCost]) -> AHashMap<ResourceKind, u32> {
    let mut required: AHashMap<ResourceKind, u32> = AHashMap::new();
    for entry in cost {
        let total = required.entry(entry.kind).or_insert(0);
        *total = total.saturating_add(entry.amount);
    }
    required
}
