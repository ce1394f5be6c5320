use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use chariot_core::{DomainError, ItemId};
use chariot_inventory::InventoryItem;

/// Operator's verdict for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Present at its allotment ("Conforme").
    Conforme,
    /// Missing or short ("Manquant").
    Manquant,
}

/// The final securing step: drawers locked with the key, key and scissors
/// attached to the cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfirmation {
    pub confirmed: bool,
}

/// Verdict tally over the whole inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub ok: usize,
    pub missing: usize,
    pub pending: usize,
}

/// An in-progress verification pass over every item of the cart.
#[derive(Debug, Clone)]
pub struct ChecklistRun {
    items: Vec<InventoryItem>,
    verdicts: HashMap<ItemId, Verdict>,
}

impl ChecklistRun {
    /// Start a run. Refused while any consumption is still waiting for
    /// replacement: the cart must be complete before it is verified.
    pub fn start(items: Vec<InventoryItem>, unresolved_logs: usize) -> Result<Self, DomainError> {
        if unresolved_logs > 0 {
            return Err(DomainError::conflict(format!(
                "{unresolved_logs} consumption log(s) not replaced; restock before the checklist"
            )));
        }
        if items.is_empty() {
            return Err(DomainError::validation("inventory is empty"));
        }
        Ok(Self {
            items,
            verdicts: HashMap::new(),
        })
    }

    /// Record a verdict. Unknown ids are rejected.
    pub fn mark(&mut self, item: &ItemId, verdict: Verdict) -> Result<(), DomainError> {
        if !self.items.iter().any(|it| &it.id == item) {
            return Err(DomainError::validation(format!("unknown item '{item}'")));
        }
        self.verdicts.insert(item.clone(), verdict);
        Ok(())
    }

    pub fn summary(&self) -> RunSummary {
        let mut ok = 0;
        let mut missing = 0;
        let mut pending = 0;
        for it in &self.items {
            match self.verdicts.get(&it.id) {
                Some(Verdict::Conforme) => ok += 1,
                Some(Verdict::Manquant) => missing += 1,
                None => pending += 1,
            }
        }
        RunSummary {
            total: self.items.len(),
            ok,
            missing,
            pending,
        }
    }

    /// Check the run can be validated and hand back the verified items.
    pub fn complete(self, security: SecurityConfirmation) -> Result<Vec<InventoryItem>, DomainError> {
        let summary = self.summary();
        if summary.pending > 0 {
            return Err(DomainError::validation(format!(
                "every line must be checked ({} remaining)",
                summary.pending
            )));
        }
        if summary.missing > 0 {
            return Err(DomainError::validation(format!(
                "{} item(s) missing and not replaced",
                summary.missing
            )));
        }
        if !security.confirmed {
            return Err(DomainError::validation(
                "cart securing (key, scissors, locked drawers) must be confirmed",
            ));
        }
        Ok(self.items)
    }
}
