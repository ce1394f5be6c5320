use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chariot_core::{DomainError, Entity, ItemId, LogId};
use chariot_inventory::{Drawer, InventoryItem};

/// Replacement lifecycle of a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    /// At least one line still has to be put back on the cart.
    Unresolved,
    Resolved,
}

/// One consumed item, snapshotted at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub drawer: Drawer,
    #[serde(default)]
    pub replaced: bool,
}

/// Trace of one replacement pass (possibly partial).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementEvent {
    pub at: DateTime<Utc>,
    pub operator: String,
    /// Names of the items put back during this pass.
    pub items: Vec<String>,
}

/// Input for opening a log: who, for which patient, and the resolved items.
#[derive(Debug, Clone)]
pub struct NewConsumption<'a> {
    pub id: LogId,
    pub at: DateTime<Utc>,
    pub operator: String,
    pub patient_ref: String,
    /// Items found in inventory with their requested quantity.
    pub lines: Vec<(&'a InventoryItem, u32)>,
}

/// Audit record of items consumed for one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionLog {
    pub id: LogId,
    pub at: DateTime<Utc>,
    pub operator: String,
    pub patient_ref: String,
    pub lines: Vec<LineItem>,
    /// Number of distinct items requested in the cart.
    pub product_count: usize,
    pub status: LogStatus,
    #[serde(default)]
    pub replaced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub replaced_by: Option<String>,
    #[serde(default)]
    pub history: Vec<ReplacementEvent>,
}

/// Result of a replacement pass: what to put back in stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementOutcome {
    /// `(item, quantity)` pairs to restock, in line order.
    pub restock: Vec<(ItemId, u32)>,
    /// True when this pass resolved the log.
    pub resolved: bool,
}

impl Entity for ConsumptionLog {
    type Id = LogId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl ConsumptionLog {
    /// Open an unresolved log.
    ///
    /// `requested` is the number of distinct items the operator asked for,
    /// which can exceed `lines` when some ids no longer exist in inventory.
    pub fn open(new: NewConsumption<'_>, requested: usize) -> Result<Self, DomainError> {
        let patient_ref = new.patient_ref.trim();
        if patient_ref.is_empty() {
            return Err(DomainError::validation("patient reference (IP) is required"));
        }
        if new.operator.trim().is_empty() {
            return Err(DomainError::validation("operator is required"));
        }

        let lines: Vec<LineItem> = new
            .lines
            .into_iter()
            .filter(|(_, qty)| *qty > 0)
            .map(|(item, quantity)| LineItem {
                item_id: item.id.clone(),
                name: item.name.clone(),
                quantity,
                drawer: item.drawer.clone(),
                replaced: false,
            })
            .collect();

        if lines.is_empty() {
            return Err(DomainError::validation("no known item in the cart"));
        }

        Ok(Self {
            id: new.id,
            at: new.at,
            operator: new.operator,
            patient_ref: patient_ref.to_string(),
            lines,
            product_count: requested,
            status: LogStatus::Unresolved,
            replaced_at: None,
            replaced_by: None,
            history: Vec::new(),
        })
    }

    pub fn is_resolved(&self) -> bool {
        self.status == LogStatus::Resolved
    }

    /// `"{qty}x {name}"` per line.
    pub fn summary_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|l| format!("{}x {}", l.quantity, l.name))
            .collect()
    }

    /// Flag the checked lines as replaced.
    ///
    /// Ids that are not on the log, or whose line is already replaced, are
    /// ignored. One history event is appended per call, and the log is
    /// resolved once every line is replaced.
    pub fn replace(
        &mut self,
        checked: &[ItemId],
        operator: &str,
        now: DateTime<Utc>,
    ) -> Result<ReplacementOutcome, DomainError> {
        if self.is_resolved() {
            return Err(DomainError::conflict("log already resolved"));
        }
        if checked.is_empty() {
            return Err(DomainError::validation("nothing checked"));
        }

        let checked: HashSet<&ItemId> = checked.iter().collect();
        let mut restock = Vec::new();
        let mut names = Vec::new();

        for line in self.lines.iter_mut().filter(|l| !l.replaced) {
            if checked.contains(&line.item_id) {
                line.replaced = true;
                restock.push((line.item_id.clone(), line.quantity));
                names.push(line.name.clone());
            }
        }

        self.history.push(ReplacementEvent {
            at: now,
            operator: operator.to_string(),
            items: names,
        });

        let resolved = self.lines.iter().all(|l| l.replaced);
        if resolved {
            self.status = LogStatus::Resolved;
            self.replaced_at = Some(now);
            self.replaced_by = Some(operator.to_string());
        }

        Ok(ReplacementOutcome { restock, resolved })
    }

    /// Only fully replaced logs may be removed from the history.
    pub fn ensure_deletable(&self) -> Result<(), DomainError> {
        if !self.is_resolved() {
            return Err(DomainError::conflict(
                "cannot delete a log whose items are not all replaced",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str) -> InventoryItem {
        InventoryItem {
            id: id.parse().unwrap(),
            name: name.to_string(),
            category: None,
            drawer: Drawer::Drawer(1),
            stock: 10,
            allotment: 10,
        }
    }

    fn open_log(items: &[(&InventoryItem, u32)]) -> ConsumptionLog {
        ConsumptionLog::open(
            NewConsumption {
                id: LogId::new(),
                at: Utc::now(),
                operator: "Amina Benali".to_string(),
                patient_ref: " 24/12345 ".to_string(),
                lines: items.to_vec(),
            },
            items.len(),
        )
        .unwrap()
    }

    fn id(s: &str) -> ItemId {
        s.parse().unwrap()
    }

    #[test]
    fn open_requires_patient_reference() {
        let a = item("A", "Seringue");
        let err = ConsumptionLog::open(
            NewConsumption {
                id: LogId::new(),
                at: Utc::now(),
                operator: "x".to_string(),
                patient_ref: "   ".to_string(),
                lines: vec![(&a, 1)],
            },
            1,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn open_rejects_empty_cart() {
        let err = ConsumptionLog::open(
            NewConsumption {
                id: LogId::new(),
                at: Utc::now(),
                operator: "x".to_string(),
                patient_ref: "24/1".to_string(),
                lines: vec![],
            },
            2,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn open_snapshots_lines_and_trims_reference() {
        let a = item("A", "Seringue");
        let log = open_log(&[(&a, 4)]);
        assert_eq!(log.patient_ref, "24/12345");
        assert_eq!(log.status, LogStatus::Unresolved);
        assert_eq!(log.summary_lines(), vec!["4x Seringue".to_string()]);
        assert!(log.history.is_empty());
    }

    #[test]
    fn partial_then_full_replacement() {
        let a = item("A", "Seringue");
        let b = item("B", "Compresse");
        let mut log = open_log(&[(&a, 4), (&b, 2)]);

        let first = log.replace(&[id("A")], "Nadia", Utc::now()).unwrap();
        assert_eq!(first.restock, vec![(id("A"), 4)]);
        assert!(!first.resolved);
        assert_eq!(log.status, LogStatus::Unresolved);
        assert!(log.replaced_by.is_none());

        let second = log.replace(&[id("A"), id("B")], "Karim", Utc::now()).unwrap();
        assert_eq!(second.restock, vec![(id("B"), 2)]);
        assert!(second.resolved);
        assert_eq!(log.status, LogStatus::Resolved);
        assert_eq!(log.replaced_by.as_deref(), Some("Karim"));
        assert_eq!(log.history.len(), 2);
        assert_eq!(log.history[0].items, vec!["Seringue".to_string()]);
    }

    #[test]
    fn resolved_log_rejects_further_replacement() {
        let a = item("A", "Seringue");
        let mut log = open_log(&[(&a, 1)]);
        log.replace(&[id("A")], "Nadia", Utc::now()).unwrap();
        let err = log.replace(&[id("A")], "Nadia", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn empty_selection_is_rejected() {
        let a = item("A", "Seringue");
        let mut log = open_log(&[(&a, 1)]);
        let err = log.replace(&[], "Nadia", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(log.history.is_empty());
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let a = item("A", "Seringue");
        let mut log = open_log(&[(&a, 1)]);
        let out = log.replace(&[id("Z")], "Nadia", Utc::now()).unwrap();
        assert!(out.restock.is_empty());
        assert!(!out.resolved);
        assert_eq!(log.history.len(), 1);
    }

    #[test]
    fn only_resolved_logs_are_deletable() {
        let a = item("A", "Seringue");
        let mut log = open_log(&[(&a, 1)]);
        assert!(log.ensure_deletable().is_err());
        log.replace(&[id("A")], "Nadia", Utc::now()).unwrap();
        assert!(log.ensure_deletable().is_ok());
    }

    #[test]
    fn log_document_roundtrips() {
        let a = item("A", "Seringue");
        let log = open_log(&[(&a, 2)]);
        let doc = serde_json::to_value(&log).unwrap();
        assert_eq!(doc["status"], "unresolved");
        let back: ConsumptionLog = serde_json::from_value(doc).unwrap();
        assert_eq!(back, log);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: resolved iff every line is flagged replaced, whatever the
            /// order and grouping of replacement passes.
            #[test]
            fn resolved_iff_all_lines_replaced(
                n in 1usize..8,
                passes in proptest::collection::vec(proptest::collection::vec(0usize..8, 0..4), 0..6)
            ) {
                let items: Vec<InventoryItem> =
                    (0..n).map(|i| item(&format!("I{i}"), &format!("item {i}"))).collect();
                let lines: Vec<(&InventoryItem, u32)> = items.iter().map(|it| (it, 1)).collect();
                let mut log = open_log(&lines);

                for pass in passes {
                    if pass.is_empty() || log.is_resolved() {
                        continue;
                    }
                    let ids: Vec<ItemId> = pass.iter().map(|i| id(&format!("I{i}"))).collect();
                    log.replace(&ids, "op", Utc::now()).unwrap();
                    let all = log.lines.iter().all(|l| l.replaced);
                    prop_assert_eq!(log.is_resolved(), all);
                }
                let all = log.lines.iter().all(|l| l.replaced);
                prop_assert_eq!(log.is_resolved(), all);
            }
        }
    }
}
