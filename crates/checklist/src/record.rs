use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chariot_core::{ChecklistId, Entity};
use chariot_inventory::{Drawer, InventoryItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistStatus {
    Validated,
}

/// Snapshot of one item as it was verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    pub name: String,
    pub drawer: Drawer,
    pub allotment: u32,
}

impl From<&InventoryItem> for ChecklistEntry {
    fn from(item: &InventoryItem) -> Self {
        Self {
            name: item.name.clone(),
            drawer: item.drawer.clone(),
            allotment: item.allotment,
        }
    }
}

/// Archived result of a validated checklist. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistRecord {
    pub id: ChecklistId,
    pub at: DateTime<Utc>,
    pub operator: String,
    pub status: ChecklistStatus,
    pub entries: Vec<ChecklistEntry>,
    /// Drawers locked with the key.
    pub drawers_locked: bool,
    /// Key and scissors attached to the cart (ziplock).
    pub key_attached: bool,
}

impl Entity for ChecklistRecord {
    type Id = ChecklistId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl ChecklistRecord {
    /// Build the record for a completed run.
    pub fn validated(
        id: ChecklistId,
        at: DateTime<Utc>,
        operator: impl Into<String>,
        items: &[InventoryItem],
    ) -> Self {
        Self {
            id,
            at,
            operator: operator.into(),
            status: ChecklistStatus::Validated,
            entries: items.iter().map(ChecklistEntry::from).collect(),
            drawers_locked: true,
            key_attached: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_record_snapshots_items() {
        let items = vec![InventoryItem {
            id: "T3-02".parse().unwrap(),
            name: "Lame de laryngoscope".to_string(),
            category: Some("Intubation".to_string()),
            drawer: Drawer::Drawer(3),
            stock: 1,
            allotment: 2,
        }];
        let rec = ChecklistRecord::validated(ChecklistId::new(), Utc::now(), "Sara Idrissi", &items);
        assert_eq!(rec.entries.len(), 1);
        assert_eq!(rec.entries[0].allotment, 2);
        assert!(rec.drawers_locked && rec.key_attached);

        let doc = serde_json::to_value(&rec).unwrap();
        assert_eq!(doc["status"], "validated");
        assert_eq!(doc["entries"][0]["drawer"], "Tiroir 3");
    }
}
