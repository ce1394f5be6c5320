//! Read-side views over the full item list.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::item::{Drawer, InventoryItem};

/// Items of one drawer, in id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawerGroup {
    pub drawer: Drawer,
    pub items: Vec<InventoryItem>,
}

/// The cart's item list, deduplicated by id and sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<InventoryItem>,
}

impl Catalog {
    /// Build a catalog; when an id appears more than once the first occurrence wins.
    pub fn new(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let mut seen = HashSet::new();
        let mut items: Vec<InventoryItem> = items
            .into_iter()
            .filter(|it| seen.insert(it.id.clone()))
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Self { items }
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<InventoryItem> {
        self.items
    }

    /// Case-insensitive substring match on the item name.
    pub fn search(&self, needle: &str) -> Vec<&InventoryItem> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return self.items.iter().collect();
        }
        self.items
            .iter()
            .filter(|it| it.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Group items by drawer in display order. Empty drawers are omitted.
    pub fn by_drawer(&self) -> Vec<DrawerGroup> {
        let mut groups: BTreeMap<Drawer, Vec<InventoryItem>> = BTreeMap::new();
        for it in &self.items {
            groups.entry(it.drawer.clone()).or_default().push(it.clone());
        }
        groups
            .into_iter()
            .map(|(drawer, items)| DrawerGroup { drawer, items })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, drawer: &str) -> InventoryItem {
        InventoryItem {
            id: id.parse().unwrap(),
            name: name.to_string(),
            category: None,
            drawer: Drawer::parse(drawer),
            stock: 1,
            allotment: 1,
        }
    }

    #[test]
    fn duplicates_keep_first_and_sort_by_id() {
        let catalog = Catalog::new(vec![
            item("T2-01", "Compresses", "Tiroir 2"),
            item("T1-01", "Seringue", "Tiroir 1"),
            item("T2-01", "Doublon", "Tiroir 2"),
        ]);
        let ids: Vec<_> = catalog.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["T1-01", "T2-01"]);
        assert_eq!(catalog.items()[1].name, "Compresses");
    }

    #[test]
    fn search_is_case_insensitive() {
        let catalog = Catalog::new(vec![
            item("A", "Sonde d'aspiration", "Tiroir 3"),
            item("B", "Seringue 10 ml", "Tiroir 1"),
        ]);
        let hits = catalog.search("SONDE");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "A");
        assert_eq!(catalog.search("  ").len(), 2);
    }

    #[test]
    fn groups_follow_cart_order_and_keep_unknown_drawers() {
        let catalog = Catalog::new(vec![
            item("A", "a", "Tiroir 2"),
            item("B", "b", "Annexe"),
            item("C", "c", "Dessus"),
            item("D", "d", "Tiroir 2"),
        ]);
        let groups = catalog.by_drawer();
        let labels: Vec<_> = groups.iter().map(|g| g.drawer.label()).collect();
        assert_eq!(labels, vec!["Dessus", "Tiroir 2", "Annexe"]);
        assert_eq!(groups[1].items.len(), 2);
    }
}
