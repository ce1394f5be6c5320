use serde::{Deserialize, Deserializer, Serialize, Serializer};

use chariot_core::{Entity, ItemId};

/// Physical location of an item on the cart.
///
/// Known locations sort in the order staff open them (top shelf, then drawers
/// 1 through 5). Any other label is preserved verbatim and sorts after them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Drawer {
    Top,
    Drawer(u8),
    Other(String),
}

impl Drawer {
    /// Exact match on the label; anything else is kept as written.
    pub fn parse(label: &str) -> Self {
        match label {
            "Dessus" => Drawer::Top,
            "Tiroir 1" => Drawer::Drawer(1),
            "Tiroir 2" => Drawer::Drawer(2),
            "Tiroir 3" => Drawer::Drawer(3),
            "Tiroir 4" => Drawer::Drawer(4),
            "Tiroir 5" => Drawer::Drawer(5),
            other => Drawer::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Drawer::Top => "Dessus".to_string(),
            Drawer::Drawer(n) => format!("Tiroir {n}"),
            Drawer::Other(label) => label.clone(),
        }
    }
}

impl core::fmt::Display for Drawer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for Drawer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Drawer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Drawer::parse(&label))
    }
}

/// Whether an item is at its allotment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    /// Below allotment: needs restocking.
    Low,
    Full,
}

/// A consumable item stocked on the cart.
///
/// `stock` is kept within `0..=allotment` by [`InventoryItem::consume`] and
/// [`InventoryItem::restock`]; documents loaded from storage are not
/// re-validated, so an out-of-range stock is only corrected on the next write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub drawer: Drawer,
    #[serde(default)]
    pub stock: u32,
    /// Authorized maximum stock ("dotation").
    #[serde(default)]
    pub allotment: u32,
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl InventoryItem {
    /// Stock after taking `quantity` off the cart. Never negative.
    pub fn consume(&self, quantity: u32) -> u32 {
        self.stock.saturating_sub(quantity)
    }

    /// Stock after returning `quantity` to the cart. Never above allotment.
    pub fn restock(&self, quantity: u32) -> u32 {
        self.allotment.min(self.stock.saturating_add(quantity))
    }

    pub fn level(&self) -> StockLevel {
        if self.stock < self.allotment {
            StockLevel::Low
        } else {
            StockLevel::Full
        }
    }

    /// Category for display, treating blank and spreadsheet `nan` imports as absent.
    pub fn display_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("nan"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(stock: u32, allotment: u32) -> InventoryItem {
        InventoryItem {
            id: "T1-01".parse().unwrap(),
            name: "Seringue 5 ml".to_string(),
            category: None,
            drawer: Drawer::Drawer(1),
            stock,
            allotment,
        }
    }

    #[test]
    fn consume_clamps_at_zero() {
        assert_eq!(item(3, 10).consume(5), 0);
        assert_eq!(item(10, 10).consume(4), 6);
    }

    #[test]
    fn restock_clamps_at_allotment() {
        assert_eq!(item(6, 10).restock(4), 10);
        assert_eq!(item(8, 10).restock(4), 10);
        assert_eq!(item(2, 10).restock(3), 5);
    }

    #[test]
    fn level_is_low_below_allotment() {
        assert_eq!(item(9, 10).level(), StockLevel::Low);
        assert_eq!(item(10, 10).level(), StockLevel::Full);
    }

    #[test]
    fn drawer_labels_roundtrip() {
        for label in ["Dessus", "Tiroir 1", "Tiroir 5", "Sac annexe"] {
            assert_eq!(Drawer::parse(label).label(), label);
        }
        assert_eq!(Drawer::parse("Tiroir 6"), Drawer::Other("Tiroir 6".to_string()));
    }

    #[test]
    fn near_miss_labels_are_kept_verbatim() {
        for label in ["Tiroir 01", "Tiroir  2", " Dessus", "dessus"] {
            assert_eq!(Drawer::parse(label), Drawer::Other(label.to_string()));
            assert_eq!(Drawer::parse(label).label(), label);
        }
    }

    #[test]
    fn known_drawers_sort_before_other_labels() {
        let mut drawers = vec![
            Drawer::Other("Annexe".to_string()),
            Drawer::Drawer(2),
            Drawer::Top,
        ];
        drawers.sort();
        assert_eq!(
            drawers,
            vec![Drawer::Top, Drawer::Drawer(2), Drawer::Other("Annexe".to_string())]
        );
    }

    #[test]
    fn nan_category_is_hidden() {
        let mut it = item(1, 1);
        it.category = Some("nan".to_string());
        assert_eq!(it.display_category(), None);
        it.category = Some(" Voies aériennes ".to_string());
        assert_eq!(it.display_category(), Some("Voies aériennes"));
    }

    #[test]
    fn item_deserializes_from_document() {
        let doc = serde_json::json!({
            "id": "D-02",
            "name": "Masque O2",
            "drawer": "Dessus",
            "stock": 2,
            "allotment": 3
        });
        let it: InventoryItem = serde_json::from_value(doc).unwrap();
        assert_eq!(it.drawer, Drawer::Top);
        assert_eq!(it.category, None);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: consumption never drives stock below zero.
            #[test]
            fn consume_never_negative(stock in 0u32..1000, allotment in 0u32..1000, qty in 0u32..5000) {
                let it = item(stock, allotment);
                let next = it.consume(qty);
                prop_assert!(next <= stock);
                prop_assert_eq!(next, stock.saturating_sub(qty));
            }

            /// Property: replacement never exceeds the allotment.
            #[test]
            fn restock_never_exceeds_allotment(stock in 0u32..1000, allotment in 0u32..1000, qty in 0u32..5000) {
                let it = item(stock.min(allotment), allotment);
                let next = it.restock(qty);
                prop_assert!(next <= allotment);
                prop_assert!(next >= it.stock);
            }

            /// Property: consume then restock of the same quantity returns to the
            /// original stock when nothing was clamped.
            #[test]
            fn consume_then_restock_is_identity(allotment in 1u32..500, qty in 0u32..500) {
                let qty = qty.min(allotment);
                let full = item(allotment, allotment);
                let after = item(full.consume(qty), allotment);
                prop_assert_eq!(after.restock(qty), allotment);
            }
        }
    }
}
