//! The "panier": quantities picked from the cart before they are committed
//! against a patient.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use chariot_core::{DomainError, ItemId};

use crate::item::InventoryItem;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: BTreeMap<ItemId, u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requested quantity for `item`. Zero removes the line.
    ///
    /// A quantity above what is currently on the cart is rejected.
    pub fn set(&mut self, item: &InventoryItem, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 {
            self.lines.remove(&item.id);
            return Ok(());
        }
        if quantity > item.stock {
            return Err(DomainError::validation(format!(
                "{}: requested {} but only {} in stock",
                item.name, quantity, item.stock
            )));
        }
        self.lines.insert(item.id.clone(), quantity);
        Ok(())
    }

    pub fn lines(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.lines.iter().map(|(id, q)| (id, *q))
    }

    /// Number of distinct items in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl FromIterator<(ItemId, u32)> for Cart {
    /// Zero quantities are dropped; stock limits are not checked here.
    fn from_iter<T: IntoIterator<Item = (ItemId, u32)>>(iter: T) -> Self {
        Self {
            lines: iter.into_iter().filter(|(_, q)| *q > 0).collect(),
        }
    }
}
