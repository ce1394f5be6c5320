//! Inventory domain module.
//!
//! This crate contains the business rules for the cart's stock, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod cart;
pub mod catalog;
pub mod item;

pub use cart::Cart;
pub use catalog::{Catalog, DrawerGroup};
pub use item::{Drawer, InventoryItem, StockLevel};
