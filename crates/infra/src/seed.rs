//! Startup seed for empty stores.
//!
//! The seed file is JSON:
//!
//! ```json
//! {
//!   "inventory": [{"id": "T1-01", "name": "...", "drawer": "Tiroir 1", "stock": 4, "allotment": 4}],
//!   "users": [{"username": "sara", "first_name": "Sara", "last_name": "Idrissi",
//!              "role": "Responsable", "password": "..."}]
//! }
//! ```
//!
//! Passwords are hashed on load. A collection is only seeded while it is empty.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use chariot_auth::{AuthError, Role, UserAccount, hash_password};
use chariot_core::Username;
use chariot_inventory::InventoryItem;

use crate::store::{Collection, DocumentStore, StoreError, WriteBatch};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// What [`apply_seed`] actually wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub items: usize,
    pub users: usize,
}

impl SeedFile {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Write the seed into every collection that is still empty.
pub async fn apply_seed(store: &dyn DocumentStore, seed: SeedFile) -> Result<SeedReport, SeedError> {
    let mut batch = WriteBatch::new();
    let mut report = SeedReport::default();

    if store.list(Collection::Inventory).await?.is_empty() {
        for mut item in seed.inventory {
            item.stock = item.stock.min(item.allotment);
            batch.set(&item)?;
            report.items += 1;
        }
    } else if !seed.inventory.is_empty() {
        tracing::info!("inventory already populated; skipping item seed");
    }

    if store.list(Collection::Users).await?.is_empty() {
        for user in seed.users {
            let account = UserAccount {
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
                role: user.role,
                password_hash: hash_password(&user.password)?,
            };
            batch.set(&account)?;
            report.users += 1;
        }
    } else if !seed.users.is_empty() {
        tracing::info!("users already populated; skipping user seed");
    }

    store.commit(batch).await?;
    tracing::info!(items = report.items, users = report.users, "seed applied");
    Ok(report)
}
