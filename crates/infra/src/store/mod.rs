//! Document store abstraction.
//!
//! Records are JSON documents keyed by `(collection, id)`. Reads are plain
//! lookups/scans; every mutation goes through a [`WriteBatch`] that the store
//! applies atomically (all operations or none).

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use chariot_auth::UserAccount;
use chariot_checklist::ChecklistRecord;
use chariot_consumption::ConsumptionLog;
use chariot_core::Entity;
use chariot_inventory::InventoryItem;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;

/// Logical collections.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Inventory,
    ConsumptionLogs,
    Checklists,
    Users,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Inventory => "inventory",
            Collection::ConsumptionLogs => "consumption_logs",
            Collection::Checklists => "checklists",
            Collection::Users => "users",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// An update targeted a document that does not exist; the batch was not applied.
    #[error("document not found: {collection}/{id}")]
    Missing { collection: Collection, id: String },

    #[error("failed to decode {collection}/{id}: {message}")]
    Decode {
        collection: Collection,
        id: String,
        message: String,
    },

    #[error("failed to encode document: {0}")]
    Encode(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// One mutation inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or overwrite the whole document.
    Set {
        collection: Collection,
        id: String,
        body: JsonValue,
    },
    /// Merge top-level fields into an existing document.
    Update {
        collection: Collection,
        id: String,
        fields: Map<String, JsonValue>,
    },
    Delete { collection: Collection, id: String },
}

/// Ordered list of mutations committed as a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Write a whole typed document.
    pub fn set<T: StoredDocument>(&mut self, doc: &T) -> Result<&mut Self, StoreError> {
        let body = serde_json::to_value(doc).map_err(|e| StoreError::Encode(e.to_string()))?;
        self.ops.push(WriteOp::Set {
            collection: T::COLLECTION,
            id: doc.id().to_string(),
            body,
        });
        Ok(self)
    }

    pub fn update(
        &mut self,
        collection: Collection,
        id: impl core::fmt::Display,
        fields: Map<String, JsonValue>,
    ) -> &mut Self {
        self.ops.push(WriteOp::Update {
            collection,
            id: id.to_string(),
            fields,
        });
        self
    }

    pub fn delete(&mut self, collection: Collection, id: impl core::fmt::Display) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            collection,
            id: id.to_string(),
        });
        self
    }
}

/// Backend-agnostic document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<JsonValue>, StoreError>;

    /// All documents of a collection as `(id, body)`, ordered by id.
    async fn list(&self, collection: Collection) -> Result<Vec<(String, JsonValue)>, StoreError>;

    /// Apply every operation of the batch, or none of them.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

/// A domain type persisted as one document.
pub trait StoredDocument: Entity + Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;
}

impl StoredDocument for InventoryItem {
    const COLLECTION: Collection = Collection::Inventory;
}

impl StoredDocument for ConsumptionLog {
    const COLLECTION: Collection = Collection::ConsumptionLogs;
}

impl StoredDocument for ChecklistRecord {
    const COLLECTION: Collection = Collection::Checklists;
}

impl StoredDocument for UserAccount {
    const COLLECTION: Collection = Collection::Users;
}

fn decode<T: StoredDocument>(id: &str, body: JsonValue) -> Result<T, StoreError> {
    serde_json::from_value(body).map_err(|e| StoreError::Decode {
        collection: T::COLLECTION,
        id: id.to_string(),
        message: e.to_string(),
    })
}

/// Load one typed document.
pub async fn fetch<T: StoredDocument>(
    store: &dyn DocumentStore,
    id: &T::Id,
) -> Result<Option<T>, StoreError> {
    let id = id.to_string();
    match store.get(T::COLLECTION, &id).await? {
        Some(body) => decode(&id, body).map(Some),
        None => Ok(None),
    }
}

/// Load every document of a typed collection.
///
/// Documents that fail to decode are logged and skipped so one bad record
/// does not take a whole screen down.
pub async fn fetch_all<T: StoredDocument>(store: &dyn DocumentStore) -> Result<Vec<T>, StoreError> {
    let rows = store.list(T::COLLECTION).await?;
    let mut out = Vec::with_capacity(rows.len());
    for (id, body) in rows {
        match decode::<T>(&id, body) {
            Ok(doc) => out.push(doc),
            Err(e) => tracing::warn!(error = %e, "skipping undecodable document"),
        }
    }
    Ok(out)
}

/// Build an update field map from `(name, value)` pairs.
pub fn fields<I, K>(pairs: I) -> Map<String, JsonValue>
where
    I: IntoIterator<Item = (K, JsonValue)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
