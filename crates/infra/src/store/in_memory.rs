use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::{Collection, DocumentStore, StoreError, WriteBatch, WriteOp};

/// In-memory document store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<BTreeMap<(Collection, String), JsonValue>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Backend("lock poisoned".to_string())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<JsonValue>, StoreError> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(&(collection, id.to_string())).cloned())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<(String, JsonValue)>, StoreError> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map
            .iter()
            .filter(|((c, _), _)| *c == collection)
            .map(|((_, id), body)| (id.clone(), body.clone()))
            .collect())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;

        // Stage on a copy so a failing op leaves the store untouched.
        let mut staged = map.clone();
        for op in batch.into_ops() {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    body,
                } => {
                    staged.insert((collection, id), body);
                }
                WriteOp::Update {
                    collection,
                    id,
                    fields,
                } => {
                    let doc = staged
                        .get_mut(&(collection, id.clone()))
                        .ok_or(StoreError::Missing { collection, id: id.clone() })?;
                    let obj = doc.as_object_mut().ok_or_else(|| StoreError::Decode {
                        collection,
                        id,
                        message: "document is not an object".to_string(),
                    })?;
                    obj.extend(fields);
                }
                WriteOp::Delete { collection, id } => {
                    staged.remove(&(collection, id));
                }
            }
        }

        *map = staged;
        Ok(())
    }
}
