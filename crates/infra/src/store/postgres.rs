//! Postgres-backed document store.
//!
//! All collections share one `documents` table keyed by `(collection, id)`
//! with a JSONB body. A [`WriteBatch`] runs inside a single transaction; any
//! failing operation rolls the whole batch back.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database (any code) | `Backend` |
//! | PoolClosed | `Backend` |
//! | Other | `Backend` |
//!
//! An `Update` that matches no row is reported as `Missing` after rollback.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{instrument, Span};

use super::{Collection, DocumentStore, StoreError, WriteBatch, WriteOp};

const SCHEMA: &str = include_str!("../../migrations/0001_documents.sql");

#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `documents` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn apply(tx: &mut Transaction<'_, Postgres>, op: WriteOp) -> Result<(), StoreError> {
        match op {
            WriteOp::Set {
                collection,
                id,
                body,
            } => {
                sqlx::query(
                    r#"
                    INSERT INTO documents (collection, id, body, updated_at)
                    VALUES ($1, $2, $3, NOW())
                    ON CONFLICT (collection, id)
                    DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()
                    "#,
                )
                .bind(collection.as_str())
                .bind(&id)
                .bind(body)
                .execute(&mut **tx)
                .await
                .map_err(|e| map_sqlx_error("set", e))?;
            }
            WriteOp::Update {
                collection,
                id,
                fields,
            } => {
                let result = sqlx::query(
                    r#"
                    UPDATE documents
                    SET body = body || $3, updated_at = NOW()
                    WHERE collection = $1 AND id = $2
                    "#,
                )
                .bind(collection.as_str())
                .bind(&id)
                .bind(JsonValue::Object(fields))
                .execute(&mut **tx)
                .await
                .map_err(|e| map_sqlx_error("update", e))?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::Missing { collection, id });
                }
            }
            WriteOp::Delete { collection, id } => {
                sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                    .bind(collection.as_str())
                    .bind(&id)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| map_sqlx_error("delete", e))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self), fields(collection = %collection), err)]
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<JsonValue>, StoreError> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.map(|r| r.try_get::<JsonValue, _>("body"))
            .transpose()
            .map_err(|e| map_sqlx_error("get", e))
    }

    #[instrument(skip(self), fields(collection = %collection, document_count = tracing::field::Empty), err)]
    async fn list(&self, collection: Collection) -> Result<Vec<(String, JsonValue)>, StoreError> {
        let rows = sqlx::query("SELECT id, body FROM documents WHERE collection = $1 ORDER BY id ASC")
            .bind(collection.as_str())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id").map_err(|e| map_sqlx_error("list", e))?;
            let body: JsonValue = row.try_get("body").map_err(|e| map_sqlx_error("list", e))?;
            out.push((id, body));
        }

        Span::current().record("document_count", out.len());
        Ok(out)
    }

    #[instrument(skip(self, batch), fields(op_count = batch.len()), err)]
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        for op in batch.into_ops() {
            // Dropping `tx` on error rolls back.
            Self::apply(&mut tx, op).await?;
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.to_string()).unwrap_or_default();
            StoreError::Backend(format!(
                "database error in {operation} ({code}): {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}
