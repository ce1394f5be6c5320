//! Service wiring: pick the document store, seed it, and hold the session
//! codec shared by the login route and the auth middleware.

use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;

use chariot_auth::SessionCodec;
use chariot_infra::seed::{apply_seed, SeedFile};
use chariot_infra::{
    AppConfig, ChariotServices, DocumentStore, InMemoryDocumentStore, PostgresDocumentStore,
    ReportSettings,
};

/// Everything handlers need, shared behind `Arc`.
#[derive(Debug, Clone)]
pub struct AppServices {
    chariot: ChariotServices,
    codec: Arc<SessionCodec>,
    token_ttl: Duration,
}

impl AppServices {
    pub fn new(chariot: ChariotServices, jwt_secret: &str, token_ttl: Duration) -> Self {
        Self {
            chariot,
            codec: Arc::new(SessionCodec::new(jwt_secret.as_bytes())),
            token_ttl,
        }
    }

    pub fn chariot(&self) -> &ChariotServices {
        &self.chariot
    }

    pub fn codec(&self) -> Arc<SessionCodec> {
        Arc::clone(&self.codec)
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

/// Build services from configuration.
///
/// `database_url` selects Postgres; without it documents live in memory and
/// are lost on restart.
pub async fn build_services(cfg: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn DocumentStore> = match cfg.database_url.as_deref() {
        Some(url) => {
            let pg = PostgresDocumentStore::connect(url, cfg.max_db_connections)
                .await
                .context("failed to connect to postgres")?;
            pg.migrate().await.context("failed to create documents table")?;
            tracing::info!("using postgres document store");
            Arc::new(pg)
        }
        None => {
            tracing::warn!("database_url not set; using in-memory document store");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    if let Some(path) = cfg.seed_path.as_deref() {
        let seed = SeedFile::from_path(path).with_context(|| format!("failed to load seed {path}"))?;
        apply_seed(store.as_ref(), seed).await.context("failed to apply seed")?;
    }

    let report = ReportSettings {
        unit_name: cfg.unit_name.clone(),
        utc_offset: cfg.utc_offset()?,
    };

    Ok(AppServices::new(
        ChariotServices::new(store, report),
        cfg.jwt_secret(),
        cfg.token_ttl(),
    ))
}
