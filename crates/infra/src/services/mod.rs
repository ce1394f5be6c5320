//! Use cases: read the documents a mutation needs, apply the domain rules,
//! and commit the resulting writes as one batch.

mod checklist;
mod consumption;
mod inventory;
mod session;

use std::sync::Arc;

use chrono::FixedOffset;
use thiserror::Error;

use chariot_auth::AuthError;
use chariot_checklist::ReportError;
use chariot_core::DomainError;

use crate::store::{DocumentStore, StoreError};

pub use checklist::{ChecklistGate, ChecklistReport, ValidatedChecklist};
pub use consumption::ReplacementResult;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0} not found")]
    NotFound(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Report parameters taken from configuration.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub unit_name: String,
    pub utc_offset: FixedOffset,
}

/// Entry point for every use case, shared across request handlers.
#[derive(Clone)]
pub struct ChariotServices {
    store: Arc<dyn DocumentStore>,
    report: ReportSettings,
}

impl core::fmt::Debug for ChariotServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChariotServices")
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl ChariotServices {
    pub fn new(store: Arc<dyn DocumentStore>, report: ReportSettings) -> Self {
        Self { store, report }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn report_settings(&self) -> &ReportSettings {
        &self.report
    }
}
