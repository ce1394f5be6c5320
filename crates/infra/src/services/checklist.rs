use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use chariot_checklist::{
    ChecklistRecord, ChecklistRun, ReportOptions, SecurityConfirmation, Verdict, render_pdf,
    report_file_name,
};
use chariot_core::{ChecklistId, ItemId};

use super::{ChariotServices, ServiceError, ServiceResult};
use crate::store::{Collection, WriteBatch, fetch, fetch_all};

/// Whether a checklist may be started right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistGate {
    pub blocked: bool,
    pub unresolved_logs: usize,
}

/// A rendered PDF and its download name.
#[derive(Debug, Clone)]
pub struct ChecklistReport {
    pub file_name: String,
    pub pdf: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ValidatedChecklist {
    pub record: ChecklistRecord,
    pub report: ChecklistReport,
}

impl ChariotServices {
    pub async fn checklist_status(&self) -> ServiceResult<ChecklistGate> {
        let unresolved_logs = self.unresolved_count().await?;
        Ok(ChecklistGate {
            blocked: unresolved_logs > 0,
            unresolved_logs,
        })
    }

    /// Run the checklist over the current inventory, archive it and render
    /// the report. Nothing is stored unless every item is `Conforme` and the
    /// cart is confirmed secured.
    #[instrument(skip(self, verdicts), err)]
    pub async fn validate_checklist(
        &self,
        verdicts: Vec<(ItemId, Verdict)>,
        secured: bool,
        operator: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<ValidatedChecklist> {
        let unresolved = self.unresolved_count().await?;
        let catalog = self.catalog().await?;

        let mut run = ChecklistRun::start(catalog.into_items(), unresolved)?;
        for (id, verdict) in &verdicts {
            run.mark(id, *verdict)?;
        }
        let summary = run.summary();
        let items = run.complete(SecurityConfirmation { confirmed: secured })?;

        let record = ChecklistRecord::validated(ChecklistId::new(), now, operator, &items);
        let report = self.render(&record, false, now)?;

        let mut batch = WriteBatch::new();
        batch.set(&record)?;
        self.store().commit(batch).await?;

        tracing::info!(checklist = %record.id, items = summary.total, "checklist validated");
        Ok(ValidatedChecklist { record, report })
    }

    /// Archived checklists, newest first, at most `limit`.
    pub async fn checklists(&self, limit: usize) -> ServiceResult<Vec<ChecklistRecord>> {
        let mut records = fetch_all::<ChecklistRecord>(self.store()).await?;
        records.sort_by(|a, b| b.at.cmp(&a.at).then_with(|| b.id.cmp(&a.id)));
        records.truncate(limit);
        Ok(records)
    }

    /// Re-render the PDF of an archived checklist.
    pub async fn checklist_pdf(&self, id: ChecklistId, now: DateTime<Utc>) -> ServiceResult<ChecklistReport> {
        let record = fetch::<ChecklistRecord>(self.store(), &id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("checklist {id}")))?;
        self.render(&record, true, now)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_checklist(&self, id: ChecklistId) -> ServiceResult<()> {
        if fetch::<ChecklistRecord>(self.store(), &id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("checklist {id}")));
        }
        let mut batch = WriteBatch::new();
        batch.delete(Collection::Checklists, id);
        self.store().commit(batch).await?;
        Ok(())
    }

    fn render(
        &self,
        record: &ChecklistRecord,
        archive: bool,
        now: DateTime<Utc>,
    ) -> ServiceResult<ChecklistReport> {
        let settings = self.report_settings();
        let pdf = render_pdf(
            record,
            &ReportOptions {
                unit_name: settings.unit_name.clone(),
                utc_offset: settings.utc_offset,
                generated_at: now,
            },
        )?;
        Ok(ChecklistReport {
            file_name: report_file_name(record, archive, settings.utc_offset),
            pdf,
        })
    }
}
