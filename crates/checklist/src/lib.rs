//! Periodic compliance verification of the cart ("checkliste").
//!
//! - `run`: per-item verdicts, gating and completion rules
//! - `record`: the archived, immutable result of a validated run
//! - `report`: PDF rendering of a record

pub mod record;
pub mod report;
pub mod run;

pub use record::{ChecklistEntry, ChecklistRecord, ChecklistStatus};
pub use report::{render_pdf, report_file_name, ReportError, ReportOptions};
pub use run::{ChecklistRun, RunSummary, SecurityConfirmation, Verdict};
