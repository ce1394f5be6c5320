//! Consumption logs: the audit trail of what left the cart, for which
//! patient, and how it was restocked.
//!
//! Pure domain logic (no IO, no HTTP, no storage).

pub mod log;

pub use log::{
    ConsumptionLog, LineItem, LogStatus, NewConsumption, ReplacementEvent, ReplacementOutcome,
};
