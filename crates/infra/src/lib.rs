//! `chariot-infra`: persistence, use cases and configuration.
//!
//! Domain crates stay IO-free; this crate loads documents, runs the domain
//! rules and commits the resulting writes atomically.

pub mod config;
pub mod seed;
pub mod services;
pub mod store;

pub use self::config::{AppConfig, ConfigError};
pub use services::{ChariotServices, ReportSettings, ServiceError, ServiceResult};
pub use store::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore, StoreError};
