#![forbid(unsafe_code)]

//! Core domain model and business logic for the Medtrack reminder system.
//!
//! This crate provides:
//! - Domain types (medications, occurrences, weekdays, adherence)
//! - Recurrence-rule expansion over the scheduling horizon
//! - Point-in-time status classification
//! - Daily/weekly adherence aggregation
//! - Record store collaborator (in-memory, with snapshot persistence)

pub mod types;
pub mod error;
pub mod rule;
pub mod schedule;
pub mod status;
pub mod adherence;
pub mod store;
pub mod snapshot;
pub mod csv_export;
pub mod config;
pub mod logging;
pub mod tracker;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use rule::RecurrenceRule;
pub use schedule::{materialize, materialize_horizon, HORIZON_DAYS};
pub use status::classify_on_read;
pub use adherence::{aggregate, week_start, AdherenceReport, DayAdherence};
pub use store::{IdSource, MemoryStore, RandomIds, RecordStore};
pub use snapshot::StoreSnapshot;
pub use csv_export::export_occurrences;
pub use config::Config;
pub use tracker::TodayEntry;
