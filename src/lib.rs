//! Sleep health and lifestyle analytics.
//!
//! Loads a fixed-schema table of sleep, activity and stress measurements and
//! derives the tables a report is built from:
//!
//! ```text
//!  loader ──► Dataset ──► aggregate / correlation / describe ──► ReportArtifacts
//!                                                                  │
//!                                                       StatsAccessor ──► findings
//! ```
//!
//! The dataset and everything derived from it are immutable once built; a
//! long-lived host keeps them in a [`state::ReportStore`].

pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod state;
pub mod stats;

pub use data::loader::{load_csv_reader, load_file, load_with_fallback, LoadOutcome};
pub use data::model::{CategoricalField, Dataset, NumericField, Record};
pub use error::{ConfigError, LoadError, LookupError};
pub use report::{build_report, ReportArtifacts, StatsAccessor};
pub use state::ReportStore;
