//! Core types for reconciling the procedure table against the novedades XML export.

pub mod config;
pub mod error;
pub mod index;
pub mod reconcile;
pub mod report;

pub use config::{ProcedureFilter, RunConfig, TableRef};
pub use error::ConfigError;
pub use index::{RecordIndex, SAMPLE_SIZE};
pub use reconcile::find_missing;
pub use report::{Report, quote_literal};
