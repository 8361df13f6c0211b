//! Storage layer: reads the procedure table from PostgreSQL (live) or DuckDB (snapshot).

mod config;
mod error;
mod source;

pub use config::DbConfig;
pub use error::StoreError;
pub use source::{ParamStyle, ProcedureSource, resolution_query};

#[cfg(feature = "postgres")]
mod pg;
#[cfg(feature = "postgres")]
pub use pg::PgStore;

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;
