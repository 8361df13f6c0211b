use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[cfg(feature = "postgres")]
    #[error("postgres error: {0}")]
    Postgres(#[from] ::sqlx::Error),

    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] ::duckdb::Error),

    /// Failure reported by a [`ProcedureSource`](crate::ProcedureSource)
    /// implemented outside this crate, e.g. an in-memory source in tests.
    #[error("{0}")]
    Other(String),
}
