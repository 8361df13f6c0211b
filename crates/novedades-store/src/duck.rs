//! DuckDB reader for offline snapshots of the procedure table.

use std::path::Path;

use async_trait::async_trait;
use duckdb::Connection;
use novedades_core::{ProcedureFilter, RecordIndex};
use tracing::info;

use crate::source::{ParamStyle, ProcedureSource, resolution_query};
use crate::StoreError;

/// DuckDB store holding a copy of the procedure table.
///
/// Supports both in-memory (ephemeral) and persistent (file-backed) modes.
/// Use [`open`](Self::open) for in-memory and [`open_persistent`](Self::open_persistent)
/// for a snapshot file exported from the production database.
pub struct DuckStore {
    conn: Connection,
}

impl DuckStore {
    /// Open an in-memory DuckDB database.
    pub fn open() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Open or create a persistent DuckDB database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened DuckDB snapshot");
        Ok(Self { conn })
    }

    /// Run one or more SQL statements, e.g. to load a snapshot.
    pub fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

#[async_trait]
impl ProcedureSource for DuckStore {
    async fn fetch_resolutions(
        &mut self,
        filter: &ProcedureFilter,
    ) -> Result<RecordIndex, StoreError> {
        let sql = resolution_query(&filter.table, ParamStyle::Question);
        let start = filter.date_start.to_string();
        let end = filter.date_end.to_string();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            [filter.municipality.as_str(), start.as_str(), end.as_str()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )?;
        let mut index = RecordIndex::new();
        for row in rows {
            let (procedure_id, resolution_number) = row?;
            index.insert(procedure_id, resolution_number);
        }
        Ok(index)
    }

    async fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::DuckDb(e))
    }
}
