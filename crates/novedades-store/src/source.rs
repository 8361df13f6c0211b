//! The procedure-table reader contract shared by every backend.

use async_trait::async_trait;
use novedades_core::{ProcedureFilter, RecordIndex, TableRef};

use crate::StoreError;

/// A database holding the procedure table.
///
/// Implementations own one connection for the whole run; [`close`](Self::close)
/// releases it.
#[async_trait]
pub trait ProcedureSource: Send {
    /// Procedures in `filter`'s municipality and date window that carry a
    /// resolution number, as `procedure id → resolution number` in ascending
    /// resolution order.
    async fn fetch_resolutions(
        &mut self,
        filter: &ProcedureFilter,
    ) -> Result<RecordIndex, StoreError>;

    /// Release the connection.
    async fn close(self) -> Result<(), StoreError>
    where
        Self: Sized;
}

/// Positional placeholder syntax of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `$1, $2, ...` (PostgreSQL)
    Numbered,
    /// `?` (DuckDB)
    Question,
}

impl ParamStyle {
    fn placeholder(self, n: usize) -> String {
        match self {
            ParamStyle::Numbered => format!("${n}"),
            ParamStyle::Question => "?".to_string(),
        }
    }
}

/// Query text for [`ProcedureSource::fetch_resolutions`].
///
/// Binds, in order: municipality code, window start, window end (dates as
/// `YYYY-MM-DD` text). Both columns come back as text so identifiers and
/// resolution numbers compare as the tokens the database renders.
pub fn resolution_query(table: &TableRef, style: ParamStyle) -> String {
    format!(
        "SELECT CAST(id AS VARCHAR) AS procedure_id, CAST(resolution_number AS VARCHAR) AS resolution
        FROM {table}
        WHERE CAST(town AS VARCHAR) = {town}
          AND estado_actual_fecha_inicio BETWEEN CAST({start} AS DATE) AND CAST({end} AS DATE)
          AND resolution_number IS NOT NULL
        ORDER BY resolution_number ASC",
        town = style.placeholder(1),
        start = style.placeholder(2),
        end = style.placeholder(3),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_placeholders() {
        let table = TableRef::parse("data.tramite").unwrap();
        let sql = resolution_query(&table, ParamStyle::Numbered);
        assert!(sql.contains("FROM data.tramite"));
        assert!(sql.contains("CAST(town AS VARCHAR) = $1"));
        assert!(sql.contains("BETWEEN CAST($2 AS DATE) AND CAST($3 AS DATE)"));
        assert!(sql.contains("resolution_number IS NOT NULL"));
        assert!(sql.trim_end().ends_with("ORDER BY resolution_number ASC"));
    }

    #[test]
    fn question_placeholders() {
        let table = TableRef::parse("tramite").unwrap();
        let sql = resolution_query(&table, ParamStyle::Question);
        assert!(sql.contains("CAST(town AS VARCHAR) = ?"));
        assert!(sql.contains("BETWEEN CAST(? AS DATE) AND CAST(? AS DATE)"));
        assert!(!sql.contains('$'));
    }
}
