//! Final listing of missing records and the diagnostic query to fetch them.

use tracing::info;

use crate::{ProcedureFilter, RecordIndex};

/// Outcome of one reconciliation run.
#[derive(Debug, Clone)]
pub struct Report {
    missing: RecordIndex,
    query: Option<String>,
}

impl Report {
    /// Build the report for `missing`, generating the query only when there
    /// is something to fetch.
    pub fn new(filter: &ProcedureFilter, missing: RecordIndex) -> Self {
        let query = (!missing.is_empty()).then(|| diagnostic_query(filter, missing.values()));
        Self { missing, query }
    }

    pub fn missing(&self) -> &RecordIndex {
        &self.missing
    }

    /// SQL text selecting the missing rows, for pasting into a database client.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Log the full, untruncated listing followed by the query.
    pub fn emit(&self) {
        info!(
            count = self.missing.len(),
            "reconciliation complete, missing records identified"
        );
        for (procedure_id, resolution_number) in self.missing.iter() {
            info!(%procedure_id, %resolution_number, "missing record");
        }
        if let Some(query) = &self.query {
            info!("query for the missing records:\n{query}");
        }
    }
}

fn diagnostic_query<'a>(filter: &ProcedureFilter, values: impl Iterator<Item = &'a str>) -> String {
    let values = values.map(quote_literal).collect::<Vec<_>>().join(", ");
    format!(
        "SELECT *\n\
         FROM {table}\n\
         WHERE town = {town}\n  \
         AND estado_actual_fecha_inicio BETWEEN {start} AND {end}\n  \
         AND resolution_number IN ({values})\n\
         ORDER BY resolution_date ASC;",
        table = filter.table,
        town = quote_literal(&filter.municipality),
        start = quote_literal(&filter.date_start.to_string()),
        end = quote_literal(&filter.date_end.to_string()),
    )
}

/// Render `value` as a single-quoted SQL string literal.
///
/// Embedded quotes are doubled and NUL characters, which no SQL text can
/// carry, are dropped.
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\0' => {}
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
