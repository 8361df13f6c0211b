//! Run parameters: which table, municipality, and date window to reconcile.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::ConfigError;

/// A validated `table` or `schema.table` reference.
///
/// Identifiers cannot be bound as query parameters, so every part is
/// restricted to `[A-Za-z_][A-Za-z0-9_]*` before it is ever interpolated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    schema: Option<String>,
    name: String,
}

impl TableRef {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let mut parts = s.split('.');
        let (schema, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, None) => (None, name),
            (Some(schema), Some(name), None) => (Some(schema), name),
            _ => {
                return Err(ConfigError::invalid(
                    "table",
                    format!("{s:?} is not `table` or `schema.table`"),
                ));
            }
        };
        for part in schema.iter().chain([&name]) {
            if !is_identifier(part) {
                return Err(ConfigError::invalid(
                    "table",
                    format!("{part:?} is not a plain SQL identifier"),
                ));
            }
        }
        Ok(Self {
            schema: schema.map(str::to_owned),
            name: name.to_owned(),
        })
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for TableRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Filter applied to the procedure table: municipality plus an inclusive
/// window on the status start date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureFilter {
    pub table: TableRef,
    pub municipality: String,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
}

impl ProcedureFilter {
    /// Validate raw parameters. Dates are ISO-8601 calendar dates (`YYYY-MM-DD`).
    pub fn new(
        table: &str,
        municipality: &str,
        date_start: &str,
        date_end: &str,
    ) -> Result<Self, ConfigError> {
        let table = TableRef::parse(table)?;
        if municipality.is_empty() {
            return Err(ConfigError::invalid("municipality", "must not be empty"));
        }
        let date_start = parse_date("date_start", date_start)?;
        let date_end = parse_date("date_end", date_end)?;
        if date_start > date_end {
            return Err(ConfigError::invalid(
                "date_end",
                format!("{date_end} is before {date_start}"),
            ));
        }
        Ok(Self {
            table,
            municipality: municipality.to_owned(),
            date_start,
            date_end,
        })
    }
}

fn parse_date(field: &'static str, s: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| ConfigError::invalid(field, format!("{s:?}: {e}")))
}

/// Everything one reconciliation run needs besides database credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub filter: ProcedureFilter,
    pub xml_path: PathBuf,
}

impl RunConfig {
    pub fn new(
        table: &str,
        municipality: &str,
        date_start: &str,
        date_end: &str,
        xml_path: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            filter: ProcedureFilter::new(table, municipality, date_start, date_end)?,
            xml_path: xml_path.into(),
        })
    }
}
