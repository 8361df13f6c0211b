//! Database-vs-export comparison by resolution value.

use std::collections::HashSet;

use tracing::info;

use crate::RecordIndex;

/// Database entries whose resolution value appears nowhere among the export's values.
///
/// Membership is by exact value equality; the record identifiers on either
/// side are never compared. Two procedures sharing a resolution value are
/// therefore both kept or both dropped. Output order follows `db`.
pub fn find_missing(db: &RecordIndex, xml: &RecordIndex) -> RecordIndex {
    let exported: HashSet<&str> = xml.values().collect();
    let missing: RecordIndex = db
        .iter()
        .filter(|(_, resolution)| !exported.contains(resolution))
        .collect();

    info!(count = missing.len(), "found missing records");
    for (procedure_id, resolution_number) in missing.sample() {
        info!(%procedure_id, %resolution_number, "missing record sample");
    }
    missing
}
