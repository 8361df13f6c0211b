//! One reconciliation run: procedure table, then XML export, then comparison
//! and report. Stages run strictly in sequence.

use std::path::Path;

use novedades_core::{ProcedureFilter, RecordIndex, Report, RunConfig, find_missing};
use novedades_store::{ProcedureSource, StoreError};
use tracing::{info, warn};

/// Run every stage against an open `source`.
///
/// A database failure aborts the run. An unusable XML export is logged and
/// treated as empty, so every procedure is reported missing.
pub async fn run<S: ProcedureSource>(
    source: &mut S,
    config: &RunConfig,
) -> Result<Report, StoreError> {
    let db = read_database(source, &config.filter).await?;
    let xml = read_xml(&config.xml_path);
    let missing = find_missing(&db, &xml);
    let report = Report::new(&config.filter, missing);
    report.emit();
    Ok(report)
}

async fn read_database<S: ProcedureSource>(
    source: &mut S,
    filter: &ProcedureFilter,
) -> Result<RecordIndex, StoreError> {
    let index = source.fetch_resolutions(filter).await?;
    info!(table = %filter.table, count = index.len(), "queried procedure table");
    for (procedure_id, resolution_number) in index.sample() {
        info!(%procedure_id, %resolution_number, "procedure sample");
    }
    Ok(index)
}

fn read_xml(path: &Path) -> RecordIndex {
    match novedades_xml::read_export(path) {
        Ok(export) => {
            info!(
                path = %path.display(),
                count = export.records.len(),
                skipped = export.skipped,
                "processed XML export"
            );
            for (radicado, resolucion) in export.records.sample() {
                info!(%radicado, %resolucion, "XML record sample");
            }
            export.records
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot process XML export, treating it as empty");
            RecordIndex::new()
        }
    }
}
