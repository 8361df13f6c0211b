use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use novedades_core::RecordIndex;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;

use crate::XmlError;

pub const RECORD_TAG: &[u8] = b"mutacion_rectificacion";
pub const FILING_TAG: &[u8] = b"radicado";
pub const RESOLUTION_TAG: &[u8] = b"resolucion";

/// Records read from one export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlExport {
    /// `radicado → resolucion`, in document order, last record wins on a repeated radicado.
    pub records: RecordIndex,
    /// Records left out because the filing id or resolution was absent or empty.
    pub skipped: usize,
}

/// Read and parse the export at `path`.
pub fn read_export(path: &Path) -> Result<XmlExport, XmlError> {
    let file = File::open(path).map_err(|source| XmlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let export = parse_reader(BufReader::new(file))?;
    debug!(path = %path.display(), records = export.records.len(), skipped = export.skipped, "parsed XML export");
    Ok(export)
}

/// Parse an export held in memory.
pub fn parse_str(xml: &str) -> Result<XmlExport, XmlError> {
    parse_reader(xml.as_bytes())
}

#[derive(Clone, Copy)]
enum Field {
    Filing,
    Resolution,
}

#[derive(Default)]
struct PendingRecord {
    filing: Option<String>,
    resolution: Option<String>,
}

impl PendingRecord {
    /// Start collecting text for the field named `tag`. Only the first
    /// occurrence of each field counts.
    fn open(&mut self, tag: &[u8]) -> Option<Field> {
        let (field, slot) = match tag {
            FILING_TAG => (Field::Filing, &mut self.filing),
            RESOLUTION_TAG => (Field::Resolution, &mut self.resolution),
            _ => return None,
        };
        if slot.is_some() {
            return None;
        }
        *slot = Some(String::new());
        Some(field)
    }

    fn push(&mut self, field: Field, text: &str) {
        let slot = match field {
            Field::Filing => &mut self.filing,
            Field::Resolution => &mut self.resolution,
        };
        if let Some(value) = slot {
            value.push_str(text);
        }
    }

    fn finish(self) -> Option<(String, String)> {
        match (self.filing, self.resolution) {
            (Some(filing), Some(resolution)) if !filing.is_empty() && !resolution.is_empty() => {
                Some((filing, resolution))
            }
            _ => None,
        }
    }
}

// Depth counts open elements: the root is at depth 1, records at 2, fields at 3.
fn parse_reader<R: BufRead>(input: R) -> Result<XmlExport, XmlError> {
    let mut reader = Reader::from_reader(input);
    let mut export = XmlExport::default();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut record: Option<PendingRecord> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                match depth {
                    0 => enter_root(&mut seen_root)?,
                    1 if e.name().as_ref() == RECORD_TAG => record = Some(PendingRecord::default()),
                    2 => field = record.as_mut().and_then(|r| r.open(e.name().as_ref())),
                    _ => {}
                }
                depth += 1;
            }
            Event::Empty(e) => match depth {
                0 => enter_root(&mut seen_root)?,
                1 if e.name().as_ref() == RECORD_TAG => export.skipped += 1,
                2 => {
                    if let Some(r) = record.as_mut() {
                        r.open(e.name().as_ref());
                    }
                }
                _ => {}
            },
            Event::Text(e) if depth == 0 => {
                if !e.iter().all(u8::is_ascii_whitespace) {
                    return Err(XmlError::TextOutsideRoot);
                }
            }
            Event::CData(_) if depth == 0 => return Err(XmlError::TextOutsideRoot),
            Event::Text(e) if depth == 3 => {
                if let (Some(r), Some(f)) = (record.as_mut(), field) {
                    let text = e.unescape().map_err(quick_xml::Error::from)?;
                    r.push(f, &text);
                }
            }
            Event::CData(e) if depth == 3 => {
                if let (Some(r), Some(f)) = (record.as_mut(), field) {
                    let text = reader
                        .decoder()
                        .decode(&e)
                        .map_err(quick_xml::Error::from)?;
                    r.push(f, &text);
                }
            }
            Event::End(_) => {
                depth = depth.checked_sub(1).ok_or(XmlError::Unbalanced(0))?;
                match depth {
                    2 => field = None,
                    1 => {
                        if let Some(r) = record.take() {
                            match r.finish() {
                                Some((filing, resolution)) => {
                                    export.records.insert(filing, resolution);
                                }
                                None => export.skipped += 1,
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(XmlError::NoRoot);
    }
    if depth != 0 {
        return Err(XmlError::Unbalanced(depth));
    }
    Ok(export)
}

fn enter_root(seen_root: &mut bool) -> Result<(), XmlError> {
    if *seen_root {
        return Err(XmlError::MultipleRoots);
    }
    *seen_root = true;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn entries(export: &XmlExport) -> Vec<(&str, &str)> {
        export.records.iter().collect()
    }

    #[test]
    fn reads_records_in_document_order() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<novedades>
    <mutacion_rectificacion>
        <radicado>2024-0002</radicado>
        <resolucion>R300</resolucion>
    </mutacion_rectificacion>
    <mutacion_rectificacion>
        <resolucion>R100</resolucion>
        <radicado>2024-0001</radicado>
        <matricula>50C-123</matricula>
    </mutacion_rectificacion>
</novedades>"#;
        let export = parse_str(xml).unwrap();
        assert_eq!(
            entries(&export),
            vec![("2024-0002", "R300"), ("2024-0001", "R100")]
        );
        assert_eq!(export.skipped, 0);
    }

    #[test]
    fn records_missing_a_field_are_skipped() {
        let xml = "<novedades>\
            <mutacion_rectificacion><radicado>A</radicado></mutacion_rectificacion>\
            <mutacion_rectificacion><resolucion>R1</resolucion></mutacion_rectificacion>\
            <mutacion_rectificacion><radicado></radicado><resolucion>R2</resolucion></mutacion_rectificacion>\
            <mutacion_rectificacion><radicado>B</radicado><resolucion/></mutacion_rectificacion>\
            <mutacion_rectificacion/>\
            <mutacion_rectificacion><radicado>C</radicado><resolucion>R3</resolucion></mutacion_rectificacion>\
        </novedades>";
        let export = parse_str(xml).unwrap();
        assert_eq!(entries(&export), vec![("C", "R3")]);
        assert_eq!(export.skipped, 5);
    }

    #[test]
    fn only_direct_children_of_root_are_records() {
        let xml = "<novedades>\
            <lote><mutacion_rectificacion><radicado>X</radicado><resolucion>R9</resolucion></mutacion_rectificacion></lote>\
            <otro><radicado>Y</radicado><resolucion>R8</resolucion></otro>\
            <mutacion_rectificacion><detalle><radicado>Z</radicado></detalle><radicado>W</radicado><resolucion>R7</resolucion></mutacion_rectificacion>\
        </novedades>";
        let export = parse_str(xml).unwrap();
        assert_eq!(entries(&export), vec![("W", "R7")]);
    }

    #[test]
    fn repeated_radicado_last_wins() {
        let xml = "<r>\
            <mutacion_rectificacion><radicado>A</radicado><resolucion>R1</resolucion></mutacion_rectificacion>\
            <mutacion_rectificacion><radicado>B</radicado><resolucion>R2</resolucion></mutacion_rectificacion>\
            <mutacion_rectificacion><radicado>A</radicado><resolucion>R3</resolucion></mutacion_rectificacion>\
        </r>";
        let export = parse_str(xml).unwrap();
        assert_eq!(entries(&export), vec![("A", "R3"), ("B", "R2")]);
    }

    #[test]
    fn first_field_occurrence_counts() {
        let xml = "<r><mutacion_rectificacion>\
            <radicado>A</radicado><radicado>B</radicado><resolucion>R1</resolucion>\
        </mutacion_rectificacion></r>";
        let export = parse_str(xml).unwrap();
        assert_eq!(entries(&export), vec![("A", "R1")]);
    }

    #[test]
    fn text_is_verbatim_with_entities_and_cdata() {
        let xml = "<r><mutacion_rectificacion>\
            <radicado> A&amp;B </radicado><resolucion><![CDATA[R<1>]]></resolucion>\
        </mutacion_rectificacion></r>";
        let export = parse_str(xml).unwrap();
        assert_eq!(entries(&export), vec![(" A&B ", "R<1>")]);
    }

    #[test]
    fn empty_root_has_no_records() {
        let export = parse_str("<novedades/>").unwrap();
        assert!(export.records.is_empty());
        assert_eq!(export.skipped, 0);
    }

    #[test]
    fn malformed_documents_fail() {
        assert!(matches!(parse_str(""), Err(XmlError::NoRoot)));
        assert!(matches!(parse_str("   "), Err(XmlError::NoRoot)));
        assert!(parse_str("<a><b></b>").is_err());
        assert!(matches!(parse_str("<a/><b/>"), Err(XmlError::MultipleRoots)));
        assert!(parse_str("<a><b></a></b>").is_err());
        assert!(parse_str("<a></a></a>").is_err());
        assert!(matches!(
            parse_str("garbage<novedades/>"),
            Err(XmlError::TextOutsideRoot)
        ));
        assert!(matches!(
            parse_str("<novedades/>garbage"),
            Err(XmlError::TextOutsideRoot)
        ));
        assert!(matches!(
            parse_str("<![CDATA[x]]><novedades/>"),
            Err(XmlError::TextOutsideRoot)
        ));
    }

    #[test]
    fn whitespace_around_root_is_allowed() {
        let export = parse_str("\n  <novedades/>\n\t\n").unwrap();
        assert!(export.records.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = read_export(Path::new("/nonexistent/Registro_novedades.xml"));
        assert!(matches!(result, Err(XmlError::Io { .. })));
    }

    #[test]
    fn reads_file_in_declared_encoding() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<novedades>")
            .unwrap();
        file.write_all(b"<mutacion_rectificacion><radicado>A\xd1O-1</radicado>")
            .unwrap();
        file.write_all(b"<resolucion>R1</resolucion></mutacion_rectificacion></novedades>")
            .unwrap();
        file.flush().unwrap();

        let export = read_export(file.path()).unwrap();
        assert_eq!(entries(&export), vec![("A\u{d1}O-1", "R1")]);
    }
}
