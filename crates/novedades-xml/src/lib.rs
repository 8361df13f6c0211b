//! Reader for the novedades XML export.
//!
//! The export is a root element whose direct children are
//! `<mutacion_rectificacion>` records, each carrying a `<radicado>` (filing
//! id) and a `<resolucion>` (resolution value):
//!
//! ```xml
//! <novedades>
//!   <mutacion_rectificacion>
//!     <radicado>2024-0001</radicado>
//!     <resolucion>R100</resolucion>
//!   </mutacion_rectificacion>
//! </novedades>
//! ```

mod error;
mod parser;

pub use error::XmlError;
pub use parser::{FILING_TAG, RECORD_TAG, RESOLUTION_TAG, XmlExport, parse_str, read_export};
