use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML: {0}")]
    Parse(#[from] quick_xml::Error),

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("text outside the root element")]
    TextOutsideRoot,

    #[error("document ends with {0} unclosed element(s)")]
    Unbalanced(usize),
}
