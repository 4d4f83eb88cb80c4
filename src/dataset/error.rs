use std::path::PathBuf;

use thiserror::Error;

use super::raw::DatasetKind;

/// Failures that abort graph generation or a file load.
///
/// Referential problems (edges pointing at unknown nodes) are not errors;
/// they are reported through `NormalizedGraph::discarded`.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Please upload both entities and relationships files ({0} missing)")]
    MissingInput(DatasetKind),

    #[error("Error parsing {kind} file: {source}")]
    Malformed {
        kind: DatasetKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error reading file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing export {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error serializing export: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
