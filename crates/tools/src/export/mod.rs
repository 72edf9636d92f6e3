//! Graph exporters
//!
//! Both formats only read the graph; exporting an unchanged graph twice
//! yields identical output.

mod dot;
mod json;

use std::path::PathBuf;

use thiserror::Error;

pub use dot::{Dot, to_dot, write_dot};
pub use json::{EdgeData, Element, GraphRecord, NodeData, to_json, to_record, write_json};

/// Errors raised while writing an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode graph record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
