use std::path::PathBuf;
use thiserror::Error;

use crate::schema::Table;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data unavailable: the {table} file was not found at {}", .path.display())]
    DataUnavailable { table: Table, path: PathBuf },

    #[error(
        "Malformed input in the {table} file{}: {reason}",
        .line.map(|l| format!(" at line {l}")).unwrap_or_default()
    )]
    MalformedInput {
        table: Table,
        line: Option<u64>,
        reason: String,
    },

    #[error("Failed to read the {table} file: {source}")]
    Io {
        table: Table,
        #[source]
        source: std::io::Error,
    },
}

impl LoaderError {
    pub(crate) fn malformed(table: Table, line: Option<u64>, reason: impl Into<String>) -> Self {
        LoaderError::MalformedInput {
            table,
            line,
            reason: reason.into(),
        }
    }
}
