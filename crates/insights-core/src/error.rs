use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the fitness-insights pipeline.
///
/// Only load-time structural problems are errors: a missing export file, a
/// column absent from a header, or an unparseable declared column. Row-level
/// quality issues are filtered by the cleaner and surfaced by the validator,
/// never raised through this type.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An expected export file is absent from the data directory.
    #[error("Missing input file: {}", .0.display())]
    MissingFile(PathBuf),

    /// An expected column is absent from a loaded table's header.
    #[error("{file}: missing expected column \"{column}\"")]
    Schema { file: String, column: String },

    /// A declared date/time column contains an unparseable value.
    #[error("{file}: could not parse {column} value \"{value}\"")]
    Parse {
        file: String,
        column: String,
        value: String,
    },

    /// A CSV record could not be read or deserialized.
    #[error("{file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A chart artifact could not be rendered.
    #[error("Chart rendering failed: {0}")]
    Chart(String),

    /// Pass-through for raw I/O errors that do not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the insights crates.
pub type Result<T> = std::result::Result<T, PipelineError>;
