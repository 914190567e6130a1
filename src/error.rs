use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Every failure the viewer can report.
///
/// `FileAccess`, `Parse`, `Config`, `NoCommonCells`, `InsufficientData` and
/// `Solve` only occur during startup and are fatal. `InputFormat` is raised by
/// the lookup box and is shown in the status line.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("'{input}' is not a valid cell identifier")]
    InputFormat { input: String },

    #[error("configuration: {0}")]
    Config(String),

    #[error("no PSECELLID is present in all four tables")]
    NoCommonCells,

    #[error("joined table has {rows} row(s), too few for a train/holdout split")]
    InsufficientData { rows: usize },

    #[error("least-squares solve failed: {0}")]
    Solve(String),
}

pub type Result<T> = std::result::Result<T, Error>;
