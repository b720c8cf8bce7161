use std::path::PathBuf;

/// Errors that abort a formatting run.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("unable to obtain a syntax tree for {}: {reason}", path.display())]
    MissingSyntaxTree { path: PathBuf, reason: String },
    #[error("formatting was cancelled")]
    Cancelled,
    #[error("failed to start formatting workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl FormatError {
    /// Machine-readable reason used in command output.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            FormatError::MissingSyntaxTree { .. } => "missing_syntax_tree",
            FormatError::Cancelled => "cancelled",
            FormatError::WorkerPool(_) => "worker_pool",
        }
    }
}
