use std::path::PathBuf;
use thiserror::Error;

/// Errors from environment discovery, creation and manifest reads.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The activation artifact is missing; `.0` is the path that was expected.
    #[error("environment not found at {}", .0.display())]
    EnvironmentNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("python3 or python not found in PATH")]
    InterpreterNotFound,

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("virtualenv creation failed with exit code {0}")]
    VenvFailed(i32),
}
