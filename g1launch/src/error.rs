use g1launch_env::EnvError;
use thiserror::Error;

/// Fatal launcher errors. Everything else is deferred into the exit code.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The environment-activation artifact is missing
    #[error("configuration error: {0} (create it with `g1launch init`)")]
    Configuration(EnvError),
}
