use std::path::PathBuf;

/// Core error type.
///
/// Adapter crates map their specific errors into this type. Submission
/// failures are not errors: they are reported as `SubmissionOutcome::Failed`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot read config {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
