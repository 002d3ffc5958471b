use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A model stage produced degenerate output (non-finite factors,
    /// zero embedding dimension). Fatal at startup.
    #[error("Model fit failed: {0}")]
    Fit(String),

    #[error("Engine is not fitted yet")]
    NotReady,

    #[error("Engine is already fitted; use refresh to rebuild")]
    AlreadyFitted,

    #[error("Artifact error: {0}")]
    Artifact(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Artifact(err.to_string())
    }
}

impl From<bincode::Error> for EngineError {
    fn from(err: bincode::Error) -> Self {
        EngineError::Artifact(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Artifact(err.to_string())
    }
}
