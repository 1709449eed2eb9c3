//! Error types for the rent estimator.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the three startup artifacts an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Model,
    Scaler,
    Columns,
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Artifact::Model => "model",
            Artifact::Scaler => "scaler",
            Artifact::Columns => "column list",
        };
        f.write_str(name)
    }
}

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// A required artifact could not be read at startup
    #[error("{artifact} artifact not found at {}: {source}", .path.display())]
    ArtifactMissing {
        artifact: Artifact,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifacts or configuration are malformed or do not agree with each other
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The model could not produce a usable prediction
    #[error("Inference failed: {0}")]
    Inference(String),

    /// The request itself is unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Startup errors: nothing can be served until the artifacts are fixed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ArtifactMissing { .. } | Error::Configuration(_))
    }

    /// Message suitable for an end user.
    ///
    /// Input errors are shown verbatim since they describe what the user typed;
    /// everything else collapses to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidInput(msg) => msg.clone(),
            _ => "Unable to estimate a price for this property right now.".to_string(),
        }
    }
}
