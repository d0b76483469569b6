//! Error types for rocks-model

use thiserror::Error;

/// Errors that can occur while interpreting model values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A version component was not a non-negative integer
    #[error("malformed version '{version}': component '{component}' is not numeric")]
    MalformedVersion { version: String, component: String },

    /// A build stage name outside {build, main, test}
    #[error("unknown build stage: {0}")]
    UnknownBuildStage(String),

    /// A dimension name outside the five split dimensions
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),
}
