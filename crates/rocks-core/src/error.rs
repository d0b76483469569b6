//! Error taxonomy for rocks-core.

use rocks_model::ModelError;

/// Errors produced while loading snapshots or building the status report.
#[derive(Debug, thiserror::Error)]
pub enum RocksError {
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// A package's versions could not be classified.
    #[error("cannot classify package {package} in {distro}: {source}")]
    Classify {
        package: String,
        distro: String,
        #[source]
        source: ModelError,
    },

    #[error("snapshot {locator} could not be parsed: {source}")]
    SnapshotParse {
        locator: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("snapshot source error: {0}")]
    Source(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rocks-core operations.
pub type Result<T> = std::result::Result<T, RocksError>;
