use std::path::PathBuf;

use thiserror::Error;

/// Failures reading the store file. `Missing` and `Corrupt` are recovered by the updater.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("store file is not valid JSON: {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON, but the top level is not an object. Not recovered.
    #[error("store file does not hold a JSON object: {}", .0.display())]
    NotAnObject(PathBuf),

    #[error("store I/O error: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Shape problems hit while merging fetched figures. Never recovered.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UpdateError {
    #[error("streaming is not an object")]
    MalformedStreaming,

    #[error("digital.stations[0] is missing or not an object")]
    MissingStation,

    #[error("sources[0] is missing or not an object")]
    MissingSource,
}
