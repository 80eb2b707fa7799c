/// Errors raised at the ingestion and configuration boundaries
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("position needs at least 2 coordinates, got {0}")]
    InvalidPosition(usize),

    #[error("expected a FeatureCollection, found {0}")]
    NotAFeatureCollection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
