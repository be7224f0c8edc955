use std::path::PathBuf;

use thiserror::Error;

use crate::extract::ExtractionError;

/// Errors surfaced by the face identity index.
///
/// The variants separate "retry is pointless" (a bad photo) from "retry
/// might work" (a transient storage fault). A failed mutation is never
/// logged-and-ignored; callers always see it.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The extractor found no face or could not read the image. No index
    /// state was touched.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The durable write failed during `register`. The in-memory append was
    /// rolled back; the registration did not happen.
    #[error("failed to persist index state to {}: {source}", path.display())]
    PersistenceWrite {
        path: PathBuf,
        source: PersistFault,
    },

    /// The persisted artifacts could not be restored at startup. Fatal: the
    /// process must not serve from an inconsistent index. Points at a
    /// lower-level storage fault, not a data-model bug.
    #[error("corrupt index state at {}: {reason}", path.display())]
    CorruptState { path: PathBuf, reason: String },

    /// An embedding was rejected at the boundary (wrong dimension,
    /// non-finite or zero vector).
    #[error("invalid embedding: {reason}")]
    InvalidEmbedding { reason: String },
}

/// Underlying cause of a failed durable write.
#[derive(Debug, Error)]
pub enum PersistFault {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding: {0}")]
    Codec(#[from] postcard::Error),
}
