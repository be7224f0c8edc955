use thiserror::Error;

use crate::embedding::Embedding;

/// Why the extractor could not turn an image into an embedding.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no face detected")]
    NoFace,
    #[error("unreadable image: {0}")]
    UnreadableImage(String),
}

/// Contract of the external embedding extraction capability.
///
/// Implementations run face detection and the embedding network over raw
/// image bytes and return the detected face's normalized 512-d embedding.
/// The index consumes this as a pure function and never retries on failure;
/// retry policy belongs to the caller, who may need a new photo.
pub trait EmbeddingExtractor: Send + Sync {
    fn extract(&self, image: &[u8]) -> Result<Embedding, ExtractionError>;
}
