pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod identity;
pub mod index;
pub mod persist;
pub mod store;

// Re-export the types callers interact with
pub use embedding::{Embedding, EMBEDDING_DIM};
pub use error::IndexError;
pub use extract::{EmbeddingExtractor, ExtractionError};
pub use identity::IdentityMap;
pub use index::{FaceIndex, Match};
pub use store::VectorStore;
