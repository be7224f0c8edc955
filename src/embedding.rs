use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Output dimension of the face embedding model.
pub const EMBEDDING_DIM: usize = 512;

/// A single L2-normalized face embedding.
///
/// Can only be built through [`Embedding::from_raw`], so every value of this
/// type has exactly [`EMBEDDING_DIM`] finite components and unit Euclidean
/// norm. Normalization happens here, at the boundary, and nowhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    vector: Array1<f32>,
}

impl Embedding {
    /// Validate and normalize raw model output.
    pub fn from_raw(raw: Vec<f32>) -> Result<Self, IndexError> {
        if raw.len() != EMBEDDING_DIM {
            return Err(IndexError::InvalidEmbedding {
                reason: format!("expected {} components, got {}", EMBEDDING_DIM, raw.len()),
            });
        }
        if raw.iter().any(|x| !x.is_finite()) {
            return Err(IndexError::InvalidEmbedding {
                reason: "non-finite component".to_string(),
            });
        }

        let norm: f32 = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Err(IndexError::InvalidEmbedding {
                reason: "zero vector cannot be normalized".to_string(),
            });
        }

        let normalized: Vec<f32> = raw.iter().map(|x| x / norm).collect();
        Ok(Self {
            vector: Array1::from_vec(normalized),
        })
    }

    pub fn view(&self) -> ArrayView1<'_, f32> {
        self.vector.view()
    }
}

/// Squared Euclidean distance between two embedding rows.
///
/// On unit-normalized vectors this ranges over [0, 4]; smaller means more
/// similar. Simple zip-and-sum so LLVM can auto-vectorize.
pub(crate) fn squared_distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
