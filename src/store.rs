use ndarray::{s, Array2, ArrayView2};

use crate::embedding::{squared_distance, Embedding, EMBEDDING_DIM};

/// Append-only store of registered embeddings.
///
/// Rows are kept in insertion order; the row index is the registration
/// position and is never reused or reordered. Match policy (thresholds)
/// lives in the caller, not here.
#[derive(Debug, Clone)]
pub struct VectorStore {
    rows: Array2<f32>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self {
            rows: Array2::zeros((0, EMBEDDING_DIM)),
        }
    }

    pub(crate) fn from_rows(rows: Array2<f32>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.nrows() == 0
    }

    pub(crate) fn rows(&self) -> ArrayView2<'_, f32> {
        self.rows.view()
    }

    /// Append an embedding, returning its assigned position.
    pub fn append(&mut self, embedding: &Embedding) -> usize {
        let position = self.rows.nrows();
        self.rows
            .push_row(embedding.view())
            .expect("embedding dimension is enforced at construction");
        position
    }

    /// Brute-force nearest neighbor by squared Euclidean distance.
    ///
    /// Returns `None` only when the store is empty. On ties the lowest
    /// position wins, so results are deterministic.
    pub fn search_nearest(&self, query: &Embedding) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (position, row) in self.rows.rows().into_iter().enumerate() {
            let distance = squared_distance(row, query.view());
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((position, distance));
            }
        }
        best
    }

    /// Drop every row at position `len` or later. Used to undo an append
    /// whose persistence failed.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len < self.rows.nrows() {
            self.rows = self.rows.slice(s![..len, ..]).to_owned();
        }
    }
}

impl Default for VectorStore {
    fn default() -> Self {
        Self::new()
    }
}
