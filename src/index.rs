use std::path::PathBuf;
use std::sync::RwLock;

use log::{debug, info, warn};

use crate::embedding::Embedding;
use crate::error::IndexError;
use crate::extract::EmbeddingExtractor;
use crate::identity::IdentityMap;
use crate::persist;
use crate::store::VectorStore;

/// A successful recognition: the registered patient whose embedding lies
/// closest to the query, within the caller's threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub patient_id: i64,
    pub position: usize,
    pub distance: f32,
}

/// The two positionally aligned structures, guarded as one unit so readers
/// never observe one grown without the other.
struct IndexState {
    store: VectorStore,
    identities: IdentityMap,
}

/// The face identity index.
///
/// Constructed once at startup via [`FaceIndex::open`], then shared with
/// request handlers (e.g. behind an `Arc`). Registrations serialize on a
/// write lock covering append-to-both-then-persist; recognitions share a
/// read lock and may run concurrently with each other.
pub struct FaceIndex {
    state: RwLock<IndexState>,
    snapshot_path: PathBuf,
}

impl FaceIndex {
    /// Restore the index from its durable snapshot, or start empty when no
    /// snapshot exists. Runs before any concurrent access: the index is not
    /// shared until `open` returns.
    pub fn open(snapshot_path: impl Into<PathBuf>) -> Result<Self, IndexError> {
        let snapshot_path = snapshot_path.into();
        let (store, identities) = persist::load(&snapshot_path)?;
        info!("face index ready: {} registered embedding(s)", store.len());
        Ok(Self {
            state: RwLock::new(IndexState { store, identities }),
            snapshot_path,
        })
    }

    /// Register an embedding under an external patient identifier.
    ///
    /// Appends to the vector store and the identity map and persists the
    /// pair, all under one write guard. If the durable write fails, both
    /// in-memory appends are rolled back before the error is returned, so
    /// a failed call leaves no trace and the length invariant holds.
    pub fn register(&self, embedding: Embedding, patient_id: i64) -> Result<usize, IndexError> {
        let mut state = self.state.write().expect("face index lock poisoned");

        let position = state.store.append(&embedding);
        state.identities.append(patient_id);

        if let Err(err) = persist::save(&self.snapshot_path, &state.store, &state.identities) {
            state.store.truncate(position);
            state.identities.truncate(position);
            warn!("registration of patient {patient_id} rolled back: {err}");
            return Err(err);
        }

        info!("registered patient {patient_id} at position {position}");
        Ok(position)
    }

    /// Find the registered patient nearest to `query`.
    ///
    /// `threshold` is the maximum accepted squared distance, inclusive:
    /// a nearest distance equal to the threshold still matches. Returns
    /// `None` when the index is empty or nothing lies within the threshold;
    /// that is a normal outcome, not an error.
    pub fn recognize(&self, query: &Embedding, threshold: f32) -> Option<Match> {
        let state = self.state.read().expect("face index lock poisoned");

        let (position, distance) = state.store.search_nearest(query)?;
        if distance > threshold {
            debug!("nearest distance {distance:.4} exceeds threshold {threshold:.4}");
            return None;
        }

        let patient_id = state
            .identities
            .get(position)
            .expect("identity map aligned with vector store");
        debug!("matched patient {patient_id} at position {position}, distance {distance:.4}");
        Some(Match {
            patient_id,
            position,
            distance,
        })
    }

    /// Service entry point: extract an embedding from raw image bytes, then
    /// register it. Extraction runs before any lock is taken, so concurrent
    /// registrations serialize only on the cheap append+persist path.
    pub fn register_image(
        &self,
        extractor: &dyn EmbeddingExtractor,
        image: &[u8],
        patient_id: i64,
    ) -> Result<usize, IndexError> {
        let embedding = extractor.extract(image)?;
        self.register(embedding, patient_id)
    }

    /// Service entry point: extract an embedding from raw image bytes, then
    /// recognize. Read-only; never touches durable state.
    pub fn recognize_image(
        &self,
        extractor: &dyn EmbeddingExtractor,
        image: &[u8],
        threshold: f32,
    ) -> Result<Option<Match>, IndexError> {
        let embedding = extractor.extract(image)?;
        Ok(self.recognize(&embedding, threshold))
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .expect("face index lock poisoned")
            .store
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
