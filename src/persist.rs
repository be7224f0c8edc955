use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::embedding::EMBEDDING_DIM;
use crate::error::{IndexError, PersistFault};
use crate::identity::IdentityMap;
use crate::store::VectorStore;

/// File name of the durable snapshot inside the data directory.
pub const SNAPSHOT_FILE: &str = "face_index.bin";

/// On-disk form of the index: both positionally ordered artifacts in one
/// snapshot, so they can only ever be replaced together.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    vectors: ArrayView2<'a, f32>,
    identities: &'a [i64],
}

#[derive(Deserialize)]
struct Snapshot {
    vectors: Array2<f32>,
    identities: Vec<i64>,
}

fn write_error(path: &Path, source: impl Into<PersistFault>) -> IndexError {
    IndexError::PersistenceWrite {
        path: path.to_path_buf(),
        source: source.into(),
    }
}

fn corrupt(path: &Path, reason: impl Into<String>) -> IndexError {
    IndexError::CorruptState {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Durably save the (store, identity map) pair.
///
/// The snapshot is encoded in full, written to a sibling temporary file and
/// renamed over the previous state, so a crash at any point leaves either
/// the old pair or the new pair on disk, never a mix and never a torn file.
pub fn save(path: &Path, store: &VectorStore, identities: &IdentityMap) -> Result<(), IndexError> {
    debug_assert_eq!(store.len(), identities.len());

    let snapshot = SnapshotRef {
        vectors: store.rows(),
        identities: identities.as_slice(),
    };
    let bytes = postcard::to_allocvec(&snapshot).map_err(|e| write_error(path, e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| write_error(path, e))?;
        }
    }

    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, &bytes).map_err(|e| write_error(path, e))?;
    fs::rename(&tmp, path).map_err(|e| write_error(path, e))?;

    debug!(
        "persisted {} registration(s) to {}",
        identities.len(),
        path.display()
    );
    Ok(())
}

/// Restore the last successfully saved pair, or empty structures when no
/// snapshot exists yet.
///
/// Anything undecodable, wrong-dimensional or with mismatched section
/// lengths is a [`IndexError::CorruptState`]: `save` can never produce such
/// a file, so reaching it means the storage underneath misbehaved.
pub fn load(path: &Path) -> Result<(VectorStore, IdentityMap), IndexError> {
    if !path.exists() {
        info!("no snapshot at {}, starting empty", path.display());
        return Ok((VectorStore::new(), IdentityMap::new()));
    }

    let bytes = fs::read(path).map_err(|e| corrupt(path, format!("unreadable snapshot: {e}")))?;
    let snapshot: Snapshot = postcard::from_bytes(&bytes)
        .map_err(|e| corrupt(path, format!("undecodable snapshot: {e}")))?;

    if snapshot.vectors.ncols() != EMBEDDING_DIM {
        return Err(corrupt(
            path,
            format!(
                "embedding dimension {} does not match expected {}",
                snapshot.vectors.ncols(),
                EMBEDDING_DIM
            ),
        ));
    }
    if snapshot.vectors.nrows() != snapshot.identities.len() {
        return Err(corrupt(
            path,
            format!(
                "{} vectors but {} identities",
                snapshot.vectors.nrows(),
                snapshot.identities.len()
            ),
        ));
    }

    info!(
        "restored {} registration(s) from {}",
        snapshot.identities.len(),
        path.display()
    );
    Ok((
        VectorStore::from_rows(snapshot.vectors),
        IdentityMap::from_ids(snapshot.identities),
    ))
}

/// Remove the durable snapshot entirely. Operator action; not an index
/// mutation and safe to call when no snapshot exists.
pub fn purge(path: &Path) -> Result<(), IndexError> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| write_error(path, e))?;
        info!("removed snapshot {}", path.display());
    }
    Ok(())
}
