use faceindex::{persist, Embedding, FaceIndex, IndexError, EMBEDDING_DIM};
use std::path::PathBuf;

fn basis(i: usize) -> Embedding {
    let mut raw = vec![0.0; EMBEDDING_DIM];
    raw[i] = 1.0;
    Embedding::from_raw(raw).unwrap()
}

fn snapshot_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("face_index.bin")
}

#[test]
fn restart_reproduces_identical_matches() {
    let dir = tempfile::tempdir().unwrap();
    let path = snapshot_path(&dir);

    let before = {
        let index = FaceIndex::open(&path).unwrap();
        index.register(basis(0), 7).unwrap();
        index.register(basis(1), 9).unwrap();
        index.register(basis(2), 7).unwrap();
        index.recognize(&basis(1), 1.0).unwrap()
    };

    let reopened = FaceIndex::open(&path).unwrap();
    assert_eq!(reopened.len(), 3);

    let after = reopened.recognize(&basis(1), 1.0).unwrap();
    assert_eq!(after, before);

    assert_eq!(reopened.recognize(&basis(0), 1.0).unwrap().patient_id, 7);
    assert_eq!(reopened.recognize(&basis(2), 1.0).unwrap().patient_id, 7);
    assert!(reopened.recognize(&basis(3), 1.0).is_none());
}

#[test]
fn concurrent_registrations_keep_positions_aligned() {
    let dir = tempfile::tempdir().unwrap();
    let path = snapshot_path(&dir);
    let index = FaceIndex::open(&path).unwrap();

    let n = 8;
    let mut positions: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..n)
            .map(|i| {
                let index = &index;
                scope.spawn(move || index.register(basis(i), 100 + i as i64).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // No position skipped or duplicated.
    positions.sort_unstable();
    assert_eq!(positions, (0..n).collect::<Vec<_>>());
    assert_eq!(index.len(), n);

    // Every id is retrievable through its own embedding.
    for i in 0..n {
        let m = index.recognize(&basis(i), 0.01).unwrap();
        assert_eq!(m.patient_id, 100 + i as i64);
    }

    // And so is the restored state.
    drop(index);
    let reopened = FaceIndex::open(&path).unwrap();
    assert_eq!(reopened.len(), n);
    for i in 0..n {
        let m = reopened.recognize(&basis(i), 0.01).unwrap();
        assert_eq!(m.patient_id, 100 + i as i64);
    }
}

#[test]
fn failed_save_preserves_previously_acknowledged_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = snapshot_path(&dir);
    let index = FaceIndex::open(&path).unwrap();

    index.register(basis(0), 7).unwrap();

    // Make the snapshot un-replaceable: a directory at the snapshot path
    // defeats the rename.
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    let result = index.register(basis(1), 9);
    assert!(matches!(result, Err(IndexError::PersistenceWrite { .. })));

    // The failed call never happened; the acknowledged one is intact.
    assert_eq!(index.len(), 1);
    assert_eq!(index.recognize(&basis(0), 1.0).unwrap().patient_id, 7);
    assert!(index.recognize(&basis(1), 1.0).is_none());

    // Once the fault clears, registration resumes at the next position.
    std::fs::remove_dir(&path).unwrap();
    let position = index.register(basis(1), 9).unwrap();
    assert_eq!(position, 1);
    assert_eq!(index.recognize(&basis(1), 1.0).unwrap().patient_id, 9);
}

#[test]
fn corrupt_snapshot_is_fatal_at_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = snapshot_path(&dir);
    std::fs::write(&path, b"torn bytes").unwrap();

    let result = FaceIndex::open(&path);
    assert!(matches!(result, Err(IndexError::CorruptState { .. })));
}

#[test]
fn purge_resets_the_durable_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = snapshot_path(&dir);

    {
        let index = FaceIndex::open(&path).unwrap();
        index.register(basis(0), 7).unwrap();
    }

    persist::purge(&path).unwrap();

    let reopened = FaceIndex::open(&path).unwrap();
    assert!(reopened.is_empty());
}
