/// Positional map from vector-store position to external patient identifier.
///
/// `get(i)` names the owner of the i-th stored embedding. Identifiers are
/// not unique: a patient who registered several photos occupies several
/// positions.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    ids: Vec<i64>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_ids(ids: Vec<i64>) -> Self {
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[i64] {
        &self.ids
    }

    pub fn append(&mut self, id: i64) {
        self.ids.push(id);
    }

    pub fn get(&self, position: usize) -> Option<i64> {
        self.ids.get(position).copied()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.ids.truncate(len);
    }
}
