//! Snapshot-based undo/redo log.

use crate::shapes::SceneObject;

/// Snapshot type stored by the editor.
pub type Snapshot = Vec<SceneObject>;

/// Linear history of full snapshots with a cursor.
///
/// `snapshots[index]` is the state the document was last committed or restored to.
/// Committing after an undo discards everything past the cursor.
#[derive(Debug, Clone)]
pub struct History<T = Snapshot> {
    snapshots: Vec<T>,
    index: usize,
    limit: Option<usize>,
}

impl<T: Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default(), None)
    }
}

impl<T> History<T> {
    /// Create a history whose only entry is `initial`.
    ///
    /// `limit` caps the number of stored snapshots; the oldest are dropped first.
    pub fn new(initial: T, limit: Option<usize>) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
            limit: limit.map(|l| l.max(1)),
        }
    }

    /// Record a new state after the cursor, discarding any redo branch.
    pub fn commit(&mut self, state: T) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(state);
        self.index = self.snapshots.len() - 1;

        if let Some(limit) = self.limit {
            let overflow = self.snapshots.len().saturating_sub(limit);
            if overflow > 0 {
                self.snapshots.drain(..overflow);
                self.index -= overflow;
            }
        }
    }

    /// Step back. Returns the snapshot to restore, or `None` at the start.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index)
    }

    /// Step forward. Returns the snapshot to restore, or `None` at the end.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> Option<&T> {
        self.snapshots.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
