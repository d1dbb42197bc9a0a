//! Undo/redo timeline over full store snapshots.
//!
//! `timeline[cursor]` is always the active store. Committing after an undo
//! truncates the timeline at the cursor, discarding the redo branch.

use tracing::debug;

use crate::store::AnnotationStore;

#[derive(Debug, Clone)]
pub struct History {
    timeline: Vec<AnnotationStore>,
    cursor: usize,
    /// Oldest snapshots are dropped beyond this many; `None` keeps all
    max_snapshots: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(AnnotationStore::new())
    }
}

impl History {
    /// Start a timeline holding a single snapshot
    pub fn new(initial: AnnotationStore) -> Self {
        Self {
            timeline: vec![initial],
            cursor: 0,
            max_snapshots: None,
        }
    }

    pub fn with_limit(mut self, max_snapshots: Option<usize>) -> Self {
        self.max_snapshots = max_snapshots.map(|n| n.max(1));
        self.enforce_limit();
        self
    }

    /// The active store
    pub fn current(&self) -> &AnnotationStore {
        &self.timeline[self.cursor]
    }

    /// Record a new snapshot after the cursor, dropping any redo branch
    pub fn commit(&mut self, snapshot: AnnotationStore) {
        let discarded = self.timeline.len() - self.cursor - 1;
        self.timeline.truncate(self.cursor + 1);
        self.timeline.push(snapshot);
        self.cursor += 1;
        self.enforce_limit();
        debug!(
            cursor = self.cursor,
            discarded,
            annotations = self.current().len(),
            "history commit"
        );
    }

    /// Step back one snapshot; `None` at the start of the timeline
    pub fn undo(&mut self) -> Option<&AnnotationStore> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        debug!(cursor = self.cursor, "history undo");
        Some(self.current())
    }

    /// Step forward one snapshot; `None` at the end of the timeline
    pub fn redo(&mut self) -> Option<&AnnotationStore> {
        if self.cursor + 1 >= self.timeline.len() {
            return None;
        }
        self.cursor += 1;
        debug!(cursor = self.cursor, "history redo");
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.timeline.len()
    }

    /// Replace everything with a single snapshot
    pub fn reset(&mut self, initial: AnnotationStore) {
        self.timeline.clear();
        self.timeline.push(initial);
        self.cursor = 0;
        debug!("history reset");
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.max_snapshots else {
            return;
        };
        if self.timeline.len() <= limit {
            return;
        }
        // Oldest snapshots go first; the active one is never dropped, so a
        // rewound timeline loses its redo tail instead.
        let excess = self.timeline.len() - limit;
        let older = excess.min(self.cursor);
        self.timeline.drain(..older);
        self.cursor -= older;
        self.timeline.truncate(limit);
    }
}
