//! In-memory feedback store for tests and ephemeral sessions

use super::{FeedbackSnapshot, FeedbackStore, LoadOutcome};
use crate::error::{Error, Result};
use std::cell::{Cell, RefCell};

/// Feedback kept in process memory.
///
/// Starts `Missing` until the first save. [`MemoryFeedbackStore::failing`]
/// builds a store whose saves always fail, for exercising error paths.
#[derive(Debug, Default)]
pub struct MemoryFeedbackStore {
    state: RefCell<Option<FeedbackSnapshot>>,
    fail_saves: bool,
    saves: Cell<usize>,
    loads: Cell<usize>,
}

impl MemoryFeedbackStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `snapshot`
    pub fn with_snapshot(snapshot: FeedbackSnapshot) -> Self {
        MemoryFeedbackStore {
            state: RefCell::new(Some(snapshot)),
            ..Default::default()
        }
    }

    /// Store that rejects every save with a permission error
    pub fn failing() -> Self {
        MemoryFeedbackStore {
            fail_saves: true,
            ..Default::default()
        }
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Number of loads, including those made by `mark_*`
    pub fn load_count(&self) -> usize {
        self.loads.get()
    }
}

impl FeedbackStore for MemoryFeedbackStore {
    fn load(&self) -> LoadOutcome {
        self.loads.set(self.loads.get() + 1);
        match self.state.borrow().as_ref() {
            Some(snapshot) => LoadOutcome::Loaded(snapshot.clone()),
            None => LoadOutcome::Missing,
        }
    }

    fn save(&self, snapshot: &FeedbackSnapshot) -> Result<()> {
        if self.fail_saves {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "feedback store is read-only",
            )));
        }
        *self.state.borrow_mut() = Some(snapshot.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_creation() {
        let store = MemoryFeedbackStore::new();
        assert_eq!(store.load(), LoadOutcome::Missing);

        store.mark_item("/a", true).unwrap();
        assert!(matches!(store.load(), LoadOutcome::Loaded(_)));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_failing_store_surfaces_error() {
        let store = MemoryFeedbackStore::failing();
        let err = store.mark_item("/a", false).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(store.load(), LoadOutcome::Missing);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let store = MemoryFeedbackStore::new();
        let before = store.snapshot();
        store.mark_item("/a", true).unwrap();
        assert!(before.is_empty());
        assert_eq!(store.snapshot().bias_for_item("/a"), 2.0);
    }
}
