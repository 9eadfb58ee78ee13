//! File-backed feedback store

use super::{FeedbackSnapshot, FeedbackStore, LoadOutcome};
use crate::error::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Feedback persisted as one pretty-printed JSON document.
///
/// The file is opened, read or replaced, and closed within each call.
#[derive(Debug, Clone)]
pub struct JsonFeedbackStore {
    path: PathBuf,
}

impl JsonFeedbackStore {
    /// Store backed by the file at `path` (created on first save)
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonFeedbackStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the feedback file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedbackStore for JsonFeedbackStore {
    fn load(&self) -> LoadOutcome {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadOutcome::Missing,
            Err(e) => {
                tracing::warn!("Cannot read feedback {}: {}", self.path.display(), e);
                return LoadOutcome::Corrupt {
                    reason: e.to_string(),
                };
            }
        };

        match serde_json::from_slice::<FeedbackSnapshot>(&bytes) {
            Ok(snapshot) => LoadOutcome::Loaded(snapshot),
            Err(e) => {
                tracing::warn!(
                    "Ignoring corrupt feedback {}: {}",
                    self.path.display(),
                    e
                );
                LoadOutcome::Corrupt {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn save(&self, snapshot: &FeedbackSnapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        crate::write_atomic(&self.path, json.as_bytes())
    }
}
