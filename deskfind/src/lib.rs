//! # deskfind - Desktop File Finder
//!
//! Finds files and folders on a personal machine from a free-text query and
//! learns from what the user ends up opening.
//!
//! deskfind provides:
//! - **Tokenization** with camel-case, digit and CJK decomposition
//! - **Synonym expansion** from an operator-extensible table
//! - **Multi-factor scoring**: text overlap, freshness, path depth,
//!   extension hints and learned bias
//! - **Online feedback** persisted to a JSON file after every accept/reject
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deskfind::{Engine, Item, JsonFeedbackStore};
//!
//! let items = vec![Item::new("/home/me/Desktop/GL-05_shop_drawing.dwg")];
//! let store = JsonFeedbackStore::new("/home/me/.deskfind/feedback.json");
//! let engine = Engine::new(items, store);
//!
//! let results = engine.search("GL-05 預製圖", 10);
//! if let Some(top) = results.first() {
//!     engine.learn_positive("GL-05 預製圖", &top.item).unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod feedback;
pub mod index;
pub mod item;
pub mod memory;
pub mod opener;
pub mod scanner;
pub mod scoring;
pub mod search;
pub mod synonyms;
pub mod tokenizer;

// Re-exports for convenience
pub use config::{AppPaths, Config};
pub use error::{Error, Result};
pub use feedback::{
    BiasEntry, FeedbackSnapshot, FeedbackStore, JsonFeedbackStore, LoadOutcome,
    MemoryFeedbackStore,
};
pub use item::Item;
pub use scoring::{ExtensionMatch, ScoreBreakdown, ScoringConfig};
pub use search::{Engine, SearchOptions, SearchResult, Searcher};
pub use synonyms::SynonymTable;
pub use tokenizer::tokenize;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default application directory (`~/.deskfind`)
pub fn default_app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".deskfind")
}

/// Current time as fractional seconds since the Unix epoch
pub fn now_epoch_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Write `contents` to `path` atomically (write, fsync, rename).
///
/// Readers see either the previous file or the complete new one, never a
/// partial write. The temporary sibling is removed if the rename fails.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Other(format!("Invalid target filename: {}", path.display())))?;
    let tmp_path = path.with_file_name(format!(
        ".{}.tmp.{}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_creates_parent_and_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/state.json");

        write_atomic(&path, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_write_atomic_replaces_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_atomic_rejects_path_without_file_name() {
        let err = write_atomic(Path::new("/"), b"x").unwrap_err();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_default_app_dir_name() {
        assert!(default_app_dir().ends_with(".deskfind"));
    }
}
