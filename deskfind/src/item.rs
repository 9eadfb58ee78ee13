//! Indexable items (files, folders and memory entries)

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Open behaviour used when an item does not name one
pub const DEFAULT_ACTION: &str = "open_folder";

fn default_action() -> String {
    DEFAULT_ACTION.to_string()
}

/// One searchable entity produced by the crawler or the memory list.
///
/// Items are read-only to the ranking engine. `path` is the identity used
/// for feedback; it need not be unique across a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Absolute filesystem path (may be empty for pure memory entries)
    #[serde(default)]
    pub path: String,
    /// Display name; falls back to the final path component when empty
    #[serde(default)]
    pub name: String,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Open-behaviour hint passed to the opener
    #[serde(default = "default_action")]
    pub action: String,
    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Last modification time, seconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<f64>,
    /// Lowercased extension without the leading dot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    /// Parent directory as recorded by the crawler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Trigger keywords from the memory list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trigger: Vec<String>,
}

impl Default for Item {
    fn default() -> Self {
        Item {
            path: String::new(),
            name: String::new(),
            description: None,
            action: default_action(),
            size: None,
            mtime: None,
            ext: None,
            parent: None,
            trigger: Vec::new(),
        }
    }
}

impl Item {
    /// Create an item for a path, deriving `name` from it
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = file_name_of(&path).to_string();
        Item {
            path,
            name,
            ..Default::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the modification time
    pub fn with_mtime(mut self, mtime: f64) -> Self {
        self.mtime = Some(mtime);
        self
    }

    /// Set the extension (normalized to lowercase, no dot)
    pub fn with_ext(mut self, ext: impl AsRef<str>) -> Self {
        self.ext = Some(normalize_ext(ext.as_ref()));
        self
    }

    /// Set the open action
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Trimmed path, empty when the item has none
    pub fn path_str(&self) -> &str {
        self.path.trim()
    }

    /// Name shown to the user and used in the haystack
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            file_name_of(&self.path)
        } else {
            &self.name
        }
    }

    /// Parent directory of `path`, empty when there is none
    pub fn parent_dir(&self) -> &str {
        if self.path.is_empty() {
            return "";
        }
        Path::new(&self.path)
            .parent()
            .and_then(|p| p.to_str())
            .unwrap_or("")
    }

    /// Extension used for the extension bonus.
    ///
    /// Prefers the recorded `ext`, otherwise takes it from `path`.
    pub fn extension(&self) -> Option<String> {
        let ext = match &self.ext {
            Some(ext) => normalize_ext(ext),
            None => Path::new(self.path_str())
                .extension()
                .and_then(|e| e.to_str())
                .map(normalize_ext)?,
        };
        if ext.is_empty() {
            None
        } else {
            Some(ext)
        }
    }

    /// Key under which feedback for this item is recorded.
    ///
    /// The path, or the description when the path is empty.
    pub fn feedback_key(&self) -> &str {
        let path = self.path_str();
        if path.is_empty() {
            self.description.as_deref().unwrap_or("")
        } else {
            path
        }
    }
}

fn file_name_of(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
}

fn normalize_ext(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}
