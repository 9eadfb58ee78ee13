//! File crawler producing indexable items

use crate::error::Result;
use crate::item::Item;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::{DirEntry, WalkDir};

/// Action assigned to crawled files
pub const FILE_ACTION: &str = "open_file";

/// What the crawler leaves out
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Directory names to prune, compared case-insensitively
    pub exclude_dir_names: Vec<String>,
    /// File extensions to skip, with the dot (".dll")
    pub exclude_file_exts: Vec<String>,
    /// Glob patterns matched against the path relative to its root
    pub exclude_patterns: Vec<String>,
    /// Follow symbolic links while walking
    pub follow_links: bool,
}

/// Walks a set of roots and yields one [`Item`] per regular file
pub struct Scanner {
    roots: Vec<PathBuf>,
    exclude_dirs: Vec<String>,
    exclude_exts: Vec<String>,
    exclude: Vec<Pattern>,
    follow_links: bool,
}

impl Scanner {
    /// Create a scanner; fails on an invalid exclude pattern
    pub fn new<P: AsRef<Path>>(roots: &[P], options: &ScanOptions) -> Result<Self> {
        let exclude = options
            .exclude_patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Scanner {
            roots: roots.iter().map(|r| r.as_ref().to_path_buf()).collect(),
            exclude_dirs: options
                .exclude_dir_names
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            exclude_exts: options
                .exclude_file_exts
                .iter()
                .map(|e| normalize_excluded_ext(e))
                .collect(),
            exclude,
            follow_links: options.follow_links,
        })
    }

    /// Roots that exist and are directories; others are skipped
    pub fn existing_roots(&self) -> impl Iterator<Item = &PathBuf> + '_ {
        self.roots.iter().filter(|r| {
            let ok = r.is_dir();
            if !ok {
                tracing::debug!("Skipping missing root {}", r.display());
            }
            ok
        })
    }

    /// Scan every root
    pub fn scan(&self) -> impl Iterator<Item = Item> + '_ {
        self.existing_roots().flat_map(move |root| self.scan_root(root))
    }

    fn scan_root<'a>(&'a self, root: &'a Path) -> impl Iterator<Item = Item> + 'a {
        WalkDir::new(root)
            .follow_links(self.follow_links)
            .into_iter()
            .filter_entry(move |e| !self.is_excluded(root, e))
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter(move |e| !self.has_excluded_ext(e.path()))
            .filter_map(|e| to_item(&e))
    }

    /// Check if a directory should be pruned
    fn is_excluded(&self, root: &Path, entry: &DirEntry) -> bool {
        // Never exclude the root itself
        if entry.depth() == 0 {
            return false;
        }

        if entry.file_type().is_dir() {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if self.exclude_dirs.contains(&name) {
                return true;
            }
        }

        if self.exclude.is_empty() {
            return false;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.exclude.iter().any(|p| p.matches_with(&relative, options))
    }

    fn has_excluded_ext(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
                self.exclude_exts.contains(&ext)
            }
            None => false,
        }
    }
}

/// `"DLL"` and `".dll"` both become `".dll"`
fn normalize_excluded_ext(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

fn to_item(entry: &DirEntry) -> Option<Item> {
    let metadata = match entry.metadata() {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!("Cannot stat {}: {}", entry.path().display(), e);
            return None;
        }
    };
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64());

    let path = entry.path();
    let mut item = Item::new(path.to_string_lossy().to_string()).with_action(FILE_ACTION);
    item.size = Some(metadata.len());
    item.mtime = mtime;
    item.ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());
    item.parent = path.parent().map(|p| p.to_string_lossy().to_string());
    Some(item)
}
