//! User configuration and on-disk layout

use crate::error::{Error, Result};
use crate::scanner::ScanOptions;
use crate::scoring::ScoringConfig;
use crate::synonyms::SynonymTable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory names never descended into while crawling
const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "Windows",
    "Program Files",
    "Program Files (x86)",
    "ProgramData",
    "AppData",
    "$Recycle.Bin",
    "System Volume Information",
    ".git",
    "__pycache__",
    ".venv",
    "venv",
    "node_modules",
    ".idea",
    ".vscode",
    "OneDriveTemp",
    "Temp",
    "tmp",
];

/// File extensions never indexed
const DEFAULT_EXCLUDE_EXTS: &[&str] = &[".sys", ".dll"];

/// User configuration, stored as `config.json` in the app directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories crawled by the indexer
    pub roots: Vec<PathBuf>,
    /// Directory names pruned while crawling (case-insensitive)
    pub exclude_dir_names: Vec<String>,
    /// File extensions skipped while crawling, with the dot
    pub exclude_file_exts: Vec<String>,
    /// Glob patterns, relative to a root, pruned while crawling
    pub exclude_patterns: Vec<String>,
    /// Index age in days after which it is rebuilt
    pub refresh_days: u32,
    /// Default number of results
    pub top_k: usize,
    /// Extra synonym entries merged over the built-in table
    pub synonyms: BTreeMap<String, BTreeSet<String>>,
    /// Scoring constants
    pub scoring: ScoringConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Config {
            roots: ["Desktop", "Documents", "Downloads"]
                .iter()
                .map(|d| home.join(d))
                .collect(),
            exclude_dir_names: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            exclude_file_exts: DEFAULT_EXCLUDE_EXTS.iter().map(|s| s.to_string()).collect(),
            exclude_patterns: Vec::new(),
            refresh_days: 14,
            top_k: 10,
            synonyms: BTreeMap::new(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Config {
    /// Load the config at `path`, writing the defaults there if it is absent
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match Self::read(path)? {
            Some(config) => Ok(config),
            None => {
                let config = Config::default();
                config.save(path)?;
                tracing::info!("Wrote default configuration to {}", path.display());
                Ok(config)
            }
        }
    }

    /// Load the config at `path`, using defaults (without writing) if absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::read(path.as_ref())?.unwrap_or_default())
    }

    fn read(path: &Path) -> Result<Option<Self>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let config: Config = serde_json::from_str(&text).map_err(|e| {
            Error::ConfigError(format!("Cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(Some(config))
    }

    /// Persist as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::write_atomic(path.as_ref(), json.as_bytes())
    }

    /// Check values that would break searching or indexing
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::ConfigError("top_k must be at least 1".to_string()));
        }
        for pattern in &self.exclude_patterns {
            glob::Pattern::new(pattern)?;
        }
        self.scoring.validate()
    }

    /// Built-in synonyms with the configured extras merged in
    pub fn synonym_table(&self) -> SynonymTable {
        let mut table = SynonymTable::default();
        table.extend(&self.synonyms);
        table
    }

    /// Crawl settings for the scanner
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            exclude_dir_names: self.exclude_dir_names.clone(),
            exclude_file_exts: self.exclude_file_exts.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
            follow_links: false,
        }
    }
}

/// Files kept in the application directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Application directory
    pub root: PathBuf,
    /// `config.json`
    pub config: PathBuf,
    /// `feedback.json`
    pub feedback: PathBuf,
    /// `index.json`, the crawler output
    pub index: PathBuf,
    /// `memory.json`, the hand-curated item list
    pub memory: PathBuf,
}

impl AppPaths {
    /// Layout under `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        AppPaths {
            config: root.join("config.json"),
            feedback: root.join("feedback.json"),
            index: root.join("index.json"),
            memory: root.join("memory.json"),
            root,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        AppPaths::new(crate::default_app_dir())
    }
}
