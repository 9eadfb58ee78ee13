//! The crawler's persisted output (`index.json`)

use crate::config::Config;
use crate::error::{Error, Result};
use crate::item::Item;
use crate::scanner::Scanner;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

/// Format version written to `index.json`
pub const MAPPING_VERSION: u32 = 1;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Every crawled file plus when the crawl happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    /// Format version
    pub version: u32,
    /// Crawl time, seconds since the Unix epoch
    pub generated_at: f64,
    /// Number of items
    pub count: usize,
    /// Crawled items
    pub items: Vec<Item>,
}

impl Default for Mapping {
    fn default() -> Self {
        Mapping {
            version: MAPPING_VERSION,
            generated_at: 0.0,
            count: 0,
            items: Vec::new(),
        }
    }
}

/// Statistics from an indexing run
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    /// Number of roots that existed and were walked
    pub roots_scanned: usize,
    /// Number of files recorded
    pub files_indexed: usize,
    /// Whether the index was rebuilt (false when it was fresh)
    pub rebuilt: bool,
    /// Time taken
    pub duration: Duration,
}

impl Mapping {
    /// Wrap crawled items with the current time
    pub fn new(items: Vec<Item>) -> Self {
        Mapping {
            version: MAPPING_VERSION,
            generated_at: crate::now_epoch_secs(),
            count: items.len(),
            items,
        }
    }

    /// Read `index.json`; a missing file is an empty mapping
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Mapping::default()),
            Err(e) => return Err(e.into()),
        };
        let mapping: Mapping = serde_json::from_str(&text).map_err(|e| {
            Error::IndexError(format!("Cannot parse {}: {}", path.display(), e))
        })?;
        if mapping.version != MAPPING_VERSION {
            return Err(Error::IndexError(format!(
                "Unsupported index version {} in {}",
                mapping.version,
                path.display()
            )));
        }
        Ok(mapping)
    }

    /// Write atomically
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(self)?;
        crate::write_atomic(path.as_ref(), json.as_bytes())
    }
}

/// Crawl every configured root
pub fn build_mapping(config: &Config) -> Result<Mapping> {
    let scanner = Scanner::new(&config.roots, &config.scan_options())?;
    let items: Vec<Item> = scanner.scan().collect();
    tracing::info!("Crawled {} files", items.len());
    Ok(Mapping::new(items))
}

/// True when `path` is missing or last modified more than `refresh_days` ago
pub fn is_stale<P: AsRef<Path>>(path: P, refresh_days: u32, now: SystemTime) -> bool {
    let modified = match std::fs::metadata(path.as_ref()).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(_) => return true,
    };
    let max_age = Duration::from_secs(u64::from(refresh_days) * SECS_PER_DAY);
    match now.duration_since(modified) {
        Ok(age) => age > max_age,
        // Modified in the future: treat as fresh
        Err(_) => false,
    }
}

/// Rebuild `index.json` when forced or stale
pub fn ensure_index<P: AsRef<Path>>(config: &Config, path: P, force: bool) -> Result<IndexStats> {
    let path = path.as_ref();
    let start = Instant::now();
    let mut stats = IndexStats::default();

    if !force && !is_stale(path, config.refresh_days, SystemTime::now()) {
        tracing::debug!("Index at {} is fresh", path.display());
        stats.files_indexed = Mapping::load(path)?.count;
        stats.duration = start.elapsed();
        return Ok(stats);
    }

    let scanner = Scanner::new(&config.roots, &config.scan_options())?;
    stats.roots_scanned = scanner.existing_roots().count();
    let mapping = Mapping::new(scanner.scan().collect());
    mapping.save(path)?;

    stats.files_indexed = mapping.count;
    stats.rebuilt = true;
    stats.duration = start.elapsed();
    tracing::info!(
        "Indexed {} files from {} roots in {:?}",
        stats.files_indexed,
        stats.roots_scanned,
        stats.duration
    );
    Ok(stats)
}
