//! Hand-curated memory list (`memory.json`)
//!
//! Each entry names a place the user wants to reach by keyword, e.g. a
//! shared project folder. Entries become [`Item`]s and are ranked alongside
//! crawled files.

use crate::error::Result;
use crate::item::{Item, DEFAULT_ACTION};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

/// On-disk shape of one entry; null and missing fields are tolerated
#[derive(Debug, Default, Serialize, Deserialize)]
struct MemoryEntry {
    #[serde(default)]
    trigger: Option<Vec<String>>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    action: Option<String>,
}

impl From<MemoryEntry> for Item {
    fn from(entry: MemoryEntry) -> Self {
        let mut item = Item::new(entry.path.unwrap_or_default());
        item.trigger = entry.trigger.unwrap_or_default();
        item.description = entry.description.filter(|d| !d.is_empty());
        item.action = entry
            .action
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_ACTION.to_string());
        item
    }
}

impl From<&Item> for MemoryEntry {
    fn from(item: &Item) -> Self {
        MemoryEntry {
            trigger: Some(item.trigger.clone()),
            description: Some(item.description.clone().unwrap_or_default()),
            path: Some(item.path.clone()),
            action: Some(item.action.clone()),
        }
    }
}

/// Load the memory list; a missing file is an empty list
pub fn load_memory<P: AsRef<Path>>(path: P) -> Result<Vec<Item>> {
    let text = match std::fs::read_to_string(path.as_ref()) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let entries: Vec<MemoryEntry> = serde_json::from_str(&text)?;
    Ok(entries.into_iter().map(Item::from).collect())
}

/// Write the memory list back as pretty-printed JSON
pub fn save_memory<P: AsRef<Path>>(path: P, items: &[Item]) -> Result<()> {
    let entries: Vec<MemoryEntry> = items.iter().map(MemoryEntry::from).collect();
    let json = serde_json::to_string_pretty(&entries)?;
    crate::write_atomic(path.as_ref(), json.as_bytes())
}
