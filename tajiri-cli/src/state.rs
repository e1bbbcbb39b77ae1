use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use tajiri_store::{MemoryStore, Snapshot};

pub fn tajiri_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tajiri"))
}

/// Resolve the data directory (explicit flag wins) and make sure it exists.
pub fn ensure_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match explicit {
        Some(d) => d,
        None => tajiri_home()?,
    };
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn store_path(data_dir: &Path) -> PathBuf {
    data_dir.join("store.json")
}

/// Load the JSON state file into a working store. A missing file is an
/// empty store, not an error.
pub fn load_store(data_dir: &Path) -> Result<MemoryStore> {
    let p = store_path(data_dir);
    if !p.exists() {
        return Ok(MemoryStore::new());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&s).context("parse store.json")?;
    Ok(MemoryStore::from_snapshot(snapshot))
}

pub async fn flush_store(data_dir: &Path, store: &MemoryStore) -> Result<()> {
    let p = store_path(data_dir);
    let snapshot = store.snapshot().await;
    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
