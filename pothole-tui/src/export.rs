//! Writing snapshots to disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pothole_types::Snapshot;

/// Write a snapshot as pretty-printed JSON, replacing any existing file.
pub fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
