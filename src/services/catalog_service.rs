use crate::models::CatalogRecord;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Reads the whole catalog into memory. The only shape check is that the
/// file is a JSON array of objects; field contents are opaque.
pub async fn load_catalog(path: &Path) -> Result<Vec<CatalogRecord>> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let records: Vec<CatalogRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("catalog {} is not a JSON array of objects", path.display()))?;
    Ok(records)
}

/// Serializes the full catalog and renames it into place, so a killed run
/// never leaves a truncated catalog behind.
pub async fn write_catalog(path: &Path, records: &[CatalogRecord]) -> Result<()> {
    let body = to_pretty_json(records)?;
    let tmp = temp_path(path);
    fs::write(&tmp, &body)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to move {} into place", tmp.display()))?;
    debug!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Writes the pre-modification catalog next to the original, returning the
/// backup path.
pub async fn write_backup(path: &Path, records: &[CatalogRecord]) -> Result<PathBuf> {
    let bak = backup_path(path);
    let body = to_pretty_json(records)?;
    fs::write(&bak, &body)
        .await
        .with_context(|| format!("failed to write backup {}", bak.display()))?;
    Ok(bak)
}

/// `videos.json` -> `videos.json.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = file_name(path);
    name.push(".bak");
    path.with_file_name(name)
}

// 2-space indentation, literal non-ASCII, trailing newline.
fn to_pretty_json(records: &[CatalogRecord]) -> Result<String> {
    let mut out =
        serde_json::to_string_pretty(records).context("failed to serialize catalog")?;
    out.push('\n');
    Ok(out)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = file_name(path);
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

fn file_name(path: &Path) -> OsString {
    path.file_name().map(OsString::from).unwrap_or_default()
}
