//! The shared product catalog: a pretty-printed JSON array on disk.
//!
//! Entries are held as raw JSON values so records written by older tools
//! (extra fields, legacy `title`/`mallId` keys) survive a round trip untouched.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;

use crate::error::CatalogError;

/// Catalog loaded into memory with an explicit load → mutate → save lifecycle.
///
/// There is no locking; only one writer may run against a catalog file at a time.
#[derive(Debug, Clone)]
pub struct Catalog {
    path: PathBuf,
    entries: Vec<Value>,
}

impl Catalog {
    /// Loads the catalog at `path`. A missing file is an empty catalog.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Io`] if the file exists but cannot be read.
    /// - [`CatalogError::Parse`] if the file is not valid JSON.
    /// - [`CatalogError::NotAnArray`] if the top-level value is not an array.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "catalog not found; starting empty");
                return Ok(Self {
                    path: path.to_path_buf(),
                    entries: Vec::new(),
                });
            }
            Err(e) => return Err(CatalogError::io(path, e)),
        };

        let value: Value = serde_json::from_str(&content).map_err(|e| CatalogError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        let Value::Array(entries) = value else {
            return Err(CatalogError::NotAnArray {
                path: path.display().to_string(),
            });
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "catalog loaded");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<Value> {
        &mut self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries attributed to `mall_id`.
    pub fn mall_entries<'a>(&'a self, mall_id: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry_mall(entry).as_deref() == Some(mall_id))
    }

    /// Removes every entry attributed to `mall_id` and returns how many were
    /// removed. Only the in-memory copy changes until [`Catalog::save`].
    pub fn remove_mall(&mut self, mall_id: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| entry_mall(entry).as_deref() != Some(mall_id));
        before - self.entries.len()
    }

    /// Copies the current on-disk catalog to a timestamped backup in
    /// `backup_dir`, then writes the in-memory entries over it.
    ///
    /// Returns the backup path, or `None` when there was no previous file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the backup or the write fails. A failed
    /// backup aborts before the catalog is touched.
    pub fn save(&self, backup_dir: &Path) -> Result<Option<PathBuf>, CatalogError> {
        let backup = backup_file(&self.path, backup_dir)?;
        write_pretty_json(&self.path, &self.entries)?;
        tracing::info!(
            path = %self.path.display(),
            entries = self.entries.len(),
            backup = ?backup,
            "catalog written"
        );
        Ok(backup)
    }
}

/// Copies `path` to `<backup_dir>/products-backup-<epoch-ms>.json`.
///
/// Returns `None` without touching the filesystem when `path` does not exist.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] if the directory cannot be created or the
/// copy fails.
pub fn backup_file(path: &Path, backup_dir: &Path) -> Result<Option<PathBuf>, CatalogError> {
    if !path.exists() {
        return Ok(None);
    }
    std::fs::create_dir_all(backup_dir).map_err(|e| CatalogError::io(backup_dir, e))?;

    let mut stamp = Utc::now().timestamp_millis();
    let mut target = backup_dir.join(format!("products-backup-{stamp}.json"));
    // Two saves within the same millisecond must not overwrite each other.
    while target.exists() {
        stamp += 1;
        target = backup_dir.join(format!("products-backup-{stamp}.json"));
    }

    std::fs::copy(path, &target).map_err(|e| CatalogError::io(&target, e))?;
    tracing::debug!(from = %path.display(), to = %target.display(), "catalog backed up");
    Ok(Some(target))
}

/// Writes `value` as pretty-printed UTF-8 JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`CatalogError::Serialize`] or [`CatalogError::Io`].
pub fn write_pretty_json<T: serde::Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
    }
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    std::fs::write(path, json).map_err(|e| CatalogError::io(path, e))
}

/// The entry's `id` string.
#[must_use]
pub fn entry_id(entry: &Value) -> Option<&str> {
    entry.get("id").and_then(Value::as_str)
}

/// The entry's display name: `name`, or the legacy `title`.
#[must_use]
pub fn entry_name(entry: &Value) -> Option<&str> {
    entry
        .get("name")
        .and_then(Value::as_str)
        .or_else(|| entry.get("title").and_then(Value::as_str))
}

/// The mall an entry is attributed to: `mall.id`, legacy `mall.mallId`, or
/// top-level `mallId`. Numeric ids are rendered as strings.
#[must_use]
pub fn entry_mall(entry: &Value) -> Option<String> {
    let mall = entry.get("mall");
    [
        mall.and_then(|m| m.get("id")),
        mall.and_then(|m| m.get("mallId")),
        entry.get("mallId"),
    ]
    .into_iter()
    .flatten()
    .find_map(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
