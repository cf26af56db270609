//! De-duplicating merge of freshly built records into the catalog.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use mallcat_core::{normalize_name, ProductRecord};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::CatalogError;
use crate::store::{entry_id, entry_mall, entry_name, Catalog};

/// How incoming records whose id already exists are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeMode {
    /// Existing ids are left untouched and the incoming record is skipped.
    #[default]
    SkipExisting,
    /// Existing ids have their price, image and stock fields replaced.
    RefreshExisting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCounts {
    pub new: usize,
    pub skipped: usize,
    pub updated: usize,
    pub total_after: usize,
}

impl MergeCounts {
    /// Returns `true` if the merge changed the in-memory catalog.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.new > 0 || self.updated > 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub counts: MergeCounts,
    /// Records appended to the catalog, in input order.
    pub added: Vec<ProductRecord>,
}

/// Result of [`register`]: counts plus where the previous catalog was backed up.
#[derive(Debug, Clone, Default)]
pub struct RegisterOutcome {
    pub counts: MergeCounts,
    pub backup_path: Option<PathBuf>,
    pub added: Vec<ProductRecord>,
}

/// Result of [`remove_mall_records`].
#[derive(Debug, Clone, Default)]
pub struct RemoveOutcome {
    pub removed: usize,
    pub total_after: usize,
    pub backup_path: Option<PathBuf>,
}

/// Names already taken. Entries attributed to a mall only block the same
/// mall's names; unattributed legacy entries block the name everywhere.
#[derive(Default)]
struct TakenNames {
    scoped: HashSet<(String, String)>,
    global: HashSet<String>,
}

impl TakenNames {
    fn insert(&mut self, mall: Option<String>, name: String) {
        match mall {
            Some(mall) => {
                self.scoped.insert((mall, name));
            }
            None => {
                self.global.insert(name);
            }
        }
    }

    fn contains(&self, mall: &str, name: &str) -> bool {
        self.global.contains(name) || self.scoped.contains(&(mall.to_owned(), name.to_owned()))
    }
}

/// Merges `incoming` into `catalog` in memory.
///
/// Invalid records (blank name or zero price), records whose id or
/// normalized name is already present, and repeats within the batch are all
/// counted as skipped. With [`MergeMode::RefreshExisting`], an existing id
/// whose stored values differ is updated in place instead.
///
/// # Errors
///
/// Returns [`CatalogError::Serialize`] if a record cannot be converted to JSON.
pub fn merge(
    catalog: &mut Catalog,
    incoming: &[ProductRecord],
    mode: MergeMode,
) -> Result<MergeOutcome, CatalogError> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut names = TakenNames::default();
    for (i, entry) in catalog.entries().iter().enumerate() {
        if let Some(id) = entry_id(entry) {
            index.entry(id.to_owned()).or_insert(i);
        }
        if let Some(name) = entry_name(entry) {
            names.insert(entry_mall(entry), normalize_name(name));
        }
    }

    let mut outcome = MergeOutcome::default();
    let mut batch_ids: HashSet<&str> = HashSet::new();

    for record in incoming {
        if !record.is_valid() {
            tracing::debug!(id = %record.id, name = %record.name, "skipping invalid record");
            outcome.counts.skipped += 1;
            continue;
        }
        if !batch_ids.insert(record.id.as_str()) {
            tracing::debug!(id = %record.id, "skipping repeated id within batch");
            outcome.counts.skipped += 1;
            continue;
        }

        if let Some(&i) = index.get(&record.id) {
            let refreshed = mode == MergeMode::RefreshExisting
                && refresh_entry(&mut catalog.entries_mut()[i], record);
            if refreshed {
                outcome.counts.updated += 1;
            } else {
                outcome.counts.skipped += 1;
            }
            continue;
        }

        let name_key = normalize_name(&record.name);
        if names.contains(&record.mall.id, &name_key) {
            tracing::debug!(id = %record.id, name = %record.name, "skipping duplicate name");
            outcome.counts.skipped += 1;
            continue;
        }

        catalog.entries_mut().push(serde_json::to_value(record)?);
        index.insert(record.id.clone(), catalog.len() - 1);
        names.insert(Some(record.mall.id.clone()), name_key);
        outcome.added.push(record.clone());
        outcome.counts.new += 1;
    }

    outcome.counts.total_after = catalog.len();
    Ok(outcome)
}

/// Overwrites the mutable fields of an existing entry. Returns `true` only if
/// a stored value actually changed; `updatedAt` is bumped in that case.
fn refresh_entry(entry: &mut Value, record: &ProductRecord) -> bool {
    let Some(object) = entry.as_object_mut() else {
        return false;
    };

    let mut changed = false;
    changed |= set_field(object, "price", Some(json!(record.price)));
    changed |= set_field(object, "originalPrice", record.original_price.map(|p| json!(p)));
    changed |= set_field(object, "discountRate", record.discount_rate.map(|r| json!(r)));
    if !record.image_url.is_empty() {
        changed |= set_field(object, "imageUrl", Some(json!(record.image_url)));
    }
    changed |= set_field(object, "inStock", Some(json!(record.in_stock)));

    if changed {
        object.insert("updatedAt".to_owned(), json!(record.updated_at));
    }
    changed
}

fn set_field(object: &mut Map<String, Value>, key: &str, value: Option<Value>) -> bool {
    match value {
        Some(value) if object.get(key) != Some(&value) => {
            object.insert(key.to_owned(), value);
            true
        }
        Some(_) => false,
        None => object.remove(key).is_some(),
    }
}

/// Load, merge, then back up and write the catalog if anything changed.
///
/// With `dry_run` the counts are computed but nothing is written.
///
/// # Errors
///
/// Any [`CatalogError`] from loading, serializing, backing up or writing.
/// A catalog that fails to parse is never overwritten.
pub fn register(
    catalog_path: &Path,
    backup_dir: &Path,
    incoming: &[ProductRecord],
    mode: MergeMode,
    dry_run: bool,
) -> Result<RegisterOutcome, CatalogError> {
    let mut catalog = Catalog::load(catalog_path)?;
    let before = catalog.len();
    let MergeOutcome { counts, added } = merge(&mut catalog, incoming, mode)?;

    tracing::info!(
        catalog = %catalog_path.display(),
        before,
        new = counts.new,
        skipped = counts.skipped,
        updated = counts.updated,
        total_after = counts.total_after,
        dry_run,
        "merge computed"
    );

    let backup_path = if dry_run || !counts.changed() {
        None
    } else {
        catalog.save(backup_dir)?
    };

    Ok(RegisterOutcome {
        counts,
        backup_path,
        added,
    })
}

/// Removes every catalog entry attributed to `mall_id`, backing up first.
/// Nothing is written when the mall has no entries.
///
/// # Errors
///
/// Any [`CatalogError`] from loading, backing up or writing.
pub fn remove_mall_records(
    catalog_path: &Path,
    backup_dir: &Path,
    mall_id: &str,
) -> Result<RemoveOutcome, CatalogError> {
    let mut catalog = Catalog::load(catalog_path)?;
    let removed = catalog.remove_mall(mall_id);
    let backup_path = if removed > 0 {
        catalog.save(backup_dir)?
    } else {
        None
    };
    tracing::info!(mall = %mall_id, removed, total_after = catalog.len(), "mall records removed");
    Ok(RemoveOutcome {
        removed,
        total_after: catalog.len(),
        backup_path,
    })
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
