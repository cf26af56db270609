//! Mall selection from the configured malls file.

use mallcat_core::{MallConfig, MallsFile};

pub(crate) fn list_malls(malls: &MallsFile) {
    if malls.malls.is_empty() {
        println!("no malls configured");
        return;
    }
    for mall in &malls.malls {
        println!(
            "{:<12} {:<16} {:<20} {}",
            mall.id, mall.name, mall.region, mall.base_url
        );
    }
    println!("{} malls", malls.malls.len());
}

/// Looks up one mall by id.
///
/// # Errors
///
/// Returns an error naming the known ids when `id` is not configured.
pub(crate) fn find_mall<'a>(malls: &'a MallsFile, id: &str) -> anyhow::Result<&'a MallConfig> {
    malls.get(id).ok_or_else(|| {
        let known: Vec<&str> = malls.malls.iter().map(|m| m.id.as_str()).collect();
        anyhow::anyhow!("mall '{id}' not found; known malls: [{}]", known.join(", "))
    })
}

/// Resolves `--mall` filters. An empty filter selects every configured mall,
/// in file order; otherwise the requested order is kept and repeats dropped.
///
/// # Errors
///
/// Returns an error on the first unknown id.
pub(crate) fn select_malls<'a>(
    malls: &'a MallsFile,
    ids: &[String],
) -> anyhow::Result<Vec<&'a MallConfig>> {
    if ids.is_empty() {
        return Ok(malls.malls.iter().collect());
    }
    let mut selected: Vec<&MallConfig> = Vec::with_capacity(ids.len());
    for id in ids {
        let mall = find_mall(malls, id)?;
        if !selected.iter().any(|m| m.id == mall.id) {
            selected.push(mall);
        }
    }
    Ok(selected)
}
